// SPDX-FileCopyrightText: 2024 Noah Fontes
//
// SPDX-License-Identifier: Apache-2.0

//! Reads the claims carried by a bearer token.
//!
//! Tokens are issued and signed by the API. The client never holds the
//! signing key, so the signature segment is not checked here; the API
//! verifies it on every request and answers 401 when it does not hold up.

use std::fmt;

use clap::ValueEnum;
use inflector::Inflector as _;
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Deserialize, Serialize, ValueEnum)]
#[serde(rename_all = "UPPERCASE")]
pub(crate) enum Role {
    Admin,
    Viewer,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let value = self.to_possible_value().ok_or(fmt::Error)?;
        write!(f, "{}", value.get_name().to_title_case())
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct Claims {
    pub(crate) subject: String,
    pub(crate) role: Role,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub(crate) enum DecodeFailure {
    #[error("token does not have three dot-separated segments")]
    Segments,
    #[error("token payload is not valid base64: {0}")]
    Base64(String),
    #[error("token payload is not a valid claim set: {0}")]
    Claims(String),
}

#[derive(Deserialize)]
struct Payload {
    sub: String,
    role: Role,
}

pub(crate) fn decode(raw: &str) -> Result<Claims, DecodeFailure> {
    let mut segments = raw.split('.');
    let payload = match (segments.next(), segments.next(), segments.next(), segments.next()) {
        (Some(_), Some(payload), Some(_), None) if !payload.is_empty() => payload,
        _ => return Err(DecodeFailure::Segments),
    };

    let trimmed = payload.trim_end_matches('=');
    let bytes = base64::decode_config(trimmed, base64::URL_SAFE_NO_PAD)
        .or_else(|_| base64::decode_config(trimmed, base64::STANDARD_NO_PAD))
        .map_err(|e| DecodeFailure::Base64(e.to_string()))?;

    let Payload { sub, role } =
        serde_json::from_slice(&bytes).map_err(|e| DecodeFailure::Claims(e.to_string()))?;
    Ok(Claims { subject: sub, role })
}

/// A token together with the claims read from it. The two only ever exist
/// together.
#[derive(Clone)]
pub(crate) struct Credential {
    token: SecretString,
    claims: Claims,
}

impl Credential {
    pub(crate) fn parse(raw: String) -> Result<Self, DecodeFailure> {
        let claims = decode(&raw)?;
        Ok(Self {
            token: SecretString::new(raw),
            claims,
        })
    }

    pub(crate) const fn token(&self) -> &SecretString {
        &self.token
    }

    pub(crate) fn subject(&self) -> &str {
        &self.claims.subject
    }

    pub(crate) const fn role(&self) -> Role {
        self.claims.role
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("token", &"[REDACTED]")
            .field("claims", &self.claims)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use secrecy::ExposeSecret as _;
    use serde_test::{assert_tokens, Token};

    use crate::testing;

    use super::*;

    #[test]
    fn role_wire_format() {
        assert_tokens(
            &Role::Admin,
            &[Token::UnitVariant {
                name: "Role",
                variant: "ADMIN",
            }],
        );
        assert_tokens(
            &Role::Viewer,
            &[Token::UnitVariant {
                name: "Role",
                variant: "VIEWER",
            }],
        );
    }

    #[test]
    fn role_display() {
        assert_eq!(Role::Admin.to_string(), "Admin");
        assert_eq!(Role::Viewer.to_string(), "Viewer");
    }

    #[test]
    fn decodes_subject_and_role() -> Result<(), DecodeFailure> {
        let claims = decode(&testing::token("admin@litethinking.com", "ADMIN"))?;

        assert_eq!(claims.subject, "admin@litethinking.com");
        assert_eq!(claims.role, Role::Admin);
        Ok(())
    }

    #[test]
    fn accepts_padded_standard_alphabet() -> Result<(), DecodeFailure> {
        let payload = base64::encode(br#"{"sub":"viewer@litethinking.com","role":"VIEWER","exp":1}"#);
        let claims = decode(&format!("eyJhbGciOiJIUzI1NiJ9.{payload}.c2ln"))?;

        assert_eq!(claims.role, Role::Viewer);
        Ok(())
    }

    #[test]
    fn rejects_wrong_segment_count() {
        assert_eq!(decode(""), Err(DecodeFailure::Segments));
        assert_eq!(decode("onlyone"), Err(DecodeFailure::Segments));
        assert_eq!(decode("a.b"), Err(DecodeFailure::Segments));
        assert_eq!(decode("a.b.c.d"), Err(DecodeFailure::Segments));
        assert_eq!(decode("a..c"), Err(DecodeFailure::Segments));
    }

    #[test]
    fn rejects_bad_base64() {
        assert!(matches!(decode("h.***.s"), Err(DecodeFailure::Base64(_))));
    }

    #[test]
    fn rejects_bad_json() {
        let payload = base64::encode_config(b"not json", base64::URL_SAFE_NO_PAD);
        assert!(matches!(
            decode(&format!("h.{payload}.s")),
            Err(DecodeFailure::Claims(_))
        ));
    }

    #[test]
    fn rejects_missing_or_unknown_role() {
        let missing = base64::encode_config(br#"{"sub":"x"}"#, base64::URL_SAFE_NO_PAD);
        assert!(matches!(
            decode(&format!("h.{missing}.s")),
            Err(DecodeFailure::Claims(_))
        ));

        assert!(matches!(
            decode(&testing::token("x", "ROOT")),
            Err(DecodeFailure::Claims(_))
        ));
    }

    #[test]
    fn credential_keeps_token_and_claims_together() -> Result<(), DecodeFailure> {
        let raw = testing::token("viewer@litethinking.com", "VIEWER");
        let credential = Credential::parse(raw.clone())?;

        assert_eq!(credential.token().expose_secret(), &raw);
        assert_eq!(credential.subject(), "viewer@litethinking.com");
        assert_eq!(credential.role(), Role::Viewer);
        assert!(!format!("{credential:?}").contains(&raw));
        Ok(())
    }
}
