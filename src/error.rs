// SPDX-FileCopyrightText: 2022-2024 Noah Fontes
//
// SPDX-License-Identifier: Apache-2.0

use std::{convert::Infallible, fmt, io, result};

use reqwest::StatusCode;
use thiserror::Error;

use crate::{guard, identity};

pub(crate) type Result<T, E = Error> = result::Result<T, E>;

#[derive(Error, Debug)]
pub(crate) enum Error {
    #[error("IO operation failed: {0}")]
    Io(#[from] io::Error),
    #[error("JSON format error: {0}")]
    Json(serde_json::Error),
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("invalid API URL: {0}")]
    Url(#[from] url::ParseError),
    #[error("invalid credential: {0}")]
    InvalidCredential(#[from] identity::DecodeFailure),
    #[error("{0}")]
    Rejected(#[from] Rejection),
    #[error("{0}")]
    Invalid(String),
    #[error("access denied: {0}")]
    Denied(guard::Decision),
    #[error("storage error: {0}")]
    Storage(#[from] Storage),
    #[error("password retrieval error: {0}")]
    Password(#[from] Password),
    #[error("command execution failed")]
    Command,
    #[error("operation cancelled")]
    Cancelled,
}

impl Error {
    /// Resolves the text shown to the user for a failed operation: the
    /// server's own message when the response body carried one, otherwise
    /// the operation's fallback.
    pub(crate) fn feedback(&self, fallback: &str) -> String {
        match *self {
            Self::Rejected(Rejection {
                message: Some(ref message),
                ..
            })
            | Self::Invalid(ref message) => message.clone(),
            Self::Io(_)
            | Self::Json(_)
            | Self::Transport(_)
            | Self::Url(_)
            | Self::InvalidCredential(_)
            | Self::Rejected(_)
            | Self::Denied(_)
            | Self::Storage(_)
            | Self::Password(_)
            | Self::Command
            | Self::Cancelled => fallback.to_owned(),
        }
    }

    pub(crate) fn is_unauthorized(&self) -> bool {
        matches!(*self, Self::Rejected(ref rejection) if rejection.is_unauthorized())
    }
}

impl From<serde_json::Error> for Error {
    fn from(value: serde_json::Error) -> Self {
        // LINT: Deliberate fall-through that should catch future cases added to
        // the enum.
        #[allow(clippy::wildcard_enum_match_arm)]
        match value.classify() {
            serde_json::error::Category::Io => Self::Io(value.into()),
            _ => Self::Json(value),
        }
    }
}

impl From<pinentry::Error> for Error {
    fn from(value: pinentry::Error) -> Self {
        // LINT: Deliberate fall-through that should catch future cases added to
        // the enum.
        #[allow(
            clippy::wildcard_enum_match_arm,
            clippy::match_wildcard_for_single_variants
        )]
        match value {
            pinentry::Error::Cancelled | pinentry::Error::Timeout => Self::Cancelled,
            pinentry::Error::Io(e) => Self::Io(e),
            _ => Self::Password(Password::Pinentry(value)),
        }
    }
}

impl From<tokio::task::JoinError> for Error {
    fn from(value: tokio::task::JoinError) -> Self {
        Self::Io(value.into())
    }
}

impl From<Infallible> for Error {
    fn from(_: Infallible) -> Self {
        unreachable!()
    }
}

/// A non-success HTTP response. The body's `message` field, when present, is
/// kept verbatim for display.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub(crate) struct Rejection {
    pub(crate) status: StatusCode,
    pub(crate) message: Option<String>,
}

impl Rejection {
    pub(crate) fn is_unauthorized(&self) -> bool {
        self.status == StatusCode::UNAUTHORIZED
    }
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.message.as_ref() {
            Some(message) => write!(f, "server rejected the request ({}): {}", self.status, message),
            None => write!(f, "server rejected the request ({})", self.status),
        }
    }
}

#[derive(Error, Debug)]
pub(crate) enum Storage {
    #[error("could not determine a data directory for this platform")]
    NoProjectDirs,
    #[cfg(feature = "secret-service")]
    #[error("secret service error: {0}")]
    SecretService(#[from] oo7::Error),
    #[cfg(feature = "keychain")]
    #[error("keychain error: {0}")]
    Keychain(#[from] security_framework::base::Error),
}

#[derive(Error, Debug)]
pub(crate) enum Password {
    #[error("no password prompt available")]
    NoPrompt,
    #[error("Pinentry implementation error: {0}")]
    Pinentry(pinentry::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn feedback_prefers_server_message() {
        let err = Error::Rejected(Rejection {
            status: StatusCode::CONFLICT,
            message: Some("Codigo duplicado".to_owned()),
        });

        assert_eq!(err.feedback("No fue posible crear la empresa"), "Codigo duplicado");
    }

    #[test]
    fn feedback_falls_back_without_message() {
        let err = Error::Rejected(Rejection {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: None,
        });

        assert_eq!(
            err.feedback("No fue posible crear la empresa"),
            "No fue posible crear la empresa"
        );
        assert_eq!(Error::Command.feedback("fallback"), "fallback");
    }

    #[test]
    fn only_401_is_unauthorized() {
        let unauthorized = Error::Rejected(Rejection {
            status: StatusCode::UNAUTHORIZED,
            message: None,
        });
        let forbidden = Error::Rejected(Rejection {
            status: StatusCode::FORBIDDEN,
            message: None,
        });

        assert!(unauthorized.is_unauthorized());
        assert!(!forbidden.is_unauthorized());
    }
}
