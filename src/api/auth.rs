// SPDX-FileCopyrightText: 2024 Noah Fontes
//
// SPDX-License-Identifier: Apache-2.0

use secrecy::{ExposeSecret as _, SecretString};
use serde::Deserialize;
use serde_json::json;

use crate::{
    error::Result,
    gateway::{Provider, Request, Transport},
    identity::Role,
};

use super::Executor;

pub(crate) const LOGIN_FAILED: &str = "No fue posible iniciar sesion. Verifica tus credenciales.";
pub(crate) const REGISTER_FAILED: &str = "No fue posible registrar el usuario";

#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct TokenResponse {
    pub(crate) token: String,
    pub(crate) expires_in_minutes: u64,
}

pub(crate) struct Login {
    pub(crate) email: String,
    pub(crate) password: SecretString,
}

impl Executor for Login {
    type Response = TokenResponse;

    fn request(&self) -> Result<Request> {
        Request::post("/auth/login").with_json(&json!({
            "email": self.email,
            "password": self.password.expose_secret(),
        }))
    }
}

pub(crate) struct Register {
    pub(crate) email: String,
    pub(crate) password: SecretString,
    pub(crate) role: Role,
}

impl Executor for Register {
    type Response = TokenResponse;

    fn request(&self) -> Result<Request> {
        Request::post("/auth/register").with_json(&json!({
            "email": self.email,
            "password": self.password.expose_secret(),
            "role": self.role,
        }))
    }
}

/// Exchanges the call's answer for a session. The exchange goes out without a
/// credential, and a refused exchange leaves the current session alone.
pub(crate) async fn sign_in<E, T>(provider: &Provider<T>, call: E) -> Result<TokenResponse>
where
    E: Executor<Response = TokenResponse>,
    T: Transport,
{
    let response = call.execute(&provider.unauthenticated()).await?;
    provider.session().login(response.token.clone()).await?;
    Ok(response)
}
