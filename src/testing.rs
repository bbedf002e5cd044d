// SPDX-FileCopyrightText: 2024 Noah Fontes
//
// SPDX-License-Identifier: Apache-2.0

use std::{
    future::Future,
    sync::{Arc, Mutex, PoisonError},
};

use async_trait::async_trait;
use futures_util::{future::BoxFuture, FutureExt as _};
use reqwest::{Method, StatusCode};

use secrecy::SecretString;

use crate::{
    command::Context,
    error::Result,
    gateway::{Provider, Request, Response, Transport},
    identity::Role,
    password::{self, Prompt},
    session::SessionStore,
    storage::Memory,
};

type Responder = Box<dyn Fn(Request) -> BoxFuture<'static, Result<Response>> + Send + Sync>;

/// A transport that answers from a closure and remembers every request.
pub(crate) struct MockTransport {
    responder: Responder,
    log: Mutex<Vec<Request>>,
}

impl MockTransport {
    pub(crate) fn new<F, Fut>(responder: F) -> Self
    where
        F: Fn(Request) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Response>> + Send + 'static,
    {
        Self {
            responder: Box::new(move |req| responder(req).boxed()),
            log: Mutex::new(vec![]),
        }
    }

    pub(crate) fn requests(&self) -> Vec<Request> {
        self.log
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub(crate) fn count(&self, method: &Method, path: &str) -> usize {
        self.requests()
            .iter()
            .filter(|req| req.method == *method && req.path == path)
            .count()
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn send(&self, request: Request) -> Result<Response> {
        self.log
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(request.clone());
        (self.responder)(request).await
    }
}

pub(crate) fn status(status: StatusCode, body: serde_json::Value) -> Response {
    Response::new(status, body.to_string().into_bytes())
}

pub(crate) fn ok(body: serde_json::Value) -> Response {
    status(StatusCode::OK, body)
}

/// An unsigned token in the shape the API issues.
pub(crate) fn token(subject: &str, role: &str) -> String {
    let header = base64::encode_config(br#"{"alg":"HS256"}"#, base64::URL_SAFE_NO_PAD);
    let payload = base64::encode_config(
        serde_json::json!({"sub": subject, "role": role, "iat": 1_700_000_000_u64, "exp": 1_700_003_600_u64})
            .to_string(),
        base64::URL_SAFE_NO_PAD,
    );
    format!("{header}.{payload}.c2lnbmF0dXJl")
}

pub(crate) async fn anonymous() -> SessionStore {
    SessionStore::init(Box::new(Memory::<String>::new())).await
}

pub(crate) async fn session_with(raw: &str) -> SessionStore {
    SessionStore::init(Box::new(Memory::with(raw.to_owned()))).await
}

pub(crate) async fn session_as(subject: &str, role: Role) -> SessionStore {
    let role = match role {
        Role::Admin => "ADMIN",
        Role::Viewer => "VIEWER",
    };
    session_with(&token(subject, role)).await
}

/// A prompt with nobody at the keyboard.
pub(crate) struct Unattended;

#[async_trait]
impl Prompt for Unattended {
    async fn prompt(&self, _: password::Request) -> Result<Option<SecretString>> {
        Ok(None)
    }
}

pub(crate) fn context(transport: &Arc<MockTransport>, session: SessionStore) -> Context<MockTransport> {
    Context {
        provider: Provider::new(Arc::clone(transport), session),
        prompt: Box::new(Unattended),
    }
}
