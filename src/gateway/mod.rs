// SPDX-FileCopyrightText: 2024 Noah Fontes
//
// SPDX-License-Identifier: Apache-2.0

//! The single way out to the API. Every request made on behalf of the signed
//! in user goes through a [`Gateway`], which attaches the bearer token and
//! ends the session when the API answers 401.

mod http;

use std::sync::Arc;

use async_trait::async_trait;
use log::{debug, warn};
use reqwest::{Method, StatusCode};
use secrecy::SecretString;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use tokio::sync::{watch, Mutex};

use crate::{
    error::{Rejection, Result},
    identity::Credential,
    session::{Session, SessionStore},
};

pub(crate) use http::Http;

#[derive(Clone, Debug)]
pub(crate) struct Request {
    pub(crate) method: Method,
    pub(crate) path: String,
    pub(crate) query: Vec<(String, String)>,
    pub(crate) body: Option<serde_json::Value>,
    pub(crate) bearer: Option<SecretString>,
}

impl Request {
    pub(crate) fn new<P: Into<String>>(method: Method, path: P) -> Self {
        Self {
            method,
            path: path.into(),
            query: vec![],
            body: None,
            bearer: None,
        }
    }

    pub(crate) fn get<P: Into<String>>(path: P) -> Self {
        Self::new(Method::GET, path)
    }

    pub(crate) fn post<P: Into<String>>(path: P) -> Self {
        Self::new(Method::POST, path)
    }

    pub(crate) fn put<P: Into<String>>(path: P) -> Self {
        Self::new(Method::PUT, path)
    }

    pub(crate) fn delete<P: Into<String>>(path: P) -> Self {
        Self::new(Method::DELETE, path)
    }

    pub(crate) fn with_query<K: Into<String>, V: Into<String>>(mut self, key: K, value: V) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }

    pub(crate) fn with_json<T: Serialize + ?Sized>(mut self, body: &T) -> Result<Self> {
        self.body = Some(serde_json::to_value(body)?);
        Ok(self)
    }
}

#[derive(Clone, Debug)]
pub(crate) struct Response {
    status: StatusCode,
    body: Vec<u8>,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: Option<String>,
}

impl Response {
    pub(crate) const fn new(status: StatusCode, body: Vec<u8>) -> Self {
        Self { status, body }
    }

    pub(crate) fn json<T: DeserializeOwned>(&self) -> Result<T> {
        Ok(serde_json::from_slice(&self.body)?)
    }

    pub(crate) fn into_bytes(self) -> Vec<u8> {
        self.body
    }

    /// Turns any non-2xx response into a [`Rejection`], keeping the body's
    /// `message` field when it has a non-empty one.
    pub(crate) fn error_for_status(self) -> Result<Self> {
        if self.status.is_success() {
            return Ok(self);
        }

        let message = serde_json::from_slice::<ErrorBody>(&self.body)
            .ok()
            .and_then(|body| body.message)
            .filter(|message| !message.is_empty());
        Err(Rejection {
            status: self.status,
            message,
        }
        .into())
    }
}

/// Moves a request over the wire. Implementations report transport failures
/// as errors and hand back every HTTP response, whatever its status.
#[async_trait]
pub(crate) trait Transport: Send + Sync {
    async fn send(&self, request: Request) -> Result<Response>;
}

/// Sends requests with a fixed credential. A new gateway is built whenever the
/// credential changes; see [`Provider`].
pub(crate) struct Gateway<T> {
    transport: Arc<T>,
    credential: Option<Credential>,
    session: Option<SessionStore>,
}

impl<T> Clone for Gateway<T> {
    fn clone(&self) -> Self {
        Self {
            transport: Arc::clone(&self.transport),
            credential: self.credential.clone(),
            session: self.session.clone(),
        }
    }
}

impl<T: Transport> Gateway<T> {
    pub(crate) fn new(transport: Arc<T>, credential: Option<Credential>, session: SessionStore) -> Self {
        Self {
            transport,
            credential,
            session: Some(session),
        }
    }

    /// A gateway that neither sends a credential nor reacts to 401. Used for
    /// the login exchange itself, where 401 means "wrong password" rather than
    /// "session expired".
    pub(crate) const fn unauthenticated(transport: Arc<T>) -> Self {
        Self {
            transport,
            credential: None,
            session: None,
        }
    }

    #[cfg(test)]
    pub(crate) const fn credential(&self) -> Option<&Credential> {
        self.credential.as_ref()
    }

    pub(crate) async fn send(&self, mut request: Request) -> Result<Response> {
        if let Some(credential) = self.credential.as_ref() {
            request.bearer = Some(credential.token().clone());
        }

        debug!("{} {}", request.method, request.path);
        let result = self
            .transport
            .send(request)
            .await
            .and_then(Response::error_for_status);

        if let Err(ref err) = result {
            if err.is_unauthorized() {
                if let Some(session) = self.session.as_ref() {
                    warn!("The API rejected our credential; signing out");
                    if let Err(e) = session.logout().await {
                        warn!("Could not clear the stored token: {}", e);
                    }
                }
            }
        }

        result
    }
}

struct Current<T> {
    rx: watch::Receiver<Session>,
    gateway: Gateway<T>,
}

/// Hands out a [`Gateway`] bound to the session's current credential,
/// re-creating it when the session has changed since the last call.
pub(crate) struct Provider<T> {
    transport: Arc<T>,
    session: SessionStore,
    current: Arc<Mutex<Current<T>>>,
}

impl<T> Clone for Provider<T> {
    fn clone(&self) -> Self {
        Self {
            transport: Arc::clone(&self.transport),
            session: self.session.clone(),
            current: Arc::clone(&self.current),
        }
    }
}

impl<T: Transport> Provider<T> {
    pub(crate) fn new(transport: Arc<T>, session: SessionStore) -> Self {
        let mut rx = session.subscribe();
        let credential = rx.borrow_and_update().credential().cloned();
        let gateway = Gateway::new(Arc::clone(&transport), credential, session.clone());
        Self {
            transport,
            session,
            current: Arc::new(Mutex::new(Current { rx, gateway })),
        }
    }

    pub(crate) const fn session(&self) -> &SessionStore {
        &self.session
    }

    pub(crate) async fn gateway(&self) -> Gateway<T> {
        let mut current = self.current.lock().await;
        if current.rx.has_changed().unwrap_or(false) {
            let credential = current.rx.borrow_and_update().credential().cloned();
            debug!("Session changed; re-creating gateway");
            current.gateway = Gateway::new(Arc::clone(&self.transport), credential, self.session.clone());
        }
        current.gateway.clone()
    }

    pub(crate) fn unauthenticated(&self) -> Gateway<T> {
        Gateway::unauthenticated(Arc::clone(&self.transport))
    }
}
