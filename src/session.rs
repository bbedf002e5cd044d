// SPDX-FileCopyrightText: 2022-2024 Noah Fontes
//
// SPDX-License-Identifier: Apache-2.0

use std::sync::Arc;

use futures_util::lock::Mutex;
use log::{debug, info, warn};
use secrecy::ExposeSecret as _;
use tokio::sync::watch;

use crate::{
    error::Result,
    identity::{Credential, Role},
    storage::Storage,
};

/// Read-only view of who is signed in.
#[derive(Clone, Debug, Default)]
pub(crate) struct Session {
    credential: Option<Credential>,
}

impl Session {
    pub(crate) const fn anonymous() -> Self {
        Self { credential: None }
    }

    pub(crate) const fn authenticated(credential: Credential) -> Self {
        Self {
            credential: Some(credential),
        }
    }

    pub(crate) const fn credential(&self) -> Option<&Credential> {
        self.credential.as_ref()
    }

    pub(crate) const fn is_authenticated(&self) -> bool {
        self.credential.is_some()
    }

    pub(crate) fn subject(&self) -> Option<&str> {
        self.credential.as_ref().map(Credential::subject)
    }

    pub(crate) fn role(&self) -> Option<Role> {
        self.credential.as_ref().map(Credential::role)
    }
}

type SharedStorage = Arc<Mutex<Box<dyn Storage<String>>>>;

/// Owns the current [`Session`] and keeps the durable copy of the token in
/// step with it.
///
/// Writers take the storage lock for the whole of an update, so concurrent
/// `login`/`logout` calls apply in order and the last one wins. Readers only
/// ever see whole [`Session`] values through the watch channel.
#[derive(Clone)]
pub(crate) struct SessionStore {
    storage: SharedStorage,
    tx: Arc<watch::Sender<Session>>,
}

impl SessionStore {
    /// Rehydrates the session from storage. A stored token that cannot be
    /// decoded, or a slot that cannot be read, is cleared and the session
    /// starts anonymous.
    pub(crate) async fn init(mut storage: Box<dyn Storage<String>>) -> Self {
        let session = match storage.get().await {
            Ok(Some(raw)) => match Credential::parse(raw) {
                Ok(credential) => {
                    info!("Restored session for {}", credential.subject());
                    Session::authenticated(credential)
                }
                Err(e) => {
                    warn!("Discarding stored token that could not be decoded: {}", e);
                    Self::discard(storage.as_mut()).await;
                    Session::anonymous()
                }
            },
            Ok(None) => {
                debug!("No stored token; starting anonymous");
                Session::anonymous()
            }
            Err(e) => {
                warn!("Could not read stored token: {}", e);
                Self::discard(storage.as_mut()).await;
                Session::anonymous()
            }
        };

        let (tx, _) = watch::channel(session);
        Self {
            storage: Arc::new(Mutex::new(storage)),
            tx: Arc::new(tx),
        }
    }

    async fn discard(storage: &mut dyn Storage<String>) {
        if let Err(e) = storage.clear().await {
            warn!("Could not clear stored token: {}", e);
        }
    }

    pub(crate) fn current(&self) -> Session {
        self.tx.borrow().clone()
    }

    pub(crate) fn subscribe(&self) -> watch::Receiver<Session> {
        self.tx.subscribe()
    }

    pub(crate) async fn is_persistent(&self) -> bool {
        self.storage.lock().await.is_persistent()
    }

    /// Replaces the session with the identity carried by `raw`. A token that
    /// cannot be decoded leaves the current session untouched.
    pub(crate) async fn login(&self, raw: String) -> Result<()> {
        let credential = Credential::parse(raw)?;

        let mut storage = self.storage.lock().await;
        storage
            .update(credential.token().expose_secret())
            .await?;

        info!("Signed in as {} ({})", credential.subject(), credential.role());
        let _previous = self.tx.send_replace(Session::authenticated(credential));
        Ok(())
    }

    /// Drops the session and erases the stored token. Safe to call when
    /// already anonymous.
    pub(crate) async fn logout(&self) -> Result<()> {
        let mut storage = self.storage.lock().await;

        let previous = self.tx.send_replace(Session::anonymous());
        if let Some(subject) = previous.subject() {
            info!("Signed out {}", subject);
        }

        storage.clear().await.map_err(|e| {
            warn!(
                "Signed out, but the stored token could not be erased and will be restored next time: {}",
                e
            );
            e
        })
    }
}
