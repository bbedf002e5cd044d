// SPDX-FileCopyrightText: 2024 Noah Fontes
//
// SPDX-License-Identifier: Apache-2.0

//! Keeps a view's copy of a remote collection in step with the API.
//!
//! A [`Controller`] is bound to one entity type and one scope. Reads settle a
//! shared cache entry; a successful write invalidates that entry and reads it
//! again, so what is displayed always comes from the server.

mod cache;
mod outcome;

use std::{fmt, hash::Hash};

use log::debug;
use serde::{de::DeserializeOwned, Serialize};

use crate::{
    error::Result,
    gateway::{Provider, Request, Transport},
};

pub(crate) use cache::{Snapshot, Store};
pub(crate) use outcome::{Outcome, Tracker};

pub(crate) trait Resource: Send + Sync + 'static {
    type Scope: Clone + Eq + Hash + fmt::Debug + Send + Sync + 'static;
    type Value: DeserializeOwned + Send + Sync + 'static;

    /// Shown when a read fails without a server message.
    const LOAD_FAILED: &'static str;

    fn read(scope: &Self::Scope) -> Request;
}

/// User-facing feedback for the three writes.
pub(crate) struct Messages {
    pub(crate) created: &'static str,
    pub(crate) updated: &'static str,
    pub(crate) deleted: &'static str,
    pub(crate) create_failed: &'static str,
    pub(crate) update_failed: &'static str,
    pub(crate) delete_failed: &'static str,
}

pub(crate) trait Writable: Resource {
    type Input: Serialize + Send + Sync;
    type Patch: Serialize + Send + Sync;

    const MESSAGES: Messages;

    fn create(input: &Self::Input) -> Result<Request>;
    fn update(id: &str, patch: &Self::Patch) -> Result<Request>;
    fn delete(id: &str) -> Request;
}

pub(crate) struct Controller<R: Resource, T> {
    provider: Provider<T>,
    store: Store<R::Scope, R::Value>,
    scope: R::Scope,
    tracker: Tracker,
}

impl<R: Resource, T: Transport> Controller<R, T> {
    pub(crate) fn new(provider: Provider<T>, store: Store<R::Scope, R::Value>, scope: R::Scope) -> Self {
        Self {
            provider,
            store,
            scope,
            tracker: Tracker::new(),
        }
    }

    pub(crate) const fn scope(&self) -> &R::Scope {
        &self.scope
    }

    /// Fetches the scope. Failures are recorded in the snapshot next to the
    /// last good value. A read overtaken by a newer one for the same scope is
    /// dropped when it lands.
    pub(crate) async fn read(&self) -> Snapshot<R::Value> {
        let ticket = self.store.begin(&self.scope).await;

        let result = async {
            let gateway = self.provider.gateway().await;
            gateway.send(R::read(&self.scope)).await?.json::<R::Value>()
        }
        .await
        .map_err(|e| e.feedback(R::LOAD_FAILED));

        if !self.store.complete(&self.scope, ticket, result).await {
            debug!("Dropping superseded read of {:?}", self.scope);
        }
        self.store.snapshot(&self.scope).await
    }

    /// Reads only when nothing is cached or the entry was invalidated.
    pub(crate) async fn ensure(&self) -> Snapshot<R::Value> {
        if self.store.needs_fetch(&self.scope).await {
            self.read().await
        } else {
            self.store.snapshot(&self.scope).await
        }
    }

    #[cfg(test)]
    pub(crate) async fn snapshot(&self) -> Snapshot<R::Value> {
        self.store.snapshot(&self.scope).await
    }

    pub(crate) async fn outcome(&self) -> Outcome {
        self.tracker.current().await
    }
}

impl<R: Writable, T: Transport> Controller<R, T> {
    pub(crate) async fn create(&self, input: &R::Input) -> Result<()> {
        self.write(R::create(input), R::MESSAGES.created, R::MESSAGES.create_failed)
            .await
    }

    pub(crate) async fn update(&self, id: &str, patch: &R::Patch) -> Result<()> {
        self.write(R::update(id, patch), R::MESSAGES.updated, R::MESSAGES.update_failed)
            .await
    }

    pub(crate) async fn delete(&self, id: &str) -> Result<()> {
        self.write(Ok(R::delete(id)), R::MESSAGES.deleted, R::MESSAGES.delete_failed)
            .await
    }

    async fn write(&self, request: Result<Request>, success: &str, fallback: &str) -> Result<()> {
        self.tracker
            .run(
                async {
                    let gateway = self.provider.gateway().await;
                    let _ = gateway.send(request?).await?;
                    self.store.invalidate(&self.scope).await;
                    Ok(())
                },
                success,
                fallback,
            )
            .await?;

        let _ = self.read().await;
        Ok(())
    }
}
