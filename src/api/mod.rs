// SPDX-FileCopyrightText: 2022-2024 Noah Fontes
//
// SPDX-License-Identifier: Apache-2.0

//! The catalog API as seen from the console.

pub(crate) mod auth;
pub(crate) mod catalog;
pub(crate) mod inventory;

use async_trait::async_trait;
use serde::de::DeserializeOwned;

use crate::{
    error::Result,
    gateway::{Gateway, Request, Transport},
};

/// A one-shot call whose answer is not cached.
#[async_trait]
pub(crate) trait Executor: Send + Sync + Sized {
    type Response: DeserializeOwned;

    fn request(&self) -> Result<Request>;

    async fn execute<T: Transport>(self, gateway: &Gateway<T>) -> Result<Self::Response> {
        gateway.send(self.request()?).await?.json()
    }
}
