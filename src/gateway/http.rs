// SPDX-FileCopyrightText: 2024 Noah Fontes
//
// SPDX-License-Identifier: Apache-2.0

use async_trait::async_trait;
use log::debug;
use secrecy::ExposeSecret as _;
use url::Url;

use crate::{error::Result, metadata};

use super::{Request, Response, Transport};

/// The API over HTTP(S). Timeouts are whatever reqwest defaults to.
pub(crate) struct Http {
    client: reqwest::Client,
    base: String,
}

impl Http {
    pub(crate) fn new(base: &Url) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(format!(
                "{}/{}",
                *metadata::CLIENT_TYPE_ID,
                env!("CARGO_PKG_VERSION")
            ))
            .build()?;
        Ok(Self {
            client,
            base: base.as_str().trim_end_matches('/').to_owned(),
        })
    }

    fn url(&self, path: &str) -> Result<Url> {
        Ok(Url::parse(&format!("{}{}", self.base, path))?)
    }

    fn build(&self, request: Request) -> Result<reqwest::Request> {
        let url = self.url(&request.path)?;

        let mut builder = self.client.request(request.method, url);
        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        if let Some(token) = request.bearer.as_ref() {
            builder = builder.bearer_auth(token.expose_secret());
        }
        if let Some(body) = request.body.as_ref() {
            builder = builder.json(body);
        }
        Ok(builder.build()?)
    }
}

#[async_trait]
impl Transport for Http {
    async fn send(&self, request: Request) -> Result<Response> {
        let resp = self.client.execute(self.build(request)?).await?;
        let status = resp.status();
        let body = resp.bytes().await?.to_vec();
        debug!("Received {} ({} bytes)", status, body.len());
        Ok(Response::new(status, body))
    }
}
