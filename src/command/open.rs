// SPDX-FileCopyrightText: 2024 Noah Fontes
//
// SPDX-License-Identifier: Apache-2.0

use async_trait::async_trait;
use clap::Parser;
use log::info;

use crate::{error::Result, gateway::Transport, guard};

use super::Context;

/// Resolve a route to the view the current session would end up on.
#[derive(Debug, Parser)]
pub(crate) struct Command {
    /// A route such as /empresas.
    #[clap(default_value = "/")]
    path: String,
}

#[async_trait]
impl super::Command for Command {
    async fn execute<T: Transport>(self, ctx: &Context<T>) -> Result<()> {
        let session = ctx.provider.session().current();
        let view = guard::navigate(&self.path, &session);

        if view.path() != self.path.trim_end_matches('/') {
            info!("{} redirected to {}", self.path, view.path());
        }
        println!("{}", view.path());
        Ok(())
    }
}
