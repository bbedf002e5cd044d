// SPDX-FileCopyrightText: 2024 Noah Fontes
//
// SPDX-License-Identifier: Apache-2.0

use async_trait::async_trait;
use clap::Parser;
use tabled::{settings::Style, Table};

use crate::{
    api::catalog::Categorias,
    error::{self, Result},
    gateway::Transport,
    guard::View,
    sync::{Controller, Store},
};

use super::Context;

/// List the product categories.
#[derive(Debug, Parser)]
pub(crate) struct Command;

#[async_trait]
impl super::Command for Command {
    async fn execute<T: Transport>(self, ctx: &Context<T>) -> Result<()> {
        let _ = ctx.enter(View::Productos)?;
        let categorias = Controller::<Categorias, _>::new(ctx.provider.clone(), Store::new(), ());

        let snapshot = categorias.ensure().await;
        match (snapshot.value, snapshot.error) {
            (Some(list), _) => {
                println!("{}", Table::new(list.iter()).with(Style::rounded()));
                Ok(())
            }
            (None, message) => {
                eprintln!("{}", message.unwrap_or_default());
                Err(error::Error::Command)
            }
        }
    }
}
