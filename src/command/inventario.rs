// SPDX-FileCopyrightText: 2024 Noah Fontes
//
// SPDX-License-Identifier: Apache-2.0

use std::path::PathBuf;

use async_trait::async_trait;
use clap::{Parser, Subcommand};
use log::info;

use crate::{
    api::inventory::Inventory,
    error::Result,
    gateway::Transport,
    guard::View,
};

use super::{report, Context};

/// Get a company's inventory report.
#[derive(Debug, Parser)]
pub(crate) struct Command {
    /// NIT of the company.
    #[arg(long, short, global = true, default_value = "")]
    empresa: String,

    #[clap(subcommand)]
    action: Action,
}

#[derive(Debug, Subcommand)]
enum Action {
    /// Download the report as a PDF.
    Pdf {
        /// Where to write the document. Defaults to inventario-NIT.pdf in the
        /// current directory.
        #[arg(long, short, value_hint = clap::ValueHint::FilePath)]
        output: Option<PathBuf>,
    },
    /// Have the API mail the report.
    Email {
        /// The recipient's address.
        #[clap()]
        destino: String,
    },
}

#[async_trait]
impl super::Command for Command {
    async fn execute<T: Transport>(self, ctx: &Context<T>) -> Result<()> {
        let _ = ctx.enter(View::Inventario)?;
        let inventory = Inventory::new(ctx.provider.clone());

        match self.action {
            Action::Pdf { output } => {
                let result = inventory.download(&self.empresa).await;
                let pdf = report(&inventory.outcome().await, result)?;

                let path = output
                    .unwrap_or_else(|| PathBuf::from(format!("inventario-{}.pdf", self.empresa)));
                tokio::fs::write(&path, pdf).await?;
                info!("Wrote inventory report to {}", path.display());
                Ok(())
            }
            Action::Email { destino } => {
                let result = inventory.email(&self.empresa, &destino).await;
                report(&inventory.outcome().await, result)
            }
        }
    }
}
