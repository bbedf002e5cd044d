// SPDX-FileCopyrightText: 2024 Noah Fontes
//
// SPDX-License-Identifier: Apache-2.0

use async_trait::async_trait;
use clap::{Args, Parser, Subcommand};
use tabled::{
    settings::{object::Rows, Alignment, Modify, Style},
    Table,
};

use crate::{
    api::catalog::{EmpresaInput, EmpresaUpdate, Empresas},
    error::{self, Result},
    gateway::Transport,
    guard::View,
    sync::{Controller, Store},
};

use super::{report, Context};

/// List and maintain companies.
#[derive(Debug, Parser)]
pub(crate) struct Command {
    #[clap(subcommand)]
    action: Action,
}

#[derive(Debug, Subcommand)]
enum Action {
    /// List every company.
    List,
    /// Register a new company.
    Create {
        #[arg(long)]
        nit: String,
        #[command(flatten)]
        details: Details,
    },
    /// Change a company's details. The NIT cannot be changed.
    Update {
        #[clap()]
        nit: String,
        #[command(flatten)]
        details: Details,
    },
    /// Remove a company.
    Delete {
        #[clap()]
        nit: String,
    },
}

#[derive(Debug, Args)]
struct Details {
    #[arg(long)]
    nombre: String,
    #[arg(long)]
    direccion: String,
    #[arg(long)]
    telefono: String,
}

#[async_trait]
impl super::Command for Command {
    async fn execute<T: Transport>(self, ctx: &Context<T>) -> Result<()> {
        let _ = ctx.enter(View::Empresas)?;
        if !matches!(self.action, Action::List) {
            let _ = ctx.edit(View::Empresas)?;
        }
        let empresas = Controller::<Empresas, _>::new(ctx.provider.clone(), Store::new(), ());

        match self.action {
            Action::List => {}
            Action::Create { nit, details } => {
                let input = EmpresaInput {
                    nit,
                    nombre: details.nombre,
                    direccion: details.direccion,
                    telefono: details.telefono,
                };
                let result = empresas.create(&input).await;
                report(&empresas.outcome().await, result)?;
            }
            Action::Update { nit, details } => {
                let patch = EmpresaUpdate {
                    nombre: details.nombre,
                    direccion: details.direccion,
                    telefono: details.telefono,
                };
                let result = empresas.update(&nit, &patch).await;
                report(&empresas.outcome().await, result)?;
            }
            Action::Delete { nit } => {
                let result = empresas.delete(&nit).await;
                report(&empresas.outcome().await, result)?;
            }
        }

        let snapshot = empresas.ensure().await;
        if let Some(ref message) = snapshot.error {
            eprintln!("{message}");
        }
        match snapshot.value {
            Some(list) if !list.is_empty() => {
                println!(
                    "{}",
                    Table::new(list.iter())
                        .with(Style::rounded())
                        .with(Modify::new(Rows::new(1..)).with(Alignment::left()))
                );
                Ok(())
            }
            Some(_) => {
                println!("No hay empresas registradas.");
                Ok(())
            }
            None => Err(error::Error::Command),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use reqwest::{Method, StatusCode};
    use serde_json::json;

    use crate::{
        guard::Decision,
        identity::Role,
        testing::{self, MockTransport},
    };

    use super::*;

    fn parse(args: &[&str]) -> Command {
        Command::try_parse_from(args).unwrap_or_else(|e| panic!("{e}"))
    }

    fn transport() -> Arc<MockTransport> {
        Arc::new(MockTransport::new(|req| async move {
            Ok(match req.method {
                Method::GET => testing::ok(json!([])),
                _ => testing::status(StatusCode::NO_CONTENT, json!(null)),
            })
        }))
    }

    #[tokio::test]
    async fn viewers_cannot_change_companies() {
        let transport = transport();
        let session = testing::session_as("viewer@litethinking.com", Role::Viewer).await;
        let ctx = testing::context(&transport, session);

        for args in [
            &["empresas", "create", "--nit", "901000999", "--nombre", "Nueva Empresa", "--direccion", "Calle 123", "--telefono", "3000000000"][..],
            &["empresas", "update", "901000999", "--nombre", "Otra", "--direccion", "Calle 1", "--telefono", "1"][..],
            &["empresas", "delete", "900123456"][..],
        ] {
            let result = super::super::Command::execute(parse(args), &ctx).await;

            assert!(matches!(
                result,
                Err(error::Error::Denied(Decision::RedirectToDefault))
            ));
        }
        assert!(transport.requests().is_empty());
    }

    #[tokio::test]
    async fn viewers_may_list_companies() -> Result<()> {
        let transport = transport();
        let session = testing::session_as("viewer@litethinking.com", Role::Viewer).await;
        let ctx = testing::context(&transport, session);

        super::super::Command::execute(parse(&["empresas", "list"]), &ctx).await?;

        assert_eq!(transport.count(&Method::GET, "/empresas"), 1);
        Ok(())
    }

    #[tokio::test]
    async fn admins_delete_and_see_the_list_again() -> Result<()> {
        let transport = transport();
        let session = testing::session_as("admin@litethinking.com", Role::Admin).await;
        let ctx = testing::context(&transport, session);

        super::super::Command::execute(parse(&["empresas", "delete", "900123456"]), &ctx).await?;

        assert_eq!(transport.count(&Method::DELETE, "/empresas/900123456"), 1);
        assert_eq!(transport.count(&Method::GET, "/empresas"), 1);
        Ok(())
    }

    #[tokio::test]
    async fn signed_out_users_are_sent_to_login() {
        let transport = transport();
        let ctx = testing::context(&transport, testing::anonymous().await);

        let result = super::super::Command::execute(parse(&["empresas", "list"]), &ctx).await;

        assert!(matches!(
            result,
            Err(error::Error::Denied(Decision::RedirectToLogin))
        ));
        assert!(transport.requests().is_empty());
    }
}
