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
    api::catalog::{Precio, ProductoInput, Productos},
    error::{self, Result},
    gateway::Transport,
    guard::View,
    sync::{Controller, Store},
};

use super::{report, Context};

/// List and maintain the products of a company.
#[derive(Debug, Parser)]
pub(crate) struct Command {
    /// NIT of the company whose products are shown.
    #[arg(long, short, global = true, default_value = "")]
    empresa: String,

    #[clap(subcommand)]
    action: Action,
}

#[derive(Debug, Subcommand)]
enum Action {
    /// List the company's products.
    List,
    /// Register a product with the company.
    Create(Fields),
    /// Replace a product's details.
    Update {
        #[clap()]
        id: String,
        #[command(flatten)]
        fields: Fields,
    },
    /// Remove a product.
    Delete {
        #[clap()]
        id: String,
    },
}

#[derive(Debug, Args)]
struct Fields {
    #[arg(long)]
    codigo: String,
    #[arg(long)]
    nombre: String,
    #[arg(long)]
    caracteristicas: Option<String>,
    /// A price as CURRENCY:VALUE, e.g. COP:150000. May be repeated.
    #[arg(long = "precio", value_parser = parse_precio)]
    precios: Vec<Precio>,
    /// A category name. May be repeated.
    #[arg(long = "categoria")]
    categorias: Vec<String>,
}

impl Fields {
    fn into_input(self, empresa_nit: &str) -> ProductoInput {
        ProductoInput {
            codigo: self.codigo,
            nombre: self.nombre,
            caracteristicas: self.caracteristicas.filter(|text| !text.trim().is_empty()),
            empresa_nit: empresa_nit.to_owned(),
            precios: self.precios,
            categorias: self.categorias,
        }
    }
}

fn parse_precio(value: &str) -> std::result::Result<Precio, String> {
    value.parse().map_err(|e: error::Error| e.to_string())
}

#[async_trait]
impl super::Command for Command {
    async fn execute<T: Transport>(self, ctx: &Context<T>) -> Result<()> {
        let _ = ctx.enter(View::Productos)?;
        if !matches!(self.action, Action::List) {
            let _ = ctx.edit(View::Productos)?;
        }
        if self.empresa.trim().is_empty() {
            return Err(error::Error::Invalid("Selecciona una empresa".to_owned()));
        }

        let productos =
            Controller::<Productos, _>::new(ctx.provider.clone(), Store::new(), self.empresa.clone());

        match self.action {
            Action::List => {}
            Action::Create(fields) => {
                let result = productos.create(&fields.into_input(&self.empresa)).await;
                report(&productos.outcome().await, result)?;
            }
            Action::Update { id, fields } => {
                let result = productos
                    .update(&id, &fields.into_input(&self.empresa))
                    .await;
                report(&productos.outcome().await, result)?;
            }
            Action::Delete { id } => {
                let result = productos.delete(&id).await;
                report(&productos.outcome().await, result)?;
            }
        }

        let snapshot = productos.ensure().await;
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
                println!("La empresa {} no tiene productos.", productos.scope());
                Ok(())
            }
            None => Err(error::Error::Command),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use reqwest::Method;
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
        Arc::new(MockTransport::new(|_| async { Ok(testing::ok(json!([]))) }))
    }

    #[tokio::test]
    async fn a_company_must_be_selected() {
        let transport = transport();
        let session = testing::session_as("admin@litethinking.com", Role::Admin).await;
        let ctx = testing::context(&transport, session);

        let result = super::super::Command::execute(parse(&["productos", "list"]), &ctx).await;

        assert!(matches!(result, Err(error::Error::Invalid(ref m)) if m == "Selecciona una empresa"));
        assert!(transport.requests().is_empty());
    }

    #[tokio::test]
    async fn listing_is_scoped_to_the_company() -> Result<()> {
        let transport = transport();
        let session = testing::session_as("admin@litethinking.com", Role::Admin).await;
        let ctx = testing::context(&transport, session);

        super::super::Command::execute(parse(&["productos", "--empresa", "900123456", "list"]), &ctx)
            .await?;

        let requests = transport.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].method, Method::GET);
        assert_eq!(
            requests[0].query,
            vec![("empresaNit".to_owned(), "900123456".to_owned())]
        );
        Ok(())
    }

    #[tokio::test]
    async fn viewers_cannot_open_products() {
        let transport = transport();
        let session = testing::session_as("viewer@litethinking.com", Role::Viewer).await;
        let ctx = testing::context(&transport, session);

        let result = super::super::Command::execute(
            parse(&["productos", "-e", "900123456", "delete", "prod-1"]),
            &ctx,
        )
        .await;

        assert!(matches!(
            result,
            Err(error::Error::Denied(Decision::RedirectToDefault))
        ));
        assert!(transport.requests().is_empty());
    }

    #[test]
    fn prices_are_parsed_from_the_command_line() {
        let cmd = parse(&[
            "productos", "-e", "900123456", "create", "--codigo", "P-001", "--nombre", "Teclado",
            "--precio", "cop:150000", "--precio", "usd:40",
        ]);

        match cmd.action {
            Action::Create(fields) => {
                let input = fields.into_input(&cmd.empresa);
                assert_eq!(input.empresa_nit, "900123456");
                assert_eq!(
                    input.precios.iter().map(|p| p.moneda.as_str()).collect::<Vec<_>>(),
                    ["COP", "USD"]
                );
            }
            other => panic!("unexpected action {other:?}"),
        }
    }
}
