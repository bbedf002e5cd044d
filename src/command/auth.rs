// SPDX-FileCopyrightText: 2024 Noah Fontes
//
// SPDX-License-Identifier: Apache-2.0

use async_trait::async_trait;
use clap::Parser;
use log::{error, info};

use crate::{
    api::auth::{self, LOGIN_FAILED, REGISTER_FAILED},
    error::{self, Result},
    gateway::Transport,
    guard::View,
    identity::Role,
    password,
};

use super::Context;

/// Sign in and keep the issued token for later commands.
#[derive(Debug, Parser)]
pub(crate) struct Login {
    /// The account's email address.
    #[clap()]
    email: String,
}

#[async_trait]
impl super::Command for Login {
    async fn execute<T: Transport>(self, ctx: &Context<T>) -> Result<()> {
        let password =
            password::require(&ctx.prompt, password::Request::for_account(&self.email)).await?;

        let call = auth::Login {
            email: self.email,
            password,
        };
        match auth::sign_in(&ctx.provider, call).await {
            Ok(response) => {
                let session = ctx.provider.session().current();
                println!(
                    "Sesion iniciada como {} ({}); el token vence en {} minutos.",
                    session.subject().unwrap_or_default(),
                    session.role().map(|role| role.to_string()).unwrap_or_default(),
                    response.expires_in_minutes,
                );
                Ok(())
            }
            Err(e) => {
                eprintln!("{}", e.feedback(LOGIN_FAILED));
                error!("{}", e);
                Err(error::Error::Command)
            }
        }
    }
}

/// Create an account and sign in with it.
#[derive(Debug, Parser)]
pub(crate) struct Register {
    /// The new account's email address.
    #[clap()]
    email: String,

    /// The role granted to the new account.
    #[arg(long, short, value_enum, default_value_t = Role::Viewer)]
    role: Role,
}

#[async_trait]
impl super::Command for Register {
    async fn execute<T: Transport>(self, ctx: &Context<T>) -> Result<()> {
        let password =
            password::require(&ctx.prompt, password::Request::for_account(&self.email)).await?;

        let call = auth::Register {
            email: self.email,
            password,
            role: self.role,
        };
        match auth::sign_in(&ctx.provider, call).await {
            Ok(_) => {
                println!("Usuario registrado como {}.", self.role);
                Ok(())
            }
            Err(e) => {
                eprintln!("{}", e.feedback(REGISTER_FAILED));
                error!("{}", e);
                Err(error::Error::Command)
            }
        }
    }
}

/// Forget the current session.
#[derive(Debug, Parser)]
pub(crate) struct Logout;

#[async_trait]
impl super::Command for Logout {
    async fn execute<T: Transport>(self, ctx: &Context<T>) -> Result<()> {
        ctx.provider.session().logout().await?;
        info!("Stored token erased");
        println!("Sesion cerrada.");
        Ok(())
    }
}

/// Show who is signed in and which views are open to them.
#[derive(Debug, Parser)]
pub(crate) struct Whoami;

#[async_trait]
impl super::Command for Whoami {
    async fn execute<T: Transport>(self, ctx: &Context<T>) -> Result<()> {
        let session = ctx.enter(View::Home)?;

        println!(
            "{} ({})",
            session.subject().unwrap_or_default(),
            session.role().map(|role| role.to_string()).unwrap_or_default()
        );
        println!(
            "Vistas: {}",
            View::menu(&session)
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join(", ")
        );
        if !ctx.provider.session().is_persistent().await {
            println!("La sesion solo dura mientras se ejecuta este comando.");
        }
        Ok(())
    }
}
