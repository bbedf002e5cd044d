// SPDX-FileCopyrightText: 2022-2024 Noah Fontes
//
// SPDX-License-Identifier: Apache-2.0

use async_trait::async_trait;
use log::error;

use crate::{
    error::{self, Result},
    gateway::{Provider, Transport},
    guard::{self, Decision, View},
    password::Prompt,
    session::Session,
    sync::Outcome,
};

pub(crate) mod auth;
pub(crate) mod categorias;
pub(crate) mod empresas;
pub(crate) mod inventario;
pub(crate) mod open;
pub(crate) mod productos;

/// Everything a command needs from the outside world.
pub(crate) struct Context<T> {
    pub(crate) provider: Provider<T>,
    pub(crate) prompt: Box<dyn Prompt>,
}

impl<T: Transport> Context<T> {
    /// Opens `view` for the current session or refuses with the guard's
    /// decision.
    pub(crate) fn enter(&self, view: View) -> Result<Session> {
        let session = self.provider.session().current();
        let decision = guard::check(view, &session);
        admit(session, decision)
    }

    /// Like [`Context::enter`], for commands that change records.
    pub(crate) fn edit(&self, view: View) -> Result<Session> {
        let session = self.provider.session().current();
        let decision = guard::check_write(view, &session);
        admit(session, decision)
    }
}

fn admit(session: Session, decision: Decision) -> Result<Session> {
    match decision {
        Decision::Allow => Ok(session),
        decision @ (Decision::RedirectToLogin | Decision::RedirectToDefault) => {
            Err(error::Error::Denied(decision))
        }
    }
}

#[async_trait]
pub(crate) trait Command {
    async fn execute<T: Transport>(self, ctx: &Context<T>) -> Result<()>;
}

/// Prints the feedback recorded for a submission. A failed submission has
/// already been explained to the user by the time it is returned.
pub(crate) fn report<V>(outcome: &Outcome, result: Result<V>) -> Result<V> {
    match result {
        Ok(value) => {
            if let Some(message) = outcome.message() {
                println!("{message}");
            }
            Ok(value)
        }
        Err(e) => {
            if let Some(message) = outcome.message() {
                eprintln!("{message}");
            }
            error!("{}", e);
            Err(error::Error::Command)
        }
    }
}
