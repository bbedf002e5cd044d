// SPDX-FileCopyrightText: 2022-2024 Noah Fontes
//
// SPDX-License-Identifier: Apache-2.0

#![forbid(unsafe_code)]
#![deny(elided_lifetimes_in_paths)]
#![warn(
    rust_2018_idioms,
    future_incompatible,
    unused,
    unused_lifetimes,
    unused_qualifications,
    unused_results,
    anonymous_parameters,
    deprecated_in_future,
    elided_lifetimes_in_paths,
    explicit_outlives_requirements,
    keyword_idents,
    macro_use_extern_crate,
    missing_doc_code_examples,
    private_doc_tests,
    trivial_casts,
    trivial_numeric_casts,
    unreachable_pub,
    clippy::all,
    clippy::pedantic,
    clippy::cargo,
    clippy::unseparated_literal_suffix,
    clippy::decimal_literal_representation,
    clippy::single_char_lifetime_names,
    clippy::fallible_impl_from,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::wildcard_enum_match_arm,
    clippy::deref_by_slicing,
    clippy::default_numeric_fallback,
    clippy::shadow_reuse,
    clippy::clone_on_ref_ptr,
    clippy::todo,
    clippy::string_add,
    clippy::use_debug,
    clippy::future_not_send
)]
#![cfg_attr(not(test), warn(clippy::panic_in_result_fn))]

mod api;
mod command;
mod error;
mod gateway;
mod guard;
mod identity;
mod metadata;
mod password;
mod session;
mod storage;
mod sync;
#[cfg(test)]
mod testing;

use std::{path::PathBuf, process, sync::Arc};

use async_trait::async_trait;
use clap::{Parser, Subcommand};
use error::Result;
use gateway::{Http, Provider, Transport};
use log::{error, warn};
use session::SessionStore;
use url::Url;

#[derive(Debug, Subcommand)]
enum Command {
    Login(command::auth::Login),
    Register(command::auth::Register),
    Logout(command::auth::Logout),
    Whoami(command::auth::Whoami),
    Empresas(command::empresas::Command),
    Productos(command::productos::Command),
    Categorias(command::categorias::Command),
    Inventario(command::inventario::Command),
    Open(command::open::Command),
}

#[async_trait]
impl command::Command for Command {
    async fn execute<T: Transport>(self, ctx: &command::Context<T>) -> Result<()> {
        match self {
            Self::Login(cmd) => command::Command::execute(cmd, ctx).await,
            Self::Register(cmd) => command::Command::execute(cmd, ctx).await,
            Self::Logout(cmd) => command::Command::execute(cmd, ctx).await,
            Self::Whoami(cmd) => command::Command::execute(cmd, ctx).await,
            Self::Empresas(cmd) => command::Command::execute(cmd, ctx).await,
            Self::Productos(cmd) => command::Command::execute(cmd, ctx).await,
            Self::Categorias(cmd) => command::Command::execute(cmd, ctx).await,
            Self::Inventario(cmd) => command::Command::execute(cmd, ctx).await,
            Self::Open(cmd) => command::Command::execute(cmd, ctx).await,
        }
    }
}

#[derive(Debug, Parser)]
#[command(author, version, about)]
struct Args {
    /// The base URL of the catalog API. A trailing slash is ignored.
    #[arg(long, env = "LT_API_URL", default_value = "http://localhost:8080/api", value_parser = Url::parse)]
    api_url: Url,

    /// Keep the session token in memory only, so it is gone when the command
    /// ends.
    #[arg(long)]
    no_persist_session: bool,

    /// The path to the Pinentry program to use when asking for an account
    /// password.
    #[arg(long, value_hint = clap::ValueHint::ExecutablePath)]
    pinentry_program: Option<PathBuf>,

    #[clap(subcommand)]
    command: Command,
}

async fn get_session_storage(args: &Args) -> Box<dyn storage::Storage<String>> {
    if !args.no_persist_session {
        #[cfg(feature = "secret-service")]
        match storage::SecretService::new(&args.api_url).await {
            Ok(secret_service_storage) => return Box::new(secret_service_storage),
            Err(e) => {
                warn!("We need to fall back to unencrypted file storage because we can't connect to the secret service: {}", e);
            }
        }

        #[cfg(feature = "keychain")]
        match storage::Keychain::new(&args.api_url) {
            Ok(keychain_storage) => return Box::new(keychain_storage),
            Err(e) => {
                warn!("We need to fall back to unencrypted file storage because we can't connect to Keychain: {}", e);
            }
        }

        if let Some(file_storage) = storage::File::new(metadata::TOKEN_FILE) {
            return Box::new(file_storage);
        }
        warn!(
            "{}; the session will not outlive this command",
            error::Storage::NoProjectDirs
        );
    }

    Box::new(storage::Memory::<String>::new())
}

async fn run(args: Args) -> Result<()> {
    let prompt: Vec<Box<dyn password::Prompt>> = vec![
        Box::new(args.pinentry_program.clone().map_or_else(
            password::PinentryPrompt::new,
            password::PinentryPrompt::new_with_executable,
        )),
        Box::new(password::RpasswordPrompt),
    ];

    let session = SessionStore::init(get_session_storage(&args).await).await;
    let transport = Arc::new(Http::new(&args.api_url)?);
    let ctx = command::Context {
        provider: Provider::new(transport, session),
        prompt: Box::new(prompt),
    };

    command::Command::execute(args.command, &ctx).await
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let logger_env = env_logger::Env::new()
        .filter_or("LT_LOG", "warn")
        .write_style("LT_LOG_STYLE");
    env_logger::Builder::from_env(logger_env).init();

    if let Err(e) = run(Args::parse()).await {
        error!("We encountered an error: {}", e);
        process::exit(1);
    };
}
