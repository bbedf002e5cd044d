// SPDX-FileCopyrightText: 2022-2024 Noah Fontes
//
// SPDX-License-Identifier: Apache-2.0

use std::{ffi::OsString, path::Path};

use async_trait::async_trait;
use secrecy::SecretString;
use tokio::task;

use crate::{
    error::{self, Result},
    metadata,
};

/// What the user is asked for: the password of one account.
#[derive(Debug, Clone)]
pub(crate) struct Request {
    email: String,
}

impl Request {
    pub(crate) fn for_account<E: Into<String>>(email: E) -> Self {
        Self {
            email: email.into(),
        }
    }

    fn description(&self) -> String {
        format!("Contraseña de {}", self.email)
    }
}

#[async_trait]
pub(crate) trait Prompt: Send + Sync {
    async fn prompt(&self, req: Request) -> Result<Option<SecretString>>;
}

#[async_trait]
impl<T: Prompt + ?Sized> Prompt for Box<T> {
    async fn prompt(&self, req: Request) -> Result<Option<SecretString>> {
        (**self).prompt(req).await
    }
}

#[async_trait]
impl<T: Prompt> Prompt for Vec<T> {
    async fn prompt(&self, req: Request) -> Result<Option<SecretString>> {
        for candidate in self {
            if let r @ (Ok(Some(_)) | Err(_)) = candidate.prompt(req.clone()).await {
                return r;
            }
        }

        Ok(None)
    }
}

/// Asks each prompt in turn and fails when none of them could ask at all.
pub(crate) async fn require<P: Prompt + ?Sized>(prompt: &P, req: Request) -> Result<SecretString> {
    prompt
        .prompt(req)
        .await?
        .ok_or(error::Error::Password(error::Password::NoPrompt))
}

pub(crate) struct PinentryPrompt {
    executable: Option<OsString>,
}

impl PinentryPrompt {
    pub(crate) const fn new() -> Self {
        Self { executable: None }
    }

    pub(crate) fn new_with_executable<P: AsRef<Path>>(executable: P) -> Self {
        Self {
            executable: Some(executable.as_ref().as_os_str().into()),
        }
    }
}

#[async_trait]
impl Prompt for PinentryPrompt {
    async fn prompt(&self, req: Request) -> Result<Option<SecretString>> {
        fn interact<'input>(
            mut input: pinentry::PassphraseInput<'input>,
            title: &'input str,
            description: &'input str,
        ) -> Result<SecretString> {
            _ = input.required("Debes ingresar la contraseña para continuar.");
            _ = input.with_title(title);
            _ = input.with_description(description);
            _ = input.with_prompt("Contraseña");

            Ok(input.interact()?)
        }

        let title = format!("Contraseña - {}", *metadata::CLIENT_DISPLAY_NAME);
        let description = req.description();

        let input = self
            .executable
            .as_ref()
            .and_then(pinentry::PassphraseInput::with_binary)
            .or_else(pinentry::PassphraseInput::with_default_binary)
            .map(|input| task::spawn_blocking(move || interact(input, &title, &description)));

        Ok(match input {
            Some(fut) => Some(fut.await??),
            None => None,
        })
    }
}

pub(crate) struct RpasswordPrompt;

#[async_trait]
impl Prompt for RpasswordPrompt {
    async fn prompt(&self, req: Request) -> Result<Option<SecretString>> {
        let label = format!("{}: ", req.description());

        Ok(Some(
            task::spawn_blocking(move || rpassword::prompt_password(label).map(SecretString::new))
                .await??,
        ))
    }
}

#[cfg(test)]
mod tests {
    use secrecy::ExposeSecret as _;

    use super::*;

    struct Fixed(Option<&'static str>);

    #[async_trait]
    impl Prompt for Fixed {
        async fn prompt(&self, _: Request) -> Result<Option<SecretString>> {
            Ok(self.0.map(|s| SecretString::new(s.to_owned())))
        }
    }

    #[tokio::test]
    async fn first_prompt_that_answers_wins() -> Result<()> {
        let chain = vec![Fixed(None), Fixed(Some("Admin123*")), Fixed(Some("other"))];

        let password = require(&chain, Request::for_account("admin@litethinking.com")).await?;

        assert_eq!(password.expose_secret(), "Admin123*");
        Ok(())
    }

    #[tokio::test]
    async fn no_answer_is_an_error() {
        let chain = vec![Fixed(None)];

        let result = require(&chain, Request::for_account("admin@litethinking.com")).await;

        assert!(matches!(
            result,
            Err(error::Error::Password(error::Password::NoPrompt))
        ));
    }
}
