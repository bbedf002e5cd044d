// SPDX-FileCopyrightText: 2024 Noah Fontes
//
// SPDX-License-Identifier: Apache-2.0

use std::{future::Future, sync::Arc};

use tokio::sync::Mutex;

use crate::error::Result;

/// Feedback for the latest submission. `success` and `error` are never both
/// set.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub(crate) struct Outcome {
    pub(crate) pending: bool,
    pub(crate) success: Option<String>,
    pub(crate) error: Option<String>,
}

impl Outcome {
    pub(crate) fn message(&self) -> Option<&str> {
        self.error.as_deref().or(self.success.as_deref())
    }
}

#[derive(Clone, Default)]
pub(crate) struct Tracker {
    outcome: Arc<Mutex<Outcome>>,
}

impl Tracker {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) async fn current(&self) -> Outcome {
        self.outcome.lock().await.clone()
    }

    /// Runs one submission, resetting the previous feedback first.
    pub(crate) async fn run<T, F>(&self, work: F, success: &str, fallback: &str) -> Result<T>
    where
        F: Future<Output = Result<T>> + Send,
    {
        *self.outcome.lock().await = Outcome {
            pending: true,
            success: None,
            error: None,
        };

        let result = work.await;

        let mut outcome = self.outcome.lock().await;
        outcome.pending = false;
        match result {
            Ok(_) => outcome.success = Some(success.to_owned()),
            Err(ref e) => outcome.error = Some(e.feedback(fallback)),
        }
        result
    }

    /// Records a submission refused before any request was made.
    pub(crate) async fn reject(&self, message: &str) {
        *self.outcome.lock().await = Outcome {
            pending: false,
            success: None,
            error: Some(message.to_owned()),
        };
    }
}
