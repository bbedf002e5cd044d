// SPDX-FileCopyrightText: 2024 Noah Fontes
//
// SPDX-License-Identifier: Apache-2.0

use serde_json::json;

use crate::{
    error::{Error, Result},
    gateway::{Provider, Request, Transport},
    sync::{Outcome, Tracker},
};

const NO_COMPANY: &str = "Selecciona una empresa";

const DOWNLOADED: &str = "Inventario descargado correctamente";
const DOWNLOAD_FAILED: &str = "No fue posible descargar el inventario";
const SENT: &str = "Solicitud enviada. Revisa los logs o tu correo dependiendo de la configuración.";
const SEND_FAILED: &str = "No fue posible enviar el inventario por correo";

/// Inventory reports for one company at a time. Neither action touches the
/// cached catalog.
pub(crate) struct Inventory<T> {
    provider: Provider<T>,
    tracker: Tracker,
}

impl<T: Transport> Inventory<T> {
    pub(crate) fn new(provider: Provider<T>) -> Self {
        Self {
            provider,
            tracker: Tracker::new(),
        }
    }

    pub(crate) async fn outcome(&self) -> Outcome {
        self.tracker.current().await
    }

    async fn require(&self, nit: &str) -> Result<()> {
        if nit.trim().is_empty() {
            self.tracker.reject(NO_COMPANY).await;
            return Err(Error::Invalid(NO_COMPANY.to_owned()));
        }
        Ok(())
    }

    /// Fetches the inventory report of `nit` as a PDF document.
    pub(crate) async fn download(&self, nit: &str) -> Result<Vec<u8>> {
        self.require(nit).await?;

        self.tracker
            .run(
                async {
                    let gateway = self.provider.gateway().await;
                    let response = gateway
                        .send(Request::get(format!("/inventory/{nit}/pdf")))
                        .await?;
                    Ok(response.into_bytes())
                },
                DOWNLOADED,
                DOWNLOAD_FAILED,
            )
            .await
    }

    /// Asks the API to mail the report of `nit` to `destino`.
    pub(crate) async fn email(&self, nit: &str, destino: &str) -> Result<()> {
        self.require(nit).await?;

        self.tracker
            .run(
                async {
                    let request = Request::post(format!("/inventory/{nit}/email"))
                        .with_json(&json!({ "emailDestino": destino }))?;
                    let gateway = self.provider.gateway().await;
                    let _ = gateway.send(request).await?;
                    Ok(())
                },
                SENT,
                SEND_FAILED,
            )
            .await
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use reqwest::{Method, StatusCode};

    use crate::{
        gateway::Response,
        identity::Role,
        testing::{self, MockTransport},
    };

    use super::*;

    async fn inventory(transport: &Arc<MockTransport>) -> Inventory<MockTransport> {
        let session = testing::session_as("admin@litethinking.com", Role::Admin).await;
        Inventory::new(Provider::new(Arc::clone(transport), session))
    }

    #[tokio::test]
    async fn download_returns_the_document() -> Result<()> {
        let transport = Arc::new(MockTransport::new(|_| async {
            Ok(Response::new(StatusCode::OK, b"%PDF-1.7".to_vec()))
        }));
        let inventory = inventory(&transport).await;

        let pdf = inventory.download("900123456").await?;

        assert_eq!(pdf, b"%PDF-1.7");
        assert_eq!(transport.count(&Method::GET, "/inventory/900123456/pdf"), 1);
        assert_eq!(inventory.outcome().await.success.as_deref(), Some(DOWNLOADED));
        Ok(())
    }

    #[tokio::test]
    async fn email_names_the_recipient() -> Result<()> {
        let transport = Arc::new(MockTransport::new(|_| async {
            Ok(testing::status(StatusCode::ACCEPTED, json!(null)))
        }));
        let inventory = inventory(&transport).await;

        inventory
            .email("900123456", "gerencia@litethinking.com")
            .await?;

        let requests = transport.requests();
        assert_eq!(requests[0].method, Method::POST);
        assert_eq!(requests[0].path, "/inventory/900123456/email");
        assert_eq!(
            requests[0].body,
            Some(json!({"emailDestino": "gerencia@litethinking.com"}))
        );
        assert_eq!(inventory.outcome().await.success.as_deref(), Some(SENT));
        Ok(())
    }

    #[tokio::test]
    async fn a_company_must_be_selected() {
        let transport = Arc::new(MockTransport::new(|_| async { Ok(testing::ok(json!(null))) }));
        let inventory = inventory(&transport).await;

        assert!(matches!(inventory.download("").await, Err(Error::Invalid(_))));
        assert!(matches!(
            inventory.email("  ", "gerencia@litethinking.com").await,
            Err(Error::Invalid(_))
        ));

        assert!(transport.requests().is_empty());
        assert_eq!(inventory.outcome().await.error.as_deref(), Some(NO_COMPANY));
    }

    #[tokio::test]
    async fn failures_fall_back_to_a_generic_message() {
        let transport = Arc::new(MockTransport::new(|_| async {
            Ok(testing::status(StatusCode::INTERNAL_SERVER_ERROR, json!({})))
        }));
        let inventory = inventory(&transport).await;

        let _ = inventory.download("900123456").await;
        assert_eq!(inventory.outcome().await.error.as_deref(), Some(DOWNLOAD_FAILED));

        let _ = inventory.email("900123456", "x@y.co").await;
        assert_eq!(inventory.outcome().await.error.as_deref(), Some(SEND_FAILED));
    }
}
