//! The three portal route handlers: create, delete (stub), list.

use std::collections::HashMap;

use async_trait::async_trait;
use http::StatusCode;
use log::{debug, info};
use serde::Serialize;

use super::{Handler, PortalResponse, STAGE_NAME};
use crate::config::Config;
use crate::gateway::GatewayClient;
use crate::template;

/// GET /create?targetUrl=…
///
/// Imports the rendered proxy definition as a new REST API, deploys it to the
/// portal stage, and returns the public invocation URL. The two external
/// calls are strictly sequential; a deploy failure leaves the imported
/// gateway behind (no rollback). Re-creating the same target creates a
/// duplicate gateway; there is no idempotency guard.
pub(super) struct CreatePortal {}

#[async_trait]
impl Handler for CreatePortal {
    async fn handle(
        &self,
        config: &Config,
        params: &HashMap<String, String>,
    ) -> PortalResponse {
        let target_url = match params
            .get("targetUrl")
            .map(String::as_str)
            .filter(|url| !url.is_empty())
        {
            Some(url) => url,
            None => {
                return PortalResponse::message(
                    StatusCode::BAD_REQUEST,
                    "Please provide a valid target URL",
                )
            }
        };

        debug!("Provisioning {} for {}", template::display_name(target_url), target_url);

        let definition = template::render(target_url);
        let client = GatewayClient::new(config);

        let api = match client.import_rest_api(&definition).await {
            Ok(api) => api,
            Err(e) => {
                return PortalResponse::message(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    &e.to_string(),
                )
            }
        };

        let api_url = format!(
            "https://{}.execute-api.{}.amazonaws.com/{}",
            api.id, config.region, STAGE_NAME
        );

        let stage_note = format!("QP Proxy for {target_url}");
        if let Err(e) = client
            .create_deployment(&api.id, STAGE_NAME, &stage_note, &stage_note)
            .await
        {
            // The gateway imported above stays registered.
            return PortalResponse::message(StatusCode::INTERNAL_SERVER_ERROR, &e.to_string());
        }

        info!("Provisioned {} at {}", api.id, api_url);
        PortalResponse::message(StatusCode::OK, &api_url)
    }
}

/// DELETE /delete?targetUrl=…
///
/// Echo-only acknowledgement; gateway teardown is not wired up yet and no
/// provider call is made.
pub(super) struct DeletePortal {}

#[async_trait]
impl Handler for DeletePortal {
    async fn handle(
        &self,
        _config: &Config,
        params: &HashMap<String, String>,
    ) -> PortalResponse {
        let target_url = params
            .get("targetUrl")
            .map(String::as_str)
            .unwrap_or("Not provided");
        PortalResponse::message(StatusCode::OK, &format!("Delete: {target_url}"))
    }
}

#[derive(Debug, PartialEq, Serialize)]
pub struct PortalEntry {
    pub url: String,
    pub api_id: String,
}

/// GET /list
///
/// Enumerates every gateway whose name carries the portal title marker,
/// preserving provider order. One unpaginated fetch.
pub(super) struct ListPortals {}

#[async_trait]
impl Handler for ListPortals {
    async fn handle(
        &self,
        config: &Config,
        _params: &HashMap<String, String>,
    ) -> PortalResponse {
        let client = GatewayClient::new(config);

        let apis = match client.get_rest_apis().await {
            Ok(apis) => apis,
            Err(e) => {
                return PortalResponse::message(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    &e.to_string(),
                )
            }
        };

        let portals: Vec<PortalEntry> = apis
            .into_iter()
            .filter(|api| api.name.contains(template::TITLE_MARKER))
            .map(|api| PortalEntry {
                url: api.name.replace(template::TITLE_MARKER, ""),
                api_id: api.id,
            })
            .collect();

        PortalResponse::json(StatusCode::OK, &portals)
    }
}
