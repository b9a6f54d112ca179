//! Request routing for the portal provisioner.
//!
//! One inbound HTTP-shaped event in, one `{ statusCode, body }` response out.
//! Dispatch is pure (path, method) matching; handlers share nothing between
//! invocations.

use std::collections::HashMap;

use async_trait::async_trait;
use http::{Method, StatusCode};
use log::error;
use matchit::{Match, Router};
use serde::{Deserialize, Serialize};

use crate::config::Config;

mod portal;

use portal::{CreatePortal, DeletePortal, ListPortals};

/// Stage every gateway is deployed to; also the fixed path segment of the
/// public invocation URL.
pub const STAGE_NAME: &str = "QuantumPortal";

/// Inbound invocation event. Absent fields route to the not-found branch;
/// structurally malformed events fail deserialization in the runtime layer
/// instead of being shaped into a response.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PortalEvent {
    #[serde(default)]
    pub http_method: String,
    #[serde(default)]
    pub path: String,
    #[serde(default)]
    pub query_string_parameters: Option<HashMap<String, String>>,
}

/// Invocation response. The body is always a JSON-encoded payload, even for
/// plain messages, so callers JSON-decode it regardless of status.
#[derive(Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PortalResponse {
    pub status_code: u16,
    pub body: String,
}

impl PortalResponse {
    /// Build a response with a JSON-encoded payload body.
    pub fn json<T: Serialize>(status: StatusCode, payload: &T) -> Self {
        match serde_json::to_string(payload) {
            Ok(body) => Self {
                status_code: status.as_u16(),
                body,
            },
            Err(e) => {
                error!("Failed to serialize response body: {}", e);
                Self {
                    status_code: StatusCode::INTERNAL_SERVER_ERROR.as_u16(),
                    body: "\"Internal Server Error\"".to_string(),
                }
            }
        }
    }

    /// Build a response whose body is a JSON-encoded string message.
    pub fn message(status: StatusCode, message: &str) -> Self {
        Self::json(status, &message)
    }
}

#[async_trait]
trait Handler {
    async fn handle(
        &self,
        config: &Config,
        params: &HashMap<String, String>,
    ) -> PortalResponse;
}

/// Router over the three portal endpoints. Built once per process; each
/// dispatch is an independent stateless unit of work.
pub struct PortalService {
    config: Config,
    router: Router<HashMap<Method, Box<dyn Handler + Send + Sync>>>,
}

impl PortalService {
    pub fn new(config: Config) -> Self {
        let mut this = Self {
            config,
            router: Router::new(),
        };

        this.route("/create", Method::GET, Box::new(CreatePortal {}))
            .route("/delete", Method::DELETE, Box::new(DeletePortal {}))
            .route("/list", Method::GET, Box::new(ListPortals {}));

        this
    }

    fn route(
        &mut self,
        path: &str,
        method: Method,
        handler: Box<dyn Handler + Send + Sync>,
    ) -> &mut Self {
        if self.router.at(path).is_err() {
            let mut handlers = HashMap::new();
            handlers.insert(method, handler);
            self.router.insert(path, handlers).unwrap();
        } else {
            let routes = self.router.at_mut(path).unwrap();
            routes.value.insert(method, handler);
        }
        self
    }

    /// Route one event to its handler and shape the response. A known path
    /// with an unsupported method is an invalid request; an unknown path is
    /// not found.
    pub async fn dispatch(&self, event: PortalEvent) -> PortalResponse {
        log::info!("{} {}", event.http_method, event.path);

        let params = event.query_string_parameters.unwrap_or_default();
        let method = Method::from_bytes(event.http_method.as_bytes()).ok();

        match self.router.at(&event.path) {
            Ok(Match { value, .. }) => match method.and_then(|m| value.get(&m)) {
                Some(handler) => handler.handle(&self.config, &params).await,
                None => PortalResponse::message(StatusCode::BAD_REQUEST, "Invalid request"),
            },
            Err(_) => PortalResponse::message(StatusCode::NOT_FOUND, "Endpoint not found"),
        }
    }
}
