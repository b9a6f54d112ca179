//! API Gateway control-plane client.
//!
//! Lightweight SigV4-signed HTTP calls against the `apigateway` REST-JSON
//! endpoint instead of pulling in the full SDK. Only the three operations the
//! provisioner needs are implemented.

use std::time::SystemTime;

use aws_sigv4::http_request::{sign, SignableBody, SignableRequest, SigningSettings};
use aws_sigv4::sign::v4::SigningParams;
use aws_smithy_runtime_api::client::identity::Identity;
use http::Method;
use log::{debug, warn};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

use crate::config::Config;

/// Signing name and endpoint prefix of the control plane.
const SERVICE_NAME: &str = "apigateway";

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("API Gateway returned {status}: {message}")]
    Api { status: u16, message: String },
    #[error("request signing failed: {0}")]
    Sign(String),
    #[error("invalid endpoint: {0}")]
    Endpoint(String),
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("unexpected API Gateway response: {0}")]
    Decode(#[from] serde_json::Error),
}

/// A registered REST API as the provider reports it.
#[derive(Debug, Clone, Deserialize)]
pub struct RestApi {
    pub id: String,
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Deserialize)]
struct RestApis {
    #[serde(default)]
    item: Vec<RestApi>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CreateDeployment<'a> {
    stage_name: &'a str,
    stage_description: &'a str,
    description: &'a str,
}

#[derive(Debug, Deserialize)]
pub struct Deployment {
    pub id: String,
}

/// Client for the API Gateway management API. Cheap to construct; no
/// handshake happens until the first call, so handlers build one only when
/// their route actually needs it.
pub struct GatewayClient {
    http: Client,
    config: Config,
    endpoint: String,
}

impl GatewayClient {
    pub fn new(config: &Config) -> Self {
        let endpoint = config.endpoint_url.clone().unwrap_or_else(|| {
            format!("https://{}.{}.amazonaws.com", SERVICE_NAME, config.region)
        });
        Self {
            http: Client::new(),
            config: config.clone(),
            endpoint,
        }
    }

    /// Register a new REST API from a rendered proxy definition.
    pub async fn import_rest_api(&self, definition: &str) -> Result<RestApi, GatewayError> {
        let body = self
            .rest_json(Method::POST, "/restapis?mode=import", Some(definition))
            .await?;
        Ok(serde_json::from_str(&body)?)
    }

    /// Publish a REST API to a named stage.
    pub async fn create_deployment(
        &self,
        rest_api_id: &str,
        stage_name: &str,
        stage_description: &str,
        description: &str,
    ) -> Result<Deployment, GatewayError> {
        let payload = serde_json::to_string(&CreateDeployment {
            stage_name,
            stage_description,
            description,
        })?;
        let path = format!("/restapis/{rest_api_id}/deployments");
        let body = self.rest_json(Method::POST, &path, Some(&payload)).await?;
        Ok(serde_json::from_str(&body)?)
    }

    /// Fetch all REST APIs in the account/region. Single unpaginated call;
    /// accounts holding more gateways than one page returns are truncated.
    pub async fn get_rest_apis(&self) -> Result<Vec<RestApi>, GatewayError> {
        let body = self.rest_json(Method::GET, "/restapis", None).await?;
        let apis: RestApis = serde_json::from_str(&body)?;
        Ok(apis.item)
    }

    /// Send one signed REST-JSON request and return the response body.
    async fn rest_json(
        &self,
        method: Method,
        path_and_query: &str,
        body: Option<&str>,
    ) -> Result<String, GatewayError> {
        let url = format!("{}{}", self.endpoint, path_and_query);
        debug!("{} {}", method, url);

        let parsed = Url::parse(&url).map_err(|e| GatewayError::Endpoint(e.to_string()))?;
        let host = parsed
            .host_str()
            .ok_or_else(|| GatewayError::Endpoint(format!("no host in {url}")))?;
        let signable_path = match parsed.query() {
            Some(query) => format!("{}?{}", parsed.path(), query),
            None => parsed.path().to_string(),
        };

        let mut headers = vec![("host".to_string(), host.to_string())];
        if body.is_some() {
            headers.push(("content-type".to_string(), "application/json".to_string()));
        }

        let creds = aws_credential_types::Credentials::new(
            &self.config.credentials.access_key_id,
            &self.config.credentials.secret_access_key,
            self.config.credentials.session_token.clone(),
            None,
            "quantum-portal",
        );
        let identity: Identity = creds.into();

        let signing_params = SigningParams::builder()
            .identity(&identity)
            .region(&self.config.region)
            .name(SERVICE_NAME)
            .time(SystemTime::now())
            .settings(SigningSettings::default())
            .build()
            .map_err(|e| GatewayError::Sign(e.to_string()))?
            .into();

        let payload = body.unwrap_or("");
        let signable_request = SignableRequest::new(
            method.as_str(),
            &signable_path,
            headers.iter().map(|(k, v)| (k.as_str(), v.as_str())),
            SignableBody::Bytes(payload.as_bytes()),
        )
        .map_err(|e| GatewayError::Sign(e.to_string()))?;

        let (signing_instructions, _signature) = sign(signable_request, &signing_params)
            .map_err(|e| GatewayError::Sign(e.to_string()))?
            .into_parts();

        let mut request = self.http.request(method, url.as_str());
        for (name, value) in signing_instructions.headers() {
            request = request.header(name, value);
        }
        if let Some(payload) = body {
            request = request
                .header(http::header::CONTENT_TYPE, "application/json")
                .body(payload.to_string());
        }

        let response = request.send().await?;
        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            warn!("API Gateway call failed: status={}, body={}", status, text);
            return Err(GatewayError::Api {
                status: status.as_u16(),
                message: provider_message(&text),
            });
        }

        Ok(text)
    }
}

/// Pull the provider's `message` field out of an error body when present,
/// falling back to the raw body.
fn provider_message(body: &str) -> String {
    #[derive(Deserialize)]
    struct ApiMessage {
        message: String,
    }
    match serde_json::from_str::<ApiMessage>(body) {
        Ok(parsed) => parsed.message,
        Err(_) => body.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Credentials;
    use wiremock::matchers::{body_string_contains, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn init_log() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    fn test_config(endpoint: String) -> Config {
        Config {
            region: "us-east-1".to_string(),
            endpoint_url: Some(endpoint),
            credentials: Credentials {
                access_key_id: "AKIATEST".to_string(),
                secret_access_key: "secret".to_string(),
                session_token: None,
            },
        }
    }

    #[test]
    fn test_default_endpoint_is_regional() {
        init_log();
        let mut config = test_config(String::new());
        config.endpoint_url = None;
        let client = GatewayClient::new(&config);
        assert_eq!(client.endpoint, "https://apigateway.us-east-1.amazonaws.com");
    }

    #[test]
    fn test_provider_message_extraction() {
        assert_eq!(
            provider_message(r#"{"message":"Invalid OpenAPI input"}"#),
            "Invalid OpenAPI input"
        );
        assert_eq!(provider_message("plain failure"), "plain failure");
    }

    #[tokio::test]
    async fn test_import_rest_api() {
        init_log();
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/restapis"))
            .and(query_param("mode", "import"))
            .and(body_string_contains("QuantumPortal - example.com"))
            .respond_with(ResponseTemplate::new(201).set_body_string(
                r#"{"id":"abc123","name":"QuantumPortal - example.com"}"#,
            ))
            .expect(1)
            .mount(&server)
            .await;

        let client = GatewayClient::new(&test_config(server.uri()));
        let api = client
            .import_rest_api(&crate::template::render("example.com"))
            .await
            .unwrap();
        assert_eq!(api.id, "abc123");
        assert_eq!(api.name, "QuantumPortal - example.com");
    }

    #[tokio::test]
    async fn test_import_failure_surfaces_provider_message() {
        init_log();
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/restapis"))
            .respond_with(
                ResponseTemplate::new(400)
                    .set_body_string(r#"{"message":"Invalid OpenAPI input"}"#),
            )
            .mount(&server)
            .await;

        let client = GatewayClient::new(&test_config(server.uri()));
        let err = client.import_rest_api("{}").await.unwrap_err();
        match err {
            GatewayError::Api { status, ref message } => {
                assert_eq!(status, 400);
                assert_eq!(message, "Invalid OpenAPI input");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_create_deployment_payload() {
        init_log();
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/restapis/abc123/deployments"))
            .and(body_string_contains(r#""stageName":"QuantumPortal""#))
            .and(body_string_contains("QP Proxy for example.com"))
            .respond_with(ResponseTemplate::new(201).set_body_string(r#"{"id":"dep1"}"#))
            .expect(1)
            .mount(&server)
            .await;

        let client = GatewayClient::new(&test_config(server.uri()));
        let deployment = client
            .create_deployment(
                "abc123",
                "QuantumPortal",
                "QP Proxy for example.com",
                "QP Proxy for example.com",
            )
            .await
            .unwrap();
        assert_eq!(deployment.id, "dep1");
    }

    #[tokio::test]
    async fn test_get_rest_apis() {
        init_log();
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/restapis"))
            .respond_with(ResponseTemplate::new(200).set_body_string(
                r#"{"item":[{"id":"a1","name":"one"},{"id":"a2","name":"two"}]}"#,
            ))
            .mount(&server)
            .await;

        let client = GatewayClient::new(&test_config(server.uri()));
        let apis = client.get_rest_apis().await.unwrap();
        assert_eq!(apis.len(), 2);
        assert_eq!(apis[0].id, "a1");
        assert_eq!(apis[1].name, "two");
    }
}
