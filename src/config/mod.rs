use std::env;

use log::debug;
use thiserror::Error;
use url::Url;
use validator::{Validate, ValidationError};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable {0}")]
    MissingVar(&'static str),
    #[error("invalid configuration: {0}")]
    Invalid(#[from] validator::ValidationErrors),
}

/// Runtime configuration, resolved once per process from the function's
/// environment.
#[derive(Debug, Clone, Validate)]
#[validate(schema(function = "Config::validate_endpoint_url"))]
pub struct Config {
    /// Region used both for request signing and for building invocation URLs.
    #[validate(length(min = 1))]
    pub region: String,

    /// Optional control-plane endpoint override (LocalStack, tests). When
    /// unset the regional `apigateway` endpoint is derived from the region.
    pub endpoint_url: Option<String>,

    pub credentials: Credentials,
}

#[derive(Debug, Clone)]
pub struct Credentials {
    pub access_key_id: String,
    pub secret_access_key: String,
    pub session_token: Option<String>,
}

impl Config {
    /// Resolve configuration from the environment and validate it.
    pub fn from_env() -> Result<Self, ConfigError> {
        let region = env::var("AWS_REGION")
            .or_else(|_| env::var("AWS_DEFAULT_REGION"))
            .map_err(|_| ConfigError::MissingVar("AWS_REGION"))?;

        let credentials = Credentials {
            access_key_id: env::var("AWS_ACCESS_KEY_ID")
                .map_err(|_| ConfigError::MissingVar("AWS_ACCESS_KEY_ID"))?,
            secret_access_key: env::var("AWS_SECRET_ACCESS_KEY")
                .map_err(|_| ConfigError::MissingVar("AWS_SECRET_ACCESS_KEY"))?,
            session_token: env::var("AWS_SESSION_TOKEN").ok(),
        };

        let config = Config {
            region,
            endpoint_url: env::var("APIGATEWAY_ENDPOINT_URL").ok(),
            credentials,
        };

        config.validate()?;
        debug!("Loaded config for region {}", config.region);

        Ok(config)
    }

    fn validate_endpoint_url(&self) -> Result<(), ValidationError> {
        if let Some(endpoint) = &self.endpoint_url {
            if Url::parse(endpoint).is_err() {
                return Err(ValidationError::new("invalid_endpoint_url"));
            }
        }
        Ok(())
    }
}
