//! Configuration module

use std::env;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;

use crate::features::MissingFeaturePolicy;

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Text,
    Json,
}

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Listen address
    pub host: IpAddr,

    /// Server port
    pub port: u16,

    /// Directory holding the model artifacts
    pub artifacts_dir: PathBuf,

    /// Classifier artifact file name
    pub model_file: String,

    /// Preprocessor artifact file name
    pub preprocessor_file: String,

    /// Model configuration file name
    pub model_config_file: String,

    /// The single origin allowed by CORS
    pub cors_origin: String,

    /// What to do when a declared log feature cannot be derived
    pub missing_feature_policy: MissingFeaturePolicy,

    /// Reject feature names outside the patient record schema at load time
    pub strict_feature_schema: bool,

    pub log_format: LogFormat,

    /// Environment (development, production)
    pub environment: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            port: 8000,
            artifacts_dir: PathBuf::from("artifacts"),
            model_file: "diabetes_readmission_model.json".to_string(),
            preprocessor_file: "preprocessing_transformer.json".to_string(),
            model_config_file: "model_config.json".to_string(),
            cors_origin: "http://localhost:3000".to_string(),
            missing_feature_policy: MissingFeaturePolicy::Drop,
            strict_feature_schema: true,
            log_format: LogFormat::Text,
            environment: "development".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup. Unparseable values
    /// fall back to their defaults.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let environment = lookup("ENVIRONMENT").unwrap_or(defaults.environment);

        let mut config = Self {
            host: parse_or_default(&lookup, "HOST", defaults.host),

            port: parse_or_default(&lookup, "PORT", defaults.port),

            artifacts_dir: lookup("ARTIFACTS_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.artifacts_dir),

            model_file: lookup("MODEL_FILE").unwrap_or(defaults.model_file),

            preprocessor_file: lookup("PREPROCESSOR_FILE").unwrap_or(defaults.preprocessor_file),

            model_config_file: lookup("MODEL_CONFIG_FILE").unwrap_or(defaults.model_config_file),

            cors_origin: lookup("CORS_ORIGIN").unwrap_or(defaults.cors_origin),

            missing_feature_policy: parse_or_default(
                &lookup,
                "MISSING_FEATURE_POLICY",
                defaults.missing_feature_policy,
            ),

            strict_feature_schema: parse_or_default(
                &lookup,
                "STRICT_FEATURE_SCHEMA",
                defaults.strict_feature_schema,
            ),

            log_format: defaults.log_format,

            environment,
        };

        // Production logs are structured unless asked otherwise
        config.log_format = match lookup("LOG_FORMAT").as_deref() {
            Some("json") => LogFormat::Json,
            Some("text") => LogFormat::Text,
            _ if config.is_production() => LogFormat::Json,
            _ => defaults.log_format,
        };

        config
    }

    /// Socket address the server binds to
    pub fn listen_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// Check if running in production
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }
}

fn parse_or_default<F, T>(lookup: &F, key: &str, default: T) -> T
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    match lookup(key) {
        Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
            tracing::warn!(key, value = %raw, "Invalid configuration value, using default");
            default
        }),
        None => default,
    }
}
