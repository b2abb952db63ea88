use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;

/// S3 REST API version spoken by the client
pub const S3_API_VERSION: &str = "2006-03-01";

/// Credentials and connection settings for one storage account
#[derive(Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Profile {
    /// AWS access key ID
    pub access_key: String,

    /// AWS secret access key
    pub secret_key: String,

    /// AWS region (default: us-east-1)
    #[serde(default = "default_region")]
    pub region: String,

    /// S3 API version (default: 2006-03-01)
    #[serde(default = "default_api_version")]
    pub api_version: String,

    /// Service endpoint; derived from the region when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,

    /// Request timeout in seconds
    #[serde(default = "default_request_timeout")]
    pub request_timeout: u64,
}

// Keep the secret out of logs
impl std::fmt::Debug for Profile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Profile")
            .field("access_key", &self.access_key)
            .field("secret_key", &"***")
            .field("region", &self.region)
            .field("api_version", &self.api_version)
            .field("endpoint", &self.endpoint)
            .field("request_timeout", &self.request_timeout)
            .finish()
    }
}

fn default_region() -> String {
    "us-east-1".to_string()
}

fn default_api_version() -> String {
    S3_API_VERSION.to_string()
}

fn default_request_timeout() -> u64 {
    300
}

impl Profile {
    pub fn new(access_key: impl Into<String>, secret_key: impl Into<String>) -> Self {
        Self {
            access_key: access_key.into(),
            secret_key: secret_key.into(),
            region: default_region(),
            api_version: default_api_version(),
            endpoint: None,
            request_timeout: default_request_timeout(),
        }
    }

    pub fn with_region(mut self, region: impl Into<String>) -> Self {
        self.region = region.into();
        self
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }

    /// Configured endpoint without trailing slash, or the regional AWS endpoint
    pub fn endpoint_url(&self) -> String {
        match &self.endpoint {
            Some(endpoint) => endpoint.trim_end_matches('/').to_string(),
            None => format!("https://s3.{}.amazonaws.com", self.region),
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout)
    }

    /// Reject settings the client cannot work with
    pub fn validate(&self) -> Result<()> {
        if self.access_key.is_empty() {
            anyhow::bail!("access_key must not be empty");
        }
        if self.secret_key.is_empty() {
            anyhow::bail!("secret_key must not be empty");
        }
        if self.region.is_empty() {
            anyhow::bail!("region must not be empty");
        }
        if self.api_version != S3_API_VERSION {
            anyhow::bail!(
                "Unsupported S3 API version '{}' (supported: {})",
                self.api_version,
                S3_API_VERSION
            );
        }
        if self.request_timeout == 0 {
            anyhow::bail!("request_timeout must be greater than zero");
        }
        if let Some(endpoint) = &self.endpoint {
            if !endpoint.starts_with("http://") && !endpoint.starts_with("https://") {
                anyhow::bail!("endpoint must start with http:// or https://: {}", endpoint);
            }
        }
        Ok(())
    }
}

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Named profiles for different storage accounts
    #[serde(default)]
    pub profiles: HashMap<String, Profile>,

    /// Profile used when none is requested explicitly
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_profile: Option<String>,
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get a profile by name, or the default profile if not specified.
    /// Without a default, only a lone profile is picked.
    pub fn get_profile(&self, name: Option<&str>) -> Option<&Profile> {
        if let Some(name) = name {
            self.profiles.get(name)
        } else if let Some(default) = &self.default_profile {
            self.profiles.get(default)
        } else if self.profiles.len() == 1 {
            self.profiles.values().next()
        } else {
            None
        }
    }

    /// Resolve the profile to use and check it
    pub fn active_profile(&self) -> Result<&Profile> {
        let profile = self.get_profile(None).ok_or_else(|| {
            let mut names: Vec<_> = self.profiles.keys().map(String::as_str).collect();
            names.sort_unstable();
            match (&self.default_profile, names.is_empty()) {
                (_, true) => anyhow::anyhow!("No profile found in configuration"),
                (Some(default), false) => anyhow::anyhow!(
                    "Default profile '{}' not found; available profiles: {}",
                    default,
                    names.join(", ")
                ),
                (None, false) => anyhow::anyhow!(
                    "Several profiles and no default_profile; choose one of: {}",
                    names.join(", ")
                ),
            }
        })?;
        profile.validate()?;
        Ok(profile)
    }
}

/// Load configuration from a YAML file
pub fn load_from_yaml<P: AsRef<Path>>(path: P) -> Result<Config> {
    let content = std::fs::read_to_string(path.as_ref())
        .context(format!("Failed to read config file: {:?}", path.as_ref()))?;

    let config: Config = serde_yaml::from_str(&content)
        .context("Failed to parse YAML configuration")?;

    Ok(config)
}

/// Load configuration from environment variables
///
/// - AWS_ACCESS_KEY_ID
/// - AWS_SECRET_ACCESS_KEY
/// - AWS_REGION (optional, defaults to us-east-1)
/// - AWS_API_VERSION (optional, defaults to 2006-03-01)
/// - S3_ENDPOINT (optional, defaults to the regional AWS endpoint)
/// - S3_REQUEST_TIMEOUT (optional, seconds, defaults to 300)
pub fn load_from_env() -> Result<Config> {
    // Try to load .env file if it exists (don't fail if it doesn't)
    let _ = dotenvy::dotenv();

    let access_key = std::env::var("AWS_ACCESS_KEY_ID")
        .context("AWS_ACCESS_KEY_ID environment variable not set")?;

    let secret_key = std::env::var("AWS_SECRET_ACCESS_KEY")
        .context("AWS_SECRET_ACCESS_KEY environment variable not set")?;

    let mut profile = Profile::new(access_key, secret_key);

    if let Ok(region) = std::env::var("AWS_REGION") {
        profile.region = region;
    }

    if let Ok(version) = std::env::var("AWS_API_VERSION") {
        profile.api_version = version;
    }

    profile.endpoint = std::env::var("S3_ENDPOINT").ok();

    if let Ok(timeout) = std::env::var("S3_REQUEST_TIMEOUT") {
        profile.request_timeout = timeout
            .parse()
            .context(format!("Invalid S3_REQUEST_TIMEOUT: {}", timeout))?;
    }

    let mut config = Config::new();
    config.profiles.insert("default".to_string(), profile);
    config.default_profile = Some("default".to_string());

    Ok(config)
}

/// Load configuration from file or environment
///
/// # Arguments
/// * `config_path` - Optional path to YAML config file
/// * `profile_name` - Optional profile name to use (only relevant for YAML configs)
pub fn load_config(config_path: Option<&str>, profile_name: Option<&str>) -> Result<Config> {
    if let Some(path) = config_path {
        let mut config = load_from_yaml(path)?;

        if let Some(name) = profile_name {
            if !config.profiles.contains_key(name) {
                anyhow::bail!("Profile '{}' not found in config file", name);
            }
            config.default_profile = Some(name.to_string());
        }

        Ok(config)
    } else {
        load_from_env()
    }
}
