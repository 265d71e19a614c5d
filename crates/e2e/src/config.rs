//! Suite configuration

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{E2eError, E2eResult};

/// Marker prefixed to every name the suite creates remotely
pub const DEFAULT_TEST_PREFIX: &str = "Autotest_";

/// Top-level suite configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SuiteConfig {
    /// Prefix marking fixtures owned by this suite
    pub test_prefix: String,

    /// REST service configuration
    pub rest: RestConfig,

    /// SOAP service configuration
    pub soap: SoapConfig,

    /// Retry policy for flaky reads
    pub retry: RetryConfig,

    /// Post-run cleanup
    pub cleanup: CleanupConfig,

    /// Per-request timeout in milliseconds
    pub request_timeout_ms: u64,

    /// Run all selected cases concurrently instead of in order
    pub parallel: bool,
}

impl Default for SuiteConfig {
    fn default() -> Self {
        Self {
            test_prefix: DEFAULT_TEST_PREFIX.to_string(),
            rest: RestConfig::default(),
            soap: SoapConfig::default(),
            retry: RetryConfig::default(),
            cleanup: CleanupConfig::default(),
            request_timeout_ms: 30_000,
            parallel: false,
        }
    }
}

impl SuiteConfig {
    /// Parse a configuration from YAML; missing keys fall back to defaults
    pub fn from_yaml(yaml: &str) -> E2eResult<Self> {
        let config: Self = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Parse a configuration from a YAML file
    pub fn from_file(path: &Path) -> E2eResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    pub fn validate(&self) -> E2eResult<()> {
        if self.test_prefix.is_empty() {
            return Err(E2eError::Config("test_prefix must not be empty".into()));
        }
        if self.retry.max_attempts == 0 {
            return Err(E2eError::Config("retry.max_attempts must be at least 1".into()));
        }
        if self.cleanup.forced_attempts == 0 {
            return Err(E2eError::Config("cleanup.forced_attempts must be at least 1".into()));
        }
        Ok(())
    }
}

/// REST service configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RestConfig {
    /// Base URL of the superhero service
    pub base_url: String,
}

impl Default for RestConfig {
    fn default() -> Self {
        Self {
            base_url: "https://superhero.qa-test.csssr.com".to_string(),
        }
    }
}

/// SOAP service configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SoapConfig {
    /// WSDL endpoint every envelope is posted to
    pub url: String,

    /// Method appended to the SOAPAction header
    pub method: String,

    /// Directory holding the request envelope templates
    pub templates_dir: PathBuf,

    /// Namespace prefix of response fields
    pub response_prefix: String,
}

impl Default for SoapConfig {
    fn default() -> Self {
        Self {
            url: "https://soap.qa-test.csssr.com/ws/soap.wsdl".to_string(),
            method: String::new(),
            templates_dir: PathBuf::from(concat!(env!("CARGO_MANIFEST_DIR"), "/templates/soap")),
            response_prefix: "ns2".to_string(),
        }
    }
}

/// Fixed-interval retry policy
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    /// Delay between attempts in milliseconds
    pub interval_ms: u64,

    /// Total attempts including the first
    pub max_attempts: u32,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            interval_ms: 1_000,
            max_attempts: 10,
        }
    }
}

impl RetryConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }
}

/// Cleanup strategy after all cases ran
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum CleanupMode {
    /// Delete every listed hero carrying the test prefix, repeatedly
    #[default]
    Forced,
    /// Delete only the ids recorded during this run, once each
    Registry,
}

/// Post-run cleanup configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CleanupConfig {
    /// Whether cleanup runs at all
    pub enabled: bool,

    /// Which cleanup strategy to use
    pub mode: CleanupMode,

    /// Delete calls issued per marked hero in forced mode
    pub forced_attempts: u32,
}

impl Default for CleanupConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            mode: CleanupMode::Forced,
            forced_attempts: 30,
        }
    }
}
