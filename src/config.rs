//! Env-driven configuration for the service and library.
//!
//! Values are read from the process environment; `dotenv` is loaded on demand
//! by the binaries. Defaults are provided for convenience during development,
//! with the two API keys left empty when unset.
use std::env;
use std::time::Duration;

use dotenv;

pub const DEFAULT_POLL_INTERVAL_SECS: u64 = 3;
pub const DEFAULT_POLL_MAX_ATTEMPTS: u32 = 20;

pub struct Config {
    pub imgbb_api_key: String,
    pub imgbb_upload_url: String,
    pub eachlabs_api_key: String,
    pub eachlabs_base_url: String,
    pub eachlabs_flow_id: String,
    pub api_host: String,
    pub api_port: String,
    pub poll_interval_secs: String,
    pub poll_max_attempts: String,
}

impl Config {
    pub fn dotenv_load() {
        dotenv::dotenv().ok();
    }

    pub fn new() -> Result<Self, env::VarError> {
        Ok(Config {
            imgbb_api_key: env::var("IMGBB_API_KEY").unwrap_or_default(),
            imgbb_upload_url: env::var("IMGBB_UPLOAD_URL")
                .unwrap_or_else(|_| "https://api.imgbb.com/1/upload".to_string()),
            eachlabs_api_key: env::var("EACHLABS_API_KEY").unwrap_or_default(),
            eachlabs_base_url: env::var("EACHLABS_BASE_URL")
                .unwrap_or_else(|_| "https://flows.eachlabs.ai/api/v1".to_string()),
            eachlabs_flow_id: env::var("EACHLABS_FLOW_ID")
                .unwrap_or_else(|_| "8ea0e2c1-cd76-4ed4-b429-e56103d86715".to_string()),
            api_host: env::var("API_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            api_port: env::var("API_PORT").unwrap_or_else(|_| "8000".to_string()),
            poll_interval_secs: env::var("POLL_INTERVAL_SECS")
                .unwrap_or_else(|_| DEFAULT_POLL_INTERVAL_SECS.to_string()),
            poll_max_attempts: env::var("POLL_MAX_ATTEMPTS")
                .unwrap_or_else(|_| DEFAULT_POLL_MAX_ATTEMPTS.to_string()),
        })
    }

    /// Fixed delay between execution status polls.
    pub fn poll_interval(&self) -> Duration {
        let secs: u64 = self.poll_interval_secs.parse().unwrap_or_else(|_| {
            tracing::warn!(
                "Invalid POLL_INTERVAL_SECS '{}', falling back to {}",
                self.poll_interval_secs,
                DEFAULT_POLL_INTERVAL_SECS
            );
            DEFAULT_POLL_INTERVAL_SECS
        });
        Duration::from_secs(secs)
    }

    /// Hard upper bound on status polls per request.
    pub fn poll_max_attempts(&self) -> u32 {
        self.poll_max_attempts.parse().unwrap_or_else(|_| {
            tracing::warn!(
                "Invalid POLL_MAX_ATTEMPTS '{}', falling back to {}",
                self.poll_max_attempts,
                DEFAULT_POLL_MAX_ATTEMPTS
            );
            DEFAULT_POLL_MAX_ATTEMPTS
        })
    }

    pub fn print_env_vars() {
        let set_or_unset = |name: &str| {
            if env::var(name).map(|v| !v.is_empty()).unwrap_or(false) {
                "<set>"
            } else {
                "<unset>"
            }
        };
        // API keys are secrets: report presence only.
        println!("IMGBB_API_KEY: {}", set_or_unset("IMGBB_API_KEY"));
        println!("EACHLABS_API_KEY: {}", set_or_unset("EACHLABS_API_KEY"));
        println!("IMGBB_UPLOAD_URL: {}", env::var("IMGBB_UPLOAD_URL").unwrap_or_else(|_| "<unset>".to_string()));
        println!("EACHLABS_BASE_URL: {}", env::var("EACHLABS_BASE_URL").unwrap_or_else(|_| "<unset>".to_string()));
        println!("EACHLABS_FLOW_ID: {}", env::var("EACHLABS_FLOW_ID").unwrap_or_else(|_| "<unset>".to_string()));
        println!("API_HOST: {}", env::var("API_HOST").unwrap_or_else(|_| "<unset>".to_string()));
        println!("API_PORT: {}", env::var("API_PORT").unwrap_or_else(|_| "<unset>".to_string()));
        println!("POLL_INTERVAL_SECS: {}", env::var("POLL_INTERVAL_SECS").unwrap_or_else(|_| "<unset>".to_string()));
        println!("POLL_MAX_ATTEMPTS: {}", env::var("POLL_MAX_ATTEMPTS").unwrap_or_else(|_| "<unset>".to_string()));
    }
}
