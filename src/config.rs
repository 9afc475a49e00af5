//! Environment configuration.

use std::env;
use std::time::Duration;

pub const PROVIDER_ENV_VAR: &str = "SIGMA_PROVIDER";
pub const OLLAMA_HOST_ENV_VAR: &str = "SIGMA_OLLAMA_HOST";
pub const MODEL_ENV_VAR: &str = "SIGMA_MODEL";
pub const TEMPERATURE_ENV_VAR: &str = "SIGMA_TEMPERATURE";
pub const TIMEOUT_SEC_ENV_VAR: &str = "SIGMA_TIMEOUT_SEC";
pub const COURSE_ENV_VAR: &str = "SIGMA_COURSE";
pub const WEEK_ENV_VAR: &str = "SIGMA_WEEK";
pub const RESUME_TRANSCRIPT_ENV_VAR: &str = "SIGMA_RESUME_TRANSCRIPT";

#[derive(Debug, Clone, PartialEq)]
pub struct EnvConfig {
    pub provider: Option<String>,
    pub ollama_host: Option<String>,
    pub model: Option<String>,
    pub temperature: Option<f64>,
    pub timeout: Option<Duration>,
    pub course: Option<String>,
    pub week: Option<String>,
    pub resume_transcript: Option<String>,
}

impl EnvConfig {
    pub fn from_env() -> Self {
        Self {
            provider: env_string_opt(PROVIDER_ENV_VAR),
            ollama_host: env_string_opt(OLLAMA_HOST_ENV_VAR),
            model: env_string_opt(MODEL_ENV_VAR),
            temperature: env_f64_opt(TEMPERATURE_ENV_VAR),
            timeout: env_u64_opt(TIMEOUT_SEC_ENV_VAR)
                .filter(|seconds| *seconds > 0)
                .map(Duration::from_secs),
            course: env_string_opt(COURSE_ENV_VAR),
            week: env_string_opt(WEEK_ENV_VAR),
            resume_transcript: env_string_opt(RESUME_TRANSCRIPT_ENV_VAR),
        }
    }
}

fn env_string_opt(key: &str) -> Option<String> {
    env::var(key).ok().and_then(|value| {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    })
}

fn env_f64_opt(key: &str) -> Option<f64> {
    env_string_opt(key).and_then(|value| value.parse().ok())
}

fn env_u64_opt(key: &str) -> Option<u64> {
    env_string_opt(key).and_then(|value| value.parse().ok())
}
