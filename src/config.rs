use std::env;
use std::net::{IpAddr, Ipv4Addr};
use std::str::FromStr;

use crate::inference::pipeline::PipelineSettings;
use crate::inference::variant::Variant;

/// Server and pipeline settings. Logging settings are read separately by
/// [`crate::logging::LogConfig::from_env`] so the subscriber exists before
/// anything here can warn.
#[derive(Debug, Clone)]
pub struct Config {
    pub host: IpAddr,
    pub port: u16,
    pub cors_origins: Vec<String>,
    pub variant: VariantConfig,
}

/// Deployment-specific pipeline knobs and artifact locations.
#[derive(Debug, Clone)]
pub struct VariantConfig {
    pub variant: Variant,
    pub model_path: String,
    pub encoder_path: Option<String>,
    pub total_questions: u32,
    pub provincia_dificultad_required: bool,
}

impl VariantConfig {
    pub fn for_variant(variant: Variant) -> Self {
        Self {
            variant,
            model_path: variant.default_model_path().to_string(),
            encoder_path: variant.default_encoder_path().map(str::to_string),
            total_questions: variant.default_total_questions(),
            provincia_dificultad_required: variant.default_provincia_dificultad_required(),
        }
    }

    pub fn from_env() -> Self {
        let variant = env_or_parse("VARIANT", Variant::FixedScoring);
        let defaults = Self::for_variant(variant);

        let mut total_questions = env_or_parse("TOTAL_QUESTIONS", defaults.total_questions);
        if total_questions == 0 {
            tracing::warn!(
                default = defaults.total_questions,
                "TOTAL_QUESTIONS must be positive, using default"
            );
            total_questions = defaults.total_questions;
        }

        let encoder_path = match env::var("ENCODER_PATH") {
            Ok(path) if !path.trim().is_empty() => Some(path),
            _ => defaults.encoder_path,
        };

        Self {
            variant,
            model_path: env_or("MODEL_PATH", &defaults.model_path),
            encoder_path,
            total_questions,
            provincia_dificultad_required: env_or_bool(
                "PROVINCIA_DIFICULTAD_REQUIRED",
                defaults.provincia_dificultad_required,
            ),
        }
    }

    pub fn pipeline_settings(&self) -> PipelineSettings {
        PipelineSettings {
            variant: self.variant,
            total_questions: self.total_questions,
            provincia_dificultad_required: self.provincia_dificultad_required,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            host: env_or_parse("HOST", IpAddr::V4(Ipv4Addr::new(0, 0, 0, 0))),
            port: env_or_parse("PORT", 5000_u16),
            cors_origins: env_or_list(
                "CORS_ORIGIN",
                &["http://localhost:3000", "http://localhost:5173"],
            ),
            variant: VariantConfig::from_env(),
        }
    }
}

pub fn env_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

pub fn env_or_parse<T>(key: &str, default: T) -> T
where
    T: FromStr + Copy,
{
    match env::var(key) {
        Ok(raw) => match raw.parse::<T>() {
            Ok(v) => v,
            Err(_) => {
                tracing::warn!(
                    key,
                    value = %raw,
                    "Failed to parse env var, using default"
                );
                default
            }
        },
        Err(_) => default,
    }
}

pub fn env_or_bool(key: &str, default: bool) -> bool {
    match env::var(key) {
        Ok(raw) => match raw.trim().to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => true,
            "0" | "false" | "no" | "off" => false,
            _ => default,
        },
        Err(_) => default,
    }
}

/// Comma-separated list; blank entries are dropped.
pub fn env_or_list(key: &str, default: &[&str]) -> Vec<String> {
    let parsed: Vec<String> = env::var(key)
        .unwrap_or_default()
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect();
    if parsed.is_empty() {
        default.iter().map(|s| s.to_string()).collect()
    } else {
        parsed
    }
}
