//! Layered configuration loading using figment.
//!
//! Sources in priority order, highest wins:
//! 1. Environment variables (`LAND_AUDIT_*` prefix, `__` as separator)
//! 2. Project-level `./land-audit.toml`
//! 3. User-level `~/.config/land-audit/config.toml`
//! 4. Built-in defaults
//!
//! `LAND_AUDIT_GRADING__PROVIDER=gemini` maps to `grading.provider`,
//! `LAND_AUDIT_FINANCE__DISCOUNT_RATE=0.05` to `finance.discount_rate`.

use crate::engine::FinancialAssumptions;
use crate::error::ConfigError;
use crate::grading::Provider;
use crate::model::{BertaudParameters, DEFAULT_LEGAL_MAX_FAR};
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub const ENV_PREFIX: &str = "LAND_AUDIT_";
pub const LOCAL_CONFIG_FILE: &str = "land-audit.toml";

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct AppConfig {
    #[serde(default)]
    pub defaults: ModelDefaults,
    #[serde(default)]
    pub finance: FinancialAssumptions,
    #[serde(default)]
    pub grading: GradingConfig,
    #[serde(default)]
    pub general: GeneralConfig,
}

/// Bertaud parameters pre-filled into a new evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ModelDefaults {
    pub d0: f64,
    pub g: f64,
    pub distance_km: f64,
    pub legal_max_far: f64,
}

impl Default for ModelDefaults {
    fn default() -> Self {
        let params = BertaudParameters::default();
        Self {
            d0: params.d0,
            g: params.g,
            distance_km: params.distance_km,
            legal_max_far: DEFAULT_LEGAL_MAX_FAR,
        }
    }
}

impl ModelDefaults {
    #[must_use]
    pub fn parameters(&self) -> BertaudParameters {
        BertaudParameters {
            d0: self.d0,
            g: self.g,
            distance_km: self.distance_km,
            legal_max_far: Some(self.legal_max_far),
        }
    }
}

const fn default_timeout_secs() -> u64 {
    60
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct GradingConfig {
    /// Provider used when the settings store holds no choice.
    #[serde(default)]
    pub provider: Provider,

    /// Credential fallback when the settings store holds none.
    #[serde(default)]
    pub api_key: String,

    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Model name overrides; empty means the provider default.
    #[serde(default)]
    pub openai_model: String,
    #[serde(default)]
    pub gemini_model: String,
    #[serde(default)]
    pub anthropic_model: String,

    /// Base URL overrides for proxies and tests; empty means the
    /// provider's public API.
    #[serde(default)]
    pub openai_endpoint: String,
    #[serde(default)]
    pub gemini_endpoint: String,
    #[serde(default)]
    pub anthropic_endpoint: String,
}

impl Default for GradingConfig {
    fn default() -> Self {
        Self {
            provider: Provider::default(),
            api_key: String::new(),
            timeout_secs: default_timeout_secs(),
            openai_model: String::new(),
            gemini_model: String::new(),
            anthropic_model: String::new(),
            openai_endpoint: String::new(),
            gemini_endpoint: String::new(),
            anthropic_endpoint: String::new(),
        }
    }
}

impl GradingConfig {
    /// Configured model name for a provider, if overridden.
    #[must_use]
    pub fn model_for(&self, provider: Provider) -> Option<&str> {
        let name = match provider {
            Provider::Heuristic => return None,
            Provider::OpenAi => &self.openai_model,
            Provider::Gemini => &self.gemini_model,
            Provider::Anthropic => &self.anthropic_model,
        };
        non_empty(name)
    }

    /// Configured base URL for a provider, if overridden.
    #[must_use]
    pub fn endpoint_for(&self, provider: Provider) -> Option<&str> {
        let url = match provider {
            Provider::Heuristic => return None,
            Provider::OpenAi => &self.openai_endpoint,
            Provider::Gemini => &self.gemini_endpoint,
            Provider::Anthropic => &self.anthropic_endpoint,
        };
        non_empty(url)
    }
}

fn non_empty(value: &str) -> Option<&str> {
    (!value.is_empty()).then_some(value)
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct GeneralConfig {
    /// Log destination while the dashboard owns the terminal.
    #[serde(default)]
    pub log_file: Option<PathBuf>,

    /// Directory for reports exported from the dashboard.
    #[serde(default)]
    pub report_dir: Option<PathBuf>,
}

impl AppConfig {
    /// Load configuration from all sources.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_with(Self::global_config_path())
    }

    /// Load configuration with an explicit user-level file; `None` skips
    /// that layer.
    pub fn load_with(global_path: Option<PathBuf>) -> Result<Self, ConfigError> {
        let config: Self = Self::figment_with(global_path).extract()?;
        config.validate()?;
        Ok(config)
    }

    /// Build the figment provider chain.
    ///
    /// Public so tests can layer their own providers on top.
    #[must_use]
    pub fn figment() -> Figment {
        Self::figment_with(Self::global_config_path())
    }

    /// Provider chain with an explicit user-level file.
    #[must_use]
    pub fn figment_with(global_path: Option<PathBuf>) -> Figment {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        if let Some(global_path) = global_path {
            if global_path.exists() {
                figment = figment.merge(Toml::file(global_path));
            }
        }

        let local_path = PathBuf::from(LOCAL_CONFIG_FILE);
        if local_path.exists() {
            figment = figment.merge(Toml::file(local_path));
        }

        figment.merge(Env::prefixed(ENV_PREFIX).split("__"))
    }

    /// Path to the user-global config file.
    #[must_use]
    pub fn global_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("land-audit").join("config.toml"))
    }

    /// Rejects values that would make every evaluation meaningless.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let finance = &self.finance;
        if finance.lease_term_years == 0 {
            return Err(invalid("finance.lease_term_years", "must be at least 1"));
        }
        if !(0.0..=1.0).contains(&finance.discount_rate) {
            return Err(invalid("finance.discount_rate", "must be between 0 and 1"));
        }
        if finance.escalation_interval_years == 0 {
            return Err(invalid(
                "finance.escalation_interval_years",
                "must be at least 1",
            ));
        }
        let finance_rates = [
            ("finance.rent_escalation_rate", finance.rent_escalation_rate),
            ("finance.residual_fraction", finance.residual_fraction),
            ("finance.roa_target", finance.roa_target),
            ("finance.cost_tolerance", finance.cost_tolerance),
            ("finance.high_rise_height_m", finance.high_rise_height_m),
            ("finance.low_rise_cost_per_sqm", finance.low_rise_cost_per_sqm),
            ("finance.high_rise_cost_per_sqm", finance.high_rise_cost_per_sqm),
        ];
        for (field, value) in finance_rates {
            if !value.is_finite() || value < 0.0 {
                return Err(invalid(field, "must be a non-negative number"));
            }
        }

        let defaults = &self.defaults;
        if !defaults.d0.is_finite() || defaults.d0 <= 0.0 {
            return Err(invalid("defaults.d0", "must be positive"));
        }
        if !defaults.legal_max_far.is_finite() || defaults.legal_max_far <= 0.0 {
            return Err(invalid("defaults.legal_max_far", "must be positive"));
        }
        for (field, value) in [
            ("defaults.g", defaults.g),
            ("defaults.distance_km", defaults.distance_km),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(invalid(field, "must be non-negative"));
            }
        }
        Ok(())
    }
}

fn invalid(field: &str, reason: &str) -> ConfigError {
    ConfigError::InvalidValue {
        field: field.to_string(),
        reason: reason.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.finance.lease_term_years, 30);
        assert_eq!(config.grading.provider, Provider::Heuristic);
        assert_eq!(config.grading.timeout_secs, 60);
    }

    #[test]
    fn model_override_only_when_set() {
        let mut grading = GradingConfig::default();
        assert_eq!(grading.model_for(Provider::OpenAi), None);
        grading.openai_model = "gpt-4o".to_string();
        assert_eq!(grading.model_for(Provider::OpenAi), Some("gpt-4o"));
        assert_eq!(grading.model_for(Provider::Heuristic), None);
    }

    #[test]
    fn endpoint_override_is_per_provider() {
        let grading = GradingConfig {
            openai_endpoint: "http://proxy.local/openai".to_string(),
            ..GradingConfig::default()
        };
        assert_eq!(
            grading.endpoint_for(Provider::OpenAi),
            Some("http://proxy.local/openai")
        );
        assert_eq!(grading.endpoint_for(Provider::Gemini), None);
        assert_eq!(grading.endpoint_for(Provider::Anthropic), None);
        assert_eq!(grading.endpoint_for(Provider::Heuristic), None);
    }

    #[test]
    fn validation_rejects_non_finite_model_defaults() {
        for field in ["d0", "g", "distance_km", "legal_max_far"] {
            let mut config = AppConfig::default();
            let slot = match field {
                "d0" => &mut config.defaults.d0,
                "g" => &mut config.defaults.g,
                "distance_km" => &mut config.defaults.distance_km,
                _ => &mut config.defaults.legal_max_far,
            };
            *slot = f64::NAN;
            let err = config.validate().unwrap_err();
            assert!(err.to_string().contains(field), "{field}: {err}");
        }
    }

    #[test]
    fn validation_rejects_infinite_tolerance() {
        let mut config = AppConfig::default();
        config.finance.cost_tolerance = f64::INFINITY;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("cost_tolerance"));
    }

    #[test]
    fn validation_rejects_zero_lease() {
        let mut config = AppConfig::default();
        config.finance.lease_term_years = 0;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("lease_term_years"));
    }
}
