//! QuotePilot configuration system.
//!
//! Config is loaded once at startup (file + env overrides) and injected
//! into the gateway and orchestrator as an immutable value. Nothing in
//! the request path reads process-wide state.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{QuotePilotError, Result};

/// Root configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct QuotePilotConfig {
    #[serde(default)]
    pub gateway: GatewayConfig,
    #[serde(default)]
    pub recovery: RecoveryConfig,
    #[serde(default)]
    pub gemini: GeminiConfig,
    #[serde(default)]
    pub twilio: TwilioConfig,
    #[serde(default)]
    pub resend: ResendConfig,
}

/// HTTP gateway configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Path to the SQLite database. Empty means `~/.quotepilot/quotepilot.db`.
    #[serde(default)]
    pub db_path: String,
}

fn default_host() -> String {
    "127.0.0.1".into()
}
fn default_port() -> u16 {
    8790
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            db_path: String::new(),
        }
    }
}

/// Recovery-run configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecoveryConfig {
    /// Shared secret accepted from the external scheduler
    /// (`Authorization: Bearer` or `x-cron-secret`).
    #[serde(default)]
    pub cron_secret: String,
    /// Minimum age of an estimate before it becomes a candidate.
    #[serde(default = "default_lookback_hours")]
    pub lookback_hours: u64,
}

fn default_lookback_hours() -> u64 {
    48
}

impl Default for RecoveryConfig {
    fn default() -> Self {
        Self {
            cron_secret: String::new(),
            lookback_hours: default_lookback_hours(),
        }
    }
}

/// Gemini composer configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeminiConfig {
    #[serde(default)]
    pub api_key: String,
    #[serde(default = "default_gemini_model")]
    pub model: String,
}

fn default_gemini_model() -> String {
    "gemini-2.5-flash".into()
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            model: default_gemini_model(),
        }
    }
}

/// Twilio SMS gateway configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct TwilioConfig {
    #[serde(default)]
    pub account_sid: String,
    #[serde(default)]
    pub auth_token: String,
    #[serde(default)]
    pub from_number: String,
}

impl TwilioConfig {
    /// Usable only when every credential is present.
    pub fn is_configured(&self) -> bool {
        !self.account_sid.is_empty() && !self.auth_token.is_empty() && !self.from_number.is_empty()
    }
}

/// Resend transactional email configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResendConfig {
    #[serde(default)]
    pub api_key: String,
    #[serde(default = "default_resend_from")]
    pub from: String,
}

fn default_resend_from() -> String {
    "QuotePilot <onboarding@resend.dev>".into()
}

impl Default for ResendConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            from: default_resend_from(),
        }
    }
}

impl QuotePilotConfig {
    /// Load config from the default path (~/.quotepilot/config.toml),
    /// then apply env overrides.
    pub fn load() -> Result<Self> {
        let path = Self::default_path();
        let mut config = if path.exists() {
            Self::load_from(&path)?
        } else {
            Self::default()
        };
        config.apply_env_overrides();
        Ok(config)
    }

    /// Load config from a specific path (no env overrides).
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| QuotePilotError::Config(format!("Failed to read config: {e}")))?;
        let config: Self = toml::from_str(&content)
            .map_err(|e| QuotePilotError::Config(format!("Failed to parse config: {e}")))?;
        Ok(config)
    }

    /// Save config to the default path.
    pub fn save(&self) -> Result<()> {
        let path = Self::default_path();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)
            .map_err(|e| QuotePilotError::Config(format!("Failed to serialize config: {e}")))?;
        std::fs::write(&path, content)?;
        Ok(())
    }

    /// Get the default config path.
    pub fn default_path() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".quotepilot")
            .join("config.toml")
    }

    /// Get the QuotePilot home directory.
    pub fn home_dir() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".quotepilot")
    }

    /// Resolved database path.
    pub fn db_path(&self) -> PathBuf {
        if self.gateway.db_path.is_empty() {
            Self::home_dir().join("quotepilot.db")
        } else {
            PathBuf::from(&self.gateway.db_path)
        }
    }

    /// Env vars beat file values for secrets and provider credentials.
    pub fn apply_env_overrides(&mut self) {
        override_from_env(&mut self.recovery.cron_secret, "CRON_SECRET");
        override_from_env(&mut self.gemini.api_key, "GEMINI_API_KEY");
        override_from_env(&mut self.gemini.model, "GEMINI_RECOVERY_MODEL");
        override_from_env(&mut self.twilio.account_sid, "TWILIO_ACCOUNT_SID");
        override_from_env(&mut self.twilio.auth_token, "TWILIO_AUTH_TOKEN");
        override_from_env(&mut self.twilio.from_number, "TWILIO_FROM_NUMBER");
        override_from_env(&mut self.resend.api_key, "RESEND_API_KEY");
        override_from_env(&mut self.resend.from, "RESEND_FROM");
    }
}

fn override_from_env(slot: &mut String, key: &str) {
    if let Ok(value) = std::env::var(key) {
        let value = value.trim();
        if !value.is_empty() {
            *slot = value.to_string();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = QuotePilotConfig::default();
        assert_eq!(config.recovery.lookback_hours, 48);
        assert_eq!(config.gemini.model, "gemini-2.5-flash");
        assert!(!config.twilio.is_configured());
    }

    #[test]
    fn test_parse_partial_toml() {
        let config: QuotePilotConfig = toml::from_str(
            r#"
            [recovery]
            cron_secret = "shh"

            [twilio]
            account_sid = "AC1"
            auth_token = "tok"
            from_number = "+15550001111"
            "#,
        )
        .unwrap();
        assert_eq!(config.recovery.cron_secret, "shh");
        assert_eq!(config.recovery.lookback_hours, 48);
        assert!(config.twilio.is_configured());
        assert_eq!(config.gateway.port, 8790);
    }

    #[test]
    fn test_env_override_beats_file_value() {
        let mut config = QuotePilotConfig::default();
        config.gemini.model = "from-file".into();
        // SAFETY: test-local env mutation, key is unique to this test.
        unsafe { std::env::set_var("GEMINI_RECOVERY_MODEL", "gemini-override") };
        config.apply_env_overrides();
        unsafe { std::env::remove_var("GEMINI_RECOVERY_MODEL") };
        assert_eq!(config.gemini.model, "gemini-override");
    }
}
