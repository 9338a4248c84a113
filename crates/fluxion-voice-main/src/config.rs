// Copyright (c) 2025 SOLARE S.R.O.
//
// This file is part of FluxION.
//
// Licensed under the Creative Commons Attribution-NonCommercial-NoDerivatives 4.0 International
// (CC BY-NC-ND 4.0). You may use and share this file for non-commercial purposes only and you may not
// create derivatives. See <https://creativecommons.org/licenses/by-nc-nd/4.0/>.
//
// This software is provided "AS IS", without warranty of any kind.
//
// For commercial licensing, please contact: info@solare.cz

use anyhow::{Context, Result, bail};
use fluxion_deye::config::{DEFAULT_API_URL, parse_station_id};
use fluxion_deye::{DeyeConfig, DeyeCredentials, PasswordInput};
use fluxion_voice::Language;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::net::SocketAddr;
use std::path::Path;
use std::time::Duration;
use tracing::{info, warn};

pub const DEFAULT_CONFIG_FILE: &str = "config.toml";
const MAX_TIMEOUT_SECS: u64 = 120;

fn default_api_url() -> String {
    DEFAULT_API_URL.to_owned()
}

fn default_timeout_secs() -> u64 {
    10
}

fn default_bind_address() -> String {
    "0.0.0.0:8099".to_owned()
}

/// Service configuration - file values first, environment variables on top
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Deye Cloud account and station
    #[serde(default)]
    pub deye: DeyeSection,

    /// Voice skill host
    #[serde(default)]
    pub skill: SkillSection,
}

#[derive(Clone, Serialize, Deserialize)]
pub struct DeyeSection {
    #[serde(default)]
    pub app_id: String,

    #[serde(default)]
    pub app_secret: String,

    #[serde(default)]
    pub email: String,

    /// SHA-256 hex digest of the account password (preferred)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password_hash: Option<String>,

    /// Plaintext password, hashed at startup when no digest is configured
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,

    #[serde(default = "default_api_url")]
    pub api_url: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub station_id: Option<u64>,

    /// Per-call timeout for vendor requests
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for DeyeSection {
    fn default() -> Self {
        Self {
            app_id: String::new(),
            app_secret: String::new(),
            email: String::new(),
            password_hash: None,
            password: None,
            api_url: default_api_url(),
            station_id: None,
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl fmt::Debug for DeyeSection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DeyeSection")
            .field("app_id", &self.app_id)
            .field("email", &self.email)
            .field("password_hash", &self.password_hash.as_ref().map(|_| "<redacted>"))
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field("api_url", &self.api_url)
            .field("station_id", &self.station_id)
            .field("timeout_secs", &self.timeout_secs)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SkillSection {
    /// Language for requests whose locale is missing or unsupported
    #[serde(default)]
    pub default_language: Language,

    #[serde(default = "default_bind_address")]
    pub bind_address: String,
}

impl Default for SkillSection {
    fn default() -> Self {
        Self {
            default_language: Language::default(),
            bind_address: default_bind_address(),
        }
    }
}

impl AppConfig {
    /// Load from the given file, else `config.toml` if present, then apply environment
    /// overrides and validate
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None if Path::new(DEFAULT_CONFIG_FILE).exists() => {
                Self::from_file(Path::new(DEFAULT_CONFIG_FILE))?
            }
            None => {
                warn!("No configuration file found, using defaults with environment overrides");
                Self::default()
            }
        };

        config.apply_env(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Parse a TOML file (or JSON when the extension is `.json`)
    pub fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;

        let config = if path.extension().is_some_and(|ext| ext == "json") {
            serde_json::from_str(&text)
                .with_context(|| format!("Failed to parse {}", path.display()))?
        } else {
            toml::from_str(&text).with_context(|| format!("Failed to parse {}", path.display()))?
        };

        info!("✅ Loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Override values from environment variables, looked up through `lookup`
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        if let Some(app_id) = var("DEYE_APP_ID") {
            self.deye.app_id = app_id;
        }
        if let Some(app_secret) = var("DEYE_APP_SECRET") {
            self.deye.app_secret = app_secret;
        }
        if let Some(email) = var("DEYE_EMAIL") {
            self.deye.email = email;
        }
        if let Some(hash) = var("DEYE_PASSWORD_HASH") {
            self.deye.password_hash = Some(hash);
        }
        if let Some(password) = var("DEYE_PASSWORD") {
            self.deye.password = Some(password);
        }
        if let Some(url) = var("DEYE_API_URL") {
            self.deye.api_url = url;
        }
        if let Some(station) = var("DEYE_STATION_ID") {
            let id = parse_station_id(&station).context("DEYE_STATION_ID")?;
            self.deye.station_id = Some(id);
        }
        if let Some(timeout) = var("DEYE_TIMEOUT_SECS") {
            self.deye.timeout_secs = timeout
                .trim()
                .parse()
                .with_context(|| format!("DEYE_TIMEOUT_SECS must be a number of seconds, got '{timeout}'"))?;
        }
        if let Some(language) = var("SKILL_DEFAULT_LANGUAGE") {
            self.skill.default_language = language.parse().context("SKILL_DEFAULT_LANGUAGE")?;
        }
        if let Some(bind) = var("SKILL_BIND_ADDRESS") {
            self.skill.bind_address = bind;
        }

        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        let deye = &self.deye;

        for (value, name) in [
            (&deye.app_id, "deye.app_id (DEYE_APP_ID)"),
            (&deye.app_secret, "deye.app_secret (DEYE_APP_SECRET)"),
            (&deye.email, "deye.email (DEYE_EMAIL)"),
        ] {
            if value.trim().is_empty() {
                bail!("{name} is required");
            }
        }

        if deye.password_hash.is_none() && deye.password.is_none() {
            bail!("Either DEYE_PASSWORD_HASH or DEYE_PASSWORD must be set");
        }

        if deye.station_id.is_none_or(|id| id == 0) {
            bail!("deye.station_id (DEYE_STATION_ID) must be a positive integer");
        }

        if deye.timeout_secs == 0 || deye.timeout_secs > MAX_TIMEOUT_SECS {
            bail!(
                "deye.timeout_secs must be between 1 and {MAX_TIMEOUT_SECS}, got {}",
                deye.timeout_secs
            );
        }

        if self.skill.bind_address.parse::<SocketAddr>().is_err() {
            bail!(
                "skill.bind_address '{}' is not a valid socket address",
                self.skill.bind_address
            );
        }

        Ok(())
    }

    /// Build the immutable Deye client configuration; hashes a plaintext password here
    pub fn to_deye_config(&self) -> Result<DeyeConfig> {
        let deye = &self.deye;

        let password = match (&deye.password_hash, &deye.password) {
            (Some(hash), _) => PasswordInput::Digest(hash.clone()),
            (None, Some(plain)) => PasswordInput::Plain(plain.clone()),
            (None, None) => bail!("No Deye password configured"),
        };
        let credentials = DeyeCredentials {
            app_id: deye.app_id.clone(),
            app_secret: deye.app_secret.clone(),
            email: deye.email.clone(),
            password,
        };

        let config = DeyeConfig::new(credentials, &deye.api_url, deye.station_id.unwrap_or_default())
            .context("Invalid Deye configuration")?
            .with_request_timeout(Duration::from_secs(deye.timeout_secs));
        Ok(config)
    }
}
