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

//! Immutable Deye Cloud connection settings
//!
//! The account password only ever exists here as a SHA-256 hex digest. A plaintext
//! password is hashed while the [`DeyeConfig`] is being built and then dropped.

use crate::error::{ConfigError, ConfigResult};
use sha2::{Digest, Sha256};
use std::fmt;
use std::time::Duration;

/// Default regional endpoint of the Deye developer API
pub const DEFAULT_API_URL: &str = "https://eu1-developer.deyecloud.com";

/// Upper bound for every single vendor call
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

const DIGEST_HEX_LEN: usize = 64;

/// Lowercase hex SHA-256 of a plaintext password, the form Deye expects on the wire
pub fn hash_password(plain: &str) -> String {
    format!("{:x}", Sha256::digest(plain.as_bytes()))
}

/// Parse a station id as supplied through configuration
pub fn parse_station_id(raw: &str) -> ConfigResult<u64> {
    match raw.trim().parse::<u64>() {
        Ok(id) if id > 0 => Ok(id),
        _ => Err(ConfigError::InvalidStationId(raw.to_owned())),
    }
}

/// Account password as handed over by the operator
#[derive(Clone)]
pub enum PasswordInput {
    /// Already hashed (`DEYE_PASSWORD_HASH`)
    Digest(String),
    /// Plaintext (`DEYE_PASSWORD`), hashed once during config construction
    Plain(String),
}

impl fmt::Debug for PasswordInput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Digest(_) => f.write_str("Digest(<redacted>)"),
            Self::Plain(_) => f.write_str("Plain(<redacted>)"),
        }
    }
}

/// Validated SHA-256 hex digest of the account password
#[derive(Clone, PartialEq, Eq)]
pub struct PasswordDigest(String);

impl PasswordDigest {
    pub fn from_input(input: PasswordInput) -> ConfigResult<Self> {
        match input {
            PasswordInput::Plain(plain) => {
                if plain.is_empty() {
                    return Err(ConfigError::Missing("password"));
                }
                Ok(Self(hash_password(&plain)))
            }
            PasswordInput::Digest(digest) => {
                let digest = digest.trim().to_ascii_lowercase();
                if digest.is_empty() {
                    return Err(ConfigError::Missing("password_hash"));
                }
                if digest.len() != DIGEST_HEX_LEN || !digest.chars().all(|c| c.is_ascii_hexdigit())
                {
                    return Err(ConfigError::InvalidPasswordDigest);
                }
                Ok(Self(digest))
            }
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for PasswordDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("PasswordDigest(<redacted>)")
    }
}

/// Credentials for the Deye developer account
#[derive(Debug, Clone)]
pub struct DeyeCredentials {
    pub app_id: String,
    pub app_secret: String,
    pub email: String,
    pub password: PasswordInput,
}

/// Resolved, immutable configuration of the Deye Cloud access layer
#[derive(Clone)]
pub struct DeyeConfig {
    app_id: String,
    app_secret: String,
    email: String,
    password: PasswordDigest,
    api_base_url: String,
    station_id: u64,
    request_timeout: Duration,
}

impl DeyeConfig {
    /// Validate the settings and hash the password if it was given in plaintext
    pub fn new(credentials: DeyeCredentials, api_base_url: &str, station_id: u64) -> ConfigResult<Self> {
        let app_id = required(credentials.app_id, "app_id")?;
        let app_secret = required(credentials.app_secret, "app_secret")?;
        let email = required(credentials.email, "email")?;
        let password = PasswordDigest::from_input(credentials.password)?;

        let api_base_url = api_base_url.trim().trim_end_matches('/').to_owned();
        if !(api_base_url.starts_with("http://") || api_base_url.starts_with("https://")) {
            return Err(ConfigError::InvalidBaseUrl(api_base_url));
        }

        if station_id == 0 {
            return Err(ConfigError::InvalidStationId(station_id.to_string()));
        }

        Ok(Self {
            app_id,
            app_secret,
            email,
            password,
            api_base_url,
            station_id,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        })
    }

    /// Override the per-call timeout (defaults to 10 seconds)
    #[must_use]
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn app_id(&self) -> &str {
        &self.app_id
    }

    pub fn app_secret(&self) -> &str {
        &self.app_secret
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn password_digest(&self) -> &PasswordDigest {
        &self.password
    }

    pub fn api_base_url(&self) -> &str {
        &self.api_base_url
    }

    pub fn station_id(&self) -> u64 {
        self.station_id
    }

    pub fn request_timeout(&self) -> Duration {
        self.request_timeout
    }

    /// Absolute URL for an API path such as `/v1.0/station/latest`
    pub fn endpoint(&self, path: &str) -> String {
        format!("{}{path}", self.api_base_url)
    }
}

impl fmt::Debug for DeyeConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DeyeConfig")
            .field("app_id", &self.app_id)
            .field("app_secret", &"<redacted>")
            .field("email", &self.email)
            .field("password", &self.password)
            .field("api_base_url", &self.api_base_url)
            .field("station_id", &self.station_id)
            .field("request_timeout", &self.request_timeout)
            .finish()
    }
}

fn required(value: String, name: &'static str) -> ConfigResult<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        Err(ConfigError::Missing(name))
    } else {
        Ok(trimmed.to_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // sha256("secret")
    const SECRET_DIGEST: &str = "2bb80d537b1da3e38bd30361aa855686bde0eacd7162fef6a25fe97bf527a25b";

    fn credentials(password: PasswordInput) -> DeyeCredentials {
        DeyeCredentials {
            app_id: "app-1".to_owned(),
            app_secret: "app-secret".to_owned(),
            email: "owner@example.com".to_owned(),
            password,
        }
    }

    #[test]
    fn test_hash_password_is_lowercase_sha256_hex() {
        assert_eq!(hash_password("secret"), SECRET_DIGEST);
    }

    #[test]
    fn test_plain_password_is_hashed_on_construction() {
        let config = DeyeConfig::new(
            credentials(PasswordInput::Plain("secret".to_owned())),
            DEFAULT_API_URL,
            42,
        )
        .unwrap();

        assert_eq!(config.password_digest().as_str(), SECRET_DIGEST);
    }

    #[test]
    fn test_digest_is_normalized_to_lowercase() {
        let config = DeyeConfig::new(
            credentials(PasswordInput::Digest(SECRET_DIGEST.to_uppercase())),
            DEFAULT_API_URL,
            42,
        )
        .unwrap();

        assert_eq!(config.password_digest().as_str(), SECRET_DIGEST);
    }

    #[test]
    fn test_invalid_digest_is_rejected() {
        let result = DeyeConfig::new(
            credentials(PasswordInput::Digest("not-a-digest".to_owned())),
            DEFAULT_API_URL,
            42,
        );
        assert!(matches!(result, Err(ConfigError::InvalidPasswordDigest)));
    }

    #[test]
    fn test_missing_credentials_are_rejected() {
        let mut creds = credentials(PasswordInput::Plain("secret".to_owned()));
        creds.app_secret = "   ".to_owned();
        let result = DeyeConfig::new(creds, DEFAULT_API_URL, 42);
        assert!(matches!(result, Err(ConfigError::Missing("app_secret"))));

        let result = DeyeConfig::new(
            credentials(PasswordInput::Plain(String::new())),
            DEFAULT_API_URL,
            42,
        );
        assert!(matches!(result, Err(ConfigError::Missing("password"))));
    }

    #[test]
    fn test_base_url_trailing_slash_is_trimmed() {
        let config = DeyeConfig::new(
            credentials(PasswordInput::Plain("secret".to_owned())),
            "https://eu1-developer.deyecloud.com/",
            42,
        )
        .unwrap();

        assert_eq!(
            config.endpoint("/v1.0/station/latest"),
            "https://eu1-developer.deyecloud.com/v1.0/station/latest"
        );
    }

    #[test]
    fn test_invalid_base_url_and_station() {
        let result = DeyeConfig::new(
            credentials(PasswordInput::Plain("secret".to_owned())),
            "ftp://example.com",
            42,
        );
        assert!(matches!(result, Err(ConfigError::InvalidBaseUrl(_))));

        let result = DeyeConfig::new(
            credentials(PasswordInput::Plain("secret".to_owned())),
            DEFAULT_API_URL,
            0,
        );
        assert!(matches!(result, Err(ConfigError::InvalidStationId(_))));
    }

    #[test]
    fn test_parse_station_id() {
        assert_eq!(parse_station_id(" 61234 ").unwrap(), 61234);
        assert!(parse_station_id("abc").is_err());
        assert!(parse_station_id("0").is_err());
        assert!(parse_station_id("-5").is_err());
    }

    #[test]
    fn test_debug_output_redacts_secrets() {
        let config = DeyeConfig::new(
            credentials(PasswordInput::Plain("secret".to_owned())),
            DEFAULT_API_URL,
            42,
        )
        .unwrap();

        let debug = format!("{config:?}");
        assert!(!debug.contains("app-secret"));
        assert!(!debug.contains(SECRET_DIGEST));
        assert!(debug.contains("app-1"));
    }
}
