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

//! Error types for the Deye Cloud client

use crate::fetch::HeaderConvention;
use serde::Serialize;
use serde_json::Value;
use std::fmt;
use thiserror::Error;

/// Coarse failure category, used by callers to decide what the user hears
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// Vendor refused the credentials or issued no usable token
    Auth,
    /// Telemetry could not be retrieved with any header convention
    Fetch,
    /// A network call exceeded its time bound
    Timeout,
    /// Anything else (client construction, unexpected payload structure)
    Unexpected,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Auth => "auth",
            Self::Fetch => "fetch",
            Self::Timeout => "timeout",
            Self::Unexpected => "unexpected",
        };
        f.write_str(name)
    }
}

/// Invalid or missing settings, detected before any request is served
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required setting: {0}")]
    Missing(&'static str),

    #[error("password digest must be 64 hexadecimal characters")]
    InvalidPasswordDigest,

    #[error("invalid API base URL '{0}', expected http:// or https://")]
    InvalidBaseUrl(String),

    #[error("invalid station id '{0}', expected a positive integer")]
    InvalidStationId(String),
}

pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Failure while obtaining an access token
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("token request failed: {0}")]
    Transport(#[source] reqwest::Error),

    #[error("token response (HTTP {status}) was not valid JSON: {source}")]
    Malformed {
        status: u16,
        #[source]
        source: serde_json::Error,
    },

    #[error("vendor rejected credentials (code {code}): {message}")]
    Rejected { code: String, message: String },

    #[error("vendor reported success but returned no access token")]
    MissingToken,
}

impl AuthError {
    pub fn kind(&self) -> FailureKind {
        match self {
            Self::Transport(e) if e.is_timeout() => FailureKind::Timeout,
            Self::Transport(_) | Self::Malformed { .. } | Self::Rejected { .. } | Self::MissingToken => {
                FailureKind::Auth
            }
        }
    }
}

pub type AuthResult<T> = std::result::Result<T, AuthError>;

/// Why a single header-convention attempt did not produce telemetry
#[derive(Debug, Error)]
pub enum AttemptFailure {
    #[error("transport error: {0}")]
    Transport(#[source] reqwest::Error),

    #[error("HTTP {status} with a body that is not JSON: {source}")]
    Malformed {
        status: u16,
        /// Raw body text as received
        body: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("vendor reported failure (HTTP {status}, code {code})")]
    Rejected { status: u16, code: String, body: Value },
}

impl AttemptFailure {
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Transport(e) if e.is_timeout())
    }

    /// What the vendor sent back, if a response arrived at all
    ///
    /// Bodies that are not JSON are kept as a JSON string.
    pub fn response_body(&self) -> Option<Value> {
        match self {
            Self::Transport(_) => None,
            Self::Malformed { body, .. } => Some(Value::String(body.clone())),
            Self::Rejected { body, .. } => Some(body.clone()),
        }
    }
}

#[derive(Debug)]
pub struct FailedAttempt {
    pub convention: HeaderConvention,
    pub failure: AttemptFailure,
}

/// Every header convention was tried and none was accepted
#[derive(Debug, Error)]
#[error("telemetry request failed after {} header conventions", .attempts.len())]
pub struct FetchError {
    pub attempts: Vec<FailedAttempt>,
    /// Body of the last response the vendor actually sent, kept for diagnostics only.
    /// Transport failures leave it at the previous attempt's body.
    pub last_response: Option<Value>,
}

impl FetchError {
    pub fn kind(&self) -> FailureKind {
        let all_timed_out =
            !self.attempts.is_empty() && self.attempts.iter().all(|a| a.failure.is_timeout());
        if all_timed_out {
            FailureKind::Timeout
        } else {
            FailureKind::Fetch
        }
    }
}

/// Top-level error returned by [`crate::BatteryMonitor`]
#[derive(Debug, Error)]
pub enum DeyeError {
    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error("failed to build HTTP client: {0}")]
    HttpClient(#[source] reqwest::Error),

    #[error("unexpected response structure: {0}")]
    UnexpectedResponse(String),
}

impl DeyeError {
    pub fn kind(&self) -> FailureKind {
        match self {
            Self::Auth(e) => e.kind(),
            Self::Fetch(e) => e.kind(),
            Self::HttpClient(_) | Self::UnexpectedResponse(_) => FailureKind::Unexpected,
        }
    }
}

pub type DeyeResult<T> = std::result::Result<T, DeyeError>;

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn rejected() -> AttemptFailure {
        AttemptFailure::Rejected {
            status: 200,
            code: "2101019".to_owned(),
            body: json!({"code": "2101019", "success": false}),
        }
    }

    #[test]
    fn test_fetch_error_with_rejections_is_fetch_kind() {
        let err = FetchError {
            attempts: HeaderConvention::ALL
                .into_iter()
                .map(|convention| FailedAttempt {
                    convention,
                    failure: rejected(),
                })
                .collect(),
            last_response: Some(json!({"code": "2101019"})),
        };

        assert_eq!(err.kind(), FailureKind::Fetch);
        assert_eq!(DeyeError::from(err).kind(), FailureKind::Fetch);
    }

    #[test]
    fn test_empty_fetch_error_is_not_timeout() {
        let err = FetchError {
            attempts: Vec::new(),
            last_response: None,
        };
        assert_eq!(err.kind(), FailureKind::Fetch);
    }

    #[test]
    fn test_auth_rejection_kinds() {
        assert_eq!(AuthError::MissingToken.kind(), FailureKind::Auth);
        let rejected = AuthError::Rejected {
            code: "2101006".to_owned(),
            message: "bad password".to_owned(),
        };
        assert_eq!(rejected.kind(), FailureKind::Auth);
        assert_eq!(DeyeError::from(rejected).kind(), FailureKind::Auth);
    }

    #[test]
    fn test_response_body_of_each_failure() {
        assert_eq!(rejected().response_body().unwrap()["code"], "2101019");

        let text = "<html>Bad Gateway</html>";
        let malformed = AttemptFailure::Malformed {
            status: 502,
            body: text.to_owned(),
            source: serde_json::from_str::<Value>(text).unwrap_err(),
        };
        assert_eq!(malformed.response_body(), Some(Value::String(text.to_owned())));
    }

    #[test]
    fn test_unexpected_kind() {
        let err = DeyeError::UnexpectedResponse("station list missing".to_owned());
        assert_eq!(err.kind(), FailureKind::Unexpected);
        assert_eq!(FailureKind::Unexpected.to_string(), "unexpected");
    }
}
