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

use crate::config::DeyeConfig;
use crate::envelope;
use crate::error::{AuthError, AuthResult};
use crate::token::{IssuedToken, TokenSource};
use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, error, info};

pub const TOKEN_PATH: &str = "/v1.0/account/token";

/// Used when the vendor omits the lifetime
pub const DEFAULT_EXPIRES_IN_SECS: i64 = 7200;

/// Longer vendor lifetimes are clamped to one year
pub const MAX_EXPIRES_IN_SECS: i64 = 365 * 24 * 3600;

const TOKEN_PATHS: [&str; 2] = ["data.access_token", "accessToken"];
const EXPIRY_PATHS: [&str; 4] = [
    "data.expires_in",
    "data.expiresIn",
    "expiresIn",
    "expires_in",
];

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct TokenRequest<'a> {
    app_secret: &'a str,
    email: &'a str,
    password: &'a str,
}

/// Exchanges account credentials for a Deye Cloud access token
#[derive(Debug, Clone)]
pub struct Authenticator {
    client: Client,
    config: Arc<DeyeConfig>,
}

impl Authenticator {
    pub fn new(client: Client, config: Arc<DeyeConfig>) -> Self {
        Self { client, config }
    }

    /// Perform one token request against the vendor
    pub async fn request_token(&self) -> AuthResult<IssuedToken> {
        let url = self.config.endpoint(TOKEN_PATH);
        info!("🔐 [DEYE AUTH] Requesting access token");
        debug!("   URL: {}", url);

        let body = TokenRequest {
            app_secret: self.config.app_secret(),
            email: self.config.email(),
            password: self.config.password_digest().as_str(),
        };

        let response = self
            .client
            .post(&url)
            .query(&[("appId", self.config.app_id())])
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                error!("❌ [DEYE AUTH] Token request failed: {}", e);
                AuthError::Transport(e)
            })?;

        let status = response.status().as_u16();
        let text = response.text().await.map_err(AuthError::Transport)?;
        let document: Value = serde_json::from_str(&text)
            .map_err(|source| AuthError::Malformed { status, source })?;

        let issued = parse_token_response(&document).inspect_err(|e| {
            error!("❌ [DEYE AUTH] {}", e);
        })?;

        info!(
            "✅ [DEYE AUTH] Access token issued, valid for {}s",
            issued.expires_in_secs
        );
        Ok(issued)
    }
}

#[async_trait]
impl TokenSource for Authenticator {
    async fn refresh(&self) -> AuthResult<IssuedToken> {
        self.request_token().await
    }
}

/// Interpret a token endpoint response body
///
/// Success needs one of the vendor success sentinels and a non-empty token at
/// `data.access_token` or `accessToken`. A missing or unparsable lifetime falls back to
/// [`DEFAULT_EXPIRES_IN_SECS`]; anything longer than [`MAX_EXPIRES_IN_SECS`] is clamped.
pub fn parse_token_response(body: &Value) -> AuthResult<IssuedToken> {
    if !envelope::is_success(body) {
        return Err(AuthError::Rejected {
            code: envelope::result_code(body),
            message: envelope::vendor_message(body),
        });
    }

    let access_token = envelope::first_present(body, &TOKEN_PATHS)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .ok_or(AuthError::MissingToken)?
        .to_owned();

    #[expect(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
    let expires_in_secs = envelope::first_present(body, &EXPIRY_PATHS)
        .and_then(envelope::as_number)
        .filter(|secs| *secs > 0.0)
        .map_or(DEFAULT_EXPIRES_IN_SECS, |secs| {
            secs.min(MAX_EXPIRES_IN_SECS as f64) as i64
        });

    Ok(IssuedToken {
        access_token,
        expires_in_secs,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{DeyeCredentials, PasswordInput, hash_password};
    use crate::error::FailureKind;
    use mockito::{Matcher, Server};
    use serde_json::json;
    use std::time::Duration;

    fn authenticator(base_url: &str) -> Authenticator {
        let credentials = DeyeCredentials {
            app_id: "app-42".to_owned(),
            app_secret: "s3cr3t".to_owned(),
            email: "owner@example.com".to_owned(),
            password: PasswordInput::Plain("hunter2".to_owned()),
        };
        let config = DeyeConfig::new(credentials, base_url, 61234).unwrap();
        let client = Client::builder()
            .timeout(Duration::from_secs(5))
            .build()
            .unwrap();
        Authenticator::new(client, Arc::new(config))
    }

    #[tokio::test]
    async fn test_request_token_success() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", TOKEN_PATH)
            .match_query(Matcher::UrlEncoded("appId".into(), "app-42".into()))
            .match_body(Matcher::Json(json!({
                "appSecret": "s3cr3t",
                "email": "owner@example.com",
                "password": hash_password("hunter2")
            })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                json!({
                    "code": "0",
                    "success": true,
                    "data": {"access_token": "abc", "expires_in": 5184000}
                })
                .to_string(),
            )
            .create_async()
            .await;

        let issued = authenticator(&server.url()).request_token().await.unwrap();

        assert_eq!(issued.access_token, "abc");
        assert_eq!(issued.expires_in_secs, 5_184_000);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_request_token_rejected_credentials() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", TOKEN_PATH)
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body(
                json!({"code": "2101006", "msg": "password error", "success": false}).to_string(),
            )
            .create_async()
            .await;

        let err = authenticator(&server.url())
            .request_token()
            .await
            .unwrap_err();

        match &err {
            AuthError::Rejected { code, message } => {
                assert_eq!(code, "2101006");
                assert_eq!(message, "password error");
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(err.kind(), FailureKind::Auth);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_request_token_non_json_body() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("POST", TOKEN_PATH)
            .match_query(Matcher::Any)
            .with_status(503)
            .with_body("Service Unavailable")
            .create_async()
            .await;

        let err = authenticator(&server.url())
            .request_token()
            .await
            .unwrap_err();

        assert!(matches!(err, AuthError::Malformed { status: 503, .. }));
        assert_eq!(err.kind(), FailureKind::Auth);
    }

    #[tokio::test]
    async fn test_refresh_delegates_to_request_token() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", TOKEN_PATH)
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body(json!({"success": true, "accessToken": "top"}).to_string())
            .expect(1)
            .create_async()
            .await;

        let auth = authenticator(&server.url());
        let source: &dyn TokenSource = &auth;
        let issued = source.refresh().await.unwrap();

        assert_eq!(issued.access_token, "top");
        assert_eq!(issued.expires_in_secs, DEFAULT_EXPIRES_IN_SECS);
        mock.assert_async().await;
    }

    #[test]
    fn test_parse_top_level_token_with_camel_case_expiry() {
        let issued = parse_token_response(&json!({
            "code": "1000000",
            "accessToken": "xyz",
            "expiresIn": "3600"
        }))
        .unwrap();

        assert_eq!(issued.access_token, "xyz");
        assert_eq!(issued.expires_in_secs, 3600);
    }

    #[test]
    fn test_parse_prefers_nested_token() {
        let issued = parse_token_response(&json!({
            "code": "0",
            "data": {"access_token": "nested"},
            "accessToken": "outer"
        }))
        .unwrap();

        assert_eq!(issued.access_token, "nested");
        assert_eq!(issued.expires_in_secs, DEFAULT_EXPIRES_IN_SECS);
    }

    #[test]
    fn test_parse_success_without_token() {
        let result = parse_token_response(&json!({"code": "0", "data": {"access_token": ""}}));
        assert!(matches!(result, Err(AuthError::MissingToken)));

        let result = parse_token_response(&json!({"success": true}));
        assert!(matches!(result, Err(AuthError::MissingToken)));
    }

    #[test]
    fn test_parse_invalid_expiry_falls_back_to_default() {
        let issued = parse_token_response(&json!({
            "code": "0",
            "accessToken": "t",
            "expiresIn": -5
        }))
        .unwrap();
        assert_eq!(issued.expires_in_secs, DEFAULT_EXPIRES_IN_SECS);
    }

    #[test]
    fn test_parse_huge_expiry_is_clamped() {
        for huge in [json!(1e13), json!("1e300"), json!(i64::MAX)] {
            let issued = parse_token_response(&json!({
                "code": "0",
                "data": {"access_token": "tok", "expires_in": huge}
            }))
            .unwrap();
            assert_eq!(issued.expires_in_secs, MAX_EXPIRES_IN_SECS);
        }
    }
}
