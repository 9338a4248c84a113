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

//! Telemetry retrieval with authorization header fallback
//!
//! Deye deployments disagree on how the access token is presented. The fetcher tries
//! each [`HeaderConvention`] in a fixed order, one at a time, and returns the first
//! body the vendor marks as successful. Transport failures (timeouts included) and
//! vendor rejections both move on to the next convention.

use crate::config::DeyeConfig;
use crate::envelope;
use crate::error::{AttemptFailure, DeyeError, DeyeResult, FailedAttempt, FetchError};
use reqwest::header::AUTHORIZATION;
use reqwest::{Client, RequestBuilder};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info, warn};

pub const LATEST_TELEMETRY_PATH: &str = "/v1.0/station/latest";
pub const STATION_LIST_PATH: &str = "/v1.0/device/station/list";

const ACCESS_TOKEN_HEADER: &str = "X-Access-Token";
const UNKNOWN_STATION_NAME: &str = "Unknown";

/// How the access token is attached to a request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HeaderConvention {
    /// `Authorization: Bearer <token>`
    Bearer,
    /// `Authorization: <token>`
    RawToken,
    /// `X-Access-Token: <token>`
    AccessTokenHeader,
}

impl HeaderConvention {
    /// Attempt order, fixed
    pub const ALL: [Self; 3] = [Self::Bearer, Self::RawToken, Self::AccessTokenHeader];

    pub fn apply(self, request: RequestBuilder, token: &str) -> RequestBuilder {
        match self {
            Self::Bearer => request.bearer_auth(token),
            Self::RawToken => request.header(AUTHORIZATION, token),
            Self::AccessTokenHeader => request.header(ACCESS_TOKEN_HEADER, token),
        }
    }
}

impl fmt::Display for HeaderConvention {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Bearer => "Authorization: Bearer",
            Self::RawToken => "Authorization (raw)",
            Self::AccessTokenHeader => ACCESS_TOKEN_HEADER,
        };
        f.write_str(name)
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct LatestTelemetryRequest {
    station_id: u64,
}

/// A station visible to the account
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StationSummary {
    pub id: u64,
    pub name: String,
}

#[derive(Debug, Clone)]
pub struct TelemetryFetcher {
    client: Client,
    config: Arc<DeyeConfig>,
}

impl TelemetryFetcher {
    pub fn new(client: Client, config: Arc<DeyeConfig>) -> Self {
        Self { client, config }
    }

    /// Latest raw telemetry document for a station
    ///
    /// Returns the whole successful response body; picking fields out of it is the
    /// normalizer's job.
    pub async fn fetch_latest(&self, token: &str, station_id: u64) -> Result<Value, FetchError> {
        info!("📡 [DEYE FETCH] Requesting latest telemetry for station {}", station_id);
        let body = LatestTelemetryRequest { station_id };
        self.post_with_fallback(LATEST_TELEMETRY_PATH, token, &body).await
    }

    /// Stations registered on the account, used to discover the station id
    pub async fn list_stations(&self, token: &str) -> DeyeResult<Vec<StationSummary>> {
        info!("📋 [DEYE STATIONS] Listing stations");
        let body = self
            .post_with_fallback(STATION_LIST_PATH, token, &json!({}))
            .await?;

        let stations = parse_station_list(&body)?;
        info!("✅ [DEYE STATIONS] Found {} station(s)", stations.len());
        Ok(stations)
    }

    async fn post_with_fallback<B>(
        &self,
        path: &str,
        token: &str,
        body: &B,
    ) -> Result<Value, FetchError>
    where
        B: Serialize + Sync + ?Sized,
    {
        let url = self.config.endpoint(path);
        debug!("   URL: {}", url);

        let mut attempts = Vec::with_capacity(HeaderConvention::ALL.len());
        let mut last_response = None;

        for convention in HeaderConvention::ALL {
            debug!("   Trying header convention: {}", convention);
            match self.attempt(&url, convention, token, body).await {
                Ok(document) => {
                    info!("✅ [DEYE FETCH] Accepted with header convention: {}", convention);
                    return Ok(document);
                }
                Err(failure) => {
                    warn!(
                        "⚠️ [DEYE FETCH] {} attempt failed: {}",
                        convention, failure
                    );
                    if let Some(body) = failure.response_body() {
                        last_response = Some(body);
                    }
                    attempts.push(FailedAttempt {
                        convention,
                        failure,
                    });
                }
            }
        }

        if let Some(response) = &last_response {
            debug!("   Last vendor response: {}", response);
        }

        Err(FetchError {
            attempts,
            last_response,
        })
    }

    async fn attempt<B>(
        &self,
        url: &str,
        convention: HeaderConvention,
        token: &str,
        body: &B,
    ) -> Result<Value, AttemptFailure>
    where
        B: Serialize + Sync + ?Sized,
    {
        let request = convention.apply(self.client.post(url).json(body), token);
        let response = request.send().await.map_err(AttemptFailure::Transport)?;
        let status = response.status().as_u16();
        let text = response.text().await.map_err(AttemptFailure::Transport)?;

        let document: Value = match serde_json::from_str(&text) {
            Ok(document) => document,
            Err(source) => {
                return Err(AttemptFailure::Malformed {
                    status,
                    body: text,
                    source,
                });
            }
        };

        if envelope::is_success(&document) {
            Ok(document)
        } else {
            Err(AttemptFailure::Rejected {
                status,
                code: envelope::result_code(&document),
                body: document,
            })
        }
    }
}

/// Station entries live under `data` (a list) or `data.list`, depending on deployment
fn parse_station_list(body: &Value) -> DeyeResult<Vec<StationSummary>> {
    let entries = envelope::first_present(body, &["data.list", "stationList", "data"])
        .and_then(Value::as_array)
        .ok_or_else(|| DeyeError::UnexpectedResponse("station list not found".to_owned()))?;

    Ok(entries
        .iter()
        .filter_map(|entry| {
            let id = envelope::first_present(entry, &["stationId", "id"])
                .and_then(envelope::as_number)?;
            if id < 1.0 {
                return None;
            }
            #[expect(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
            let id = id as u64;
            let name = envelope::first_present(entry, &["stationName", "name"])
                .and_then(Value::as_str)
                .unwrap_or(UNKNOWN_STATION_NAME)
                .to_owned();
            Some(StationSummary { id, name })
        })
        .collect())
}
