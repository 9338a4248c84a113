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

use crate::auth::Authenticator;
use crate::config::DeyeConfig;
use crate::error::{DeyeError, DeyeResult, FailureKind};
use crate::fetch::{StationSummary, TelemetryFetcher};
use crate::telemetry::{TelemetryRecord, normalize};
use crate::token::TokenCache;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Client;
use std::sync::Arc;
use tracing::{debug, info, warn};

const USER_AGENT: &str = concat!("fluxion-voice/", env!("CARGO_PKG_VERSION"));

/// Source of the current canonical battery telemetry
///
/// The voice layer depends on this trait only, so it can be driven by a fake in tests.
#[async_trait]
pub trait TelemetrySource: Send + Sync {
    async fn latest_telemetry(&self) -> DeyeResult<TelemetryRecord>;
}

/// Long-lived access point to one Deye station
///
/// Owns the token cache, so a single instance should be shared (behind an `Arc`) by
/// every request handler of the process.
#[derive(Debug)]
pub struct BatteryMonitor {
    config: Arc<DeyeConfig>,
    cache: TokenCache,
    authenticator: Authenticator,
    fetcher: TelemetryFetcher,
}

impl BatteryMonitor {
    pub fn new(config: DeyeConfig) -> DeyeResult<Self> {
        let client = Client::builder()
            .timeout(config.request_timeout())
            .user_agent(USER_AGENT)
            .build()
            .map_err(DeyeError::HttpClient)?;

        let config = Arc::new(config);
        info!(
            "Initializing Deye monitor for station {} at {}",
            config.station_id(),
            config.api_base_url()
        );

        Ok(Self {
            authenticator: Authenticator::new(client.clone(), Arc::clone(&config)),
            fetcher: TelemetryFetcher::new(client, Arc::clone(&config)),
            cache: TokenCache::new(),
            config,
        })
    }

    pub fn config(&self) -> &DeyeConfig {
        &self.config
    }

    pub fn token_cache(&self) -> &TokenCache {
        &self.cache
    }

    /// Token, fetch and normalize, evaluated against the given clock reading
    pub async fn latest_telemetry_at(&self, now: DateTime<Utc>) -> DeyeResult<TelemetryRecord> {
        let token = self
            .cache
            .get_valid_token(&self.authenticator, now)
            .await?;

        let raw = self
            .fetcher
            .fetch_latest(&token, self.config.station_id())
            .await
            .inspect_err(|e| {
                // Every convention refused the token: it may have been revoked early
                if e.kind() == FailureKind::Fetch {
                    self.cache.invalidate();
                }
            })?;
        debug!("📦 [DEYE RAW] {}", raw);

        let record = normalize(&raw);
        info!(
            "🔋 [DEYE TELEMETRY] Battery {}%, battery {} W, solar {} W, grid {} W, load {} W",
            record.battery_percent,
            record.battery_power_watts,
            record.solar_power_watts,
            record.grid_power_watts,
            record.consumption_power_watts
        );
        Ok(record)
    }

    /// Stations visible to the configured account
    pub async fn stations(&self) -> DeyeResult<Vec<StationSummary>> {
        let token = self
            .cache
            .get_valid_token(&self.authenticator, Utc::now())
            .await?;
        self.fetcher.list_stations(&token).await.inspect_err(|e| {
            warn!("⚠️ [DEYE STATIONS] Station listing failed: {}", e);
        })
    }
}

#[async_trait]
impl TelemetrySource for BatteryMonitor {
    async fn latest_telemetry(&self) -> DeyeResult<TelemetryRecord> {
        self.latest_telemetry_at(Utc::now()).await
    }
}
