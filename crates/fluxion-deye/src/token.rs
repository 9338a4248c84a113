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

//! Access token cache with expiry-aware reuse
//!
//! One cache lives inside the long-running [`crate::BatteryMonitor`] and is shared by
//! every request it serves. It starts empty, is filled by the first refresh and is
//! replaced in place whenever the stored token gets within [`REFRESH_MARGIN_SECS`] of
//! its expiry.
//!
//! The lock only protects the slot itself and is never held while a refresh is in
//! flight, so two cold requests may both refresh. Either token is valid; the last
//! writer wins.

use crate::auth::DEFAULT_EXPIRES_IN_SECS;
use crate::error::AuthResult;
use async_trait::async_trait;
use chrono::{DateTime, TimeDelta, Utc};
use parking_lot::RwLock;
use std::fmt;
use tracing::{debug, info, warn};

/// Tokens are refreshed this long before the vendor-reported expiry
pub const REFRESH_MARGIN_SECS: i64 = 300;

/// A freshly issued access token
#[derive(Clone, PartialEq, Eq)]
pub struct IssuedToken {
    pub access_token: String,
    pub expires_in_secs: i64,
}

impl fmt::Debug for IssuedToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IssuedToken")
            .field("access_token", &"<redacted>")
            .field("expires_in_secs", &self.expires_in_secs)
            .finish()
    }
}

/// Anything able to issue a new access token
#[async_trait]
pub trait TokenSource: Send + Sync {
    async fn refresh(&self) -> AuthResult<IssuedToken>;
}

#[derive(Clone)]
struct CachedToken {
    access_token: String,
    expires_at: DateTime<Utc>,
}

impl CachedToken {
    fn is_valid_at(&self, now: DateTime<Utc>) -> bool {
        now < self.expires_at - TimeDelta::seconds(REFRESH_MARGIN_SECS)
    }
}

impl fmt::Debug for CachedToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CachedToken")
            .field("expires_at", &self.expires_at)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Default)]
pub struct TokenCache {
    slot: RwLock<Option<CachedToken>>,
}

impl TokenCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the cached token if it is still comfortably valid, otherwise refresh it
    ///
    /// A cache hit makes no call to `source`. A miss calls `source.refresh()` exactly
    /// once and stores the result as expiring at `now + expires_in`.
    pub async fn get_valid_token<S>(&self, source: &S, now: DateTime<Utc>) -> AuthResult<String>
    where
        S: TokenSource + ?Sized,
    {
        if let Some(token) = self.cached_token(now) {
            debug!("🔑 [TOKEN CACHE] Reusing cached access token");
            return Ok(token);
        }

        info!("🔑 [TOKEN CACHE] No valid token cached, requesting a new one");
        let issued = source.refresh().await?;

        let expires_at = expiry_after(now, issued.expires_in_secs);
        *self.slot.write() = Some(CachedToken {
            access_token: issued.access_token.clone(),
            expires_at,
        });
        debug!("   Token cached until {}", expires_at);

        Ok(issued.access_token)
    }

    /// Cached token, only if it is valid at `now`
    pub fn cached_token(&self, now: DateTime<Utc>) -> Option<String> {
        self.slot
            .read()
            .as_ref()
            .filter(|cached| cached.is_valid_at(now))
            .map(|cached| cached.access_token.clone())
    }

    /// Absolute expiry of the stored token, valid or not
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.slot.read().as_ref().map(|cached| cached.expires_at)
    }

    /// Drop the stored token so the next request authenticates again
    pub fn invalidate(&self) {
        if self.slot.write().take().is_some() {
            debug!("🔑 [TOKEN CACHE] Cached token invalidated");
        }
    }
}

/// `now + lifetime`, falling back to the default lifetime when that is not representable
fn expiry_after(now: DateTime<Utc>, lifetime_secs: i64) -> DateTime<Utc> {
    let after = |secs: i64| {
        TimeDelta::try_seconds(secs.max(0)).and_then(|delta| now.checked_add_signed(delta))
    };
    after(lifetime_secs)
        .or_else(|| {
            warn!(
                "⚠️ [TOKEN CACHE] Token lifetime {}s out of range, using {}s",
                lifetime_secs, DEFAULT_EXPIRES_IN_SECS
            );
            after(DEFAULT_EXPIRES_IN_SECS)
        })
        .unwrap_or(now)
}
