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

//! Deye Cloud access layer: authentication with token caching, telemetry retrieval
//! with header fallback, and normalization into a canonical battery record.

pub mod auth;
pub mod config;
pub mod envelope;
pub mod error;
pub mod fetch;
pub mod monitor;
pub mod telemetry;
pub mod token;

pub use auth::Authenticator;
pub use config::{DeyeConfig, DeyeCredentials, PasswordDigest, PasswordInput, hash_password};
pub use error::{
    AuthError, AuthResult, ConfigError, ConfigResult, DeyeError, DeyeResult, FailureKind,
    FetchError,
};
pub use fetch::{HeaderConvention, StationSummary, TelemetryFetcher};
pub use monitor::{BatteryMonitor, TelemetrySource};
pub use telemetry::{
    AccentColor, BatteryStatus, ChargeState, PresentationAttributes, TelemetryRecord, normalize,
};
pub use token::{IssuedToken, TokenCache, TokenSource};
