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

//! Operator commands of the `fluxion-voice` binary

use crate::config::AppConfig;
use anyhow::{Context, Result, bail};
use fluxion_deye::{BatteryMonitor, TelemetrySource, hash_password};
use fluxion_voice::speech;
use fluxion_voice::BatterySkill;
use serde_json::{Value, json};
use std::path::Path;
use std::sync::Arc;
use tracing::info;

fn monitor(config: &AppConfig) -> Result<Arc<BatteryMonitor>> {
    let deye = config.to_deye_config()?;
    let monitor = BatteryMonitor::new(deye).context("Failed to initialize Deye client")?;
    Ok(Arc::new(monitor))
}

fn skill(config: &AppConfig) -> Result<BatterySkill> {
    Ok(BatterySkill::new(
        monitor(config)?,
        config.skill.default_language,
    ))
}

pub async fn serve(config: &AppConfig, bind: Option<String>) -> Result<()> {
    let bind = bind.unwrap_or_else(|| config.skill.bind_address.clone());

    info!("🚀 Starting FluxION Voice");
    info!("📋 Configuration Summary:");
    info!("   API: {}", config.deye.api_url);
    info!("   Station: {}", config.deye.station_id.unwrap_or_default());
    info!("   Request timeout: {}s", config.deye.timeout_secs);
    info!("   Default language: {}", config.skill.default_language);

    let skill = Arc::new(skill(config)?);
    fluxion_voice::serve(skill, &bind)
        .await
        .with_context(|| format!("Skill endpoint on {bind} stopped"))
}

/// One-shot telemetry read, printed as JSON
pub async fn status(config: &AppConfig) -> Result<()> {
    let monitor = monitor(config)?;
    let record = monitor
        .latest_telemetry()
        .await
        .context("Failed to read battery telemetry")?;

    let language = config.skill.default_language;
    let presentation = record.presentation();
    let output = json!({
        "record": record,
        "presentation": {
            "status": speech::status_label(language, presentation.status),
            "accentColor": presentation.accent.hex(),
            "chargeState": speech::charge_state_label(language, presentation.charge_state),
        },
        "speech": speech::battery_report(language, &record),
    });
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

pub async fn stations(config: &AppConfig) -> Result<()> {
    let stations = monitor(config)?
        .stations()
        .await
        .context("Failed to list stations")?;

    if stations.is_empty() {
        println!("No stations found for this account");
        return Ok(());
    }

    println!("{:<12} NAME", "STATION ID");
    for station in stations {
        println!("{:<12} {}", station.id, station.name);
    }
    Ok(())
}

/// Print the digest to configure as `DEYE_PASSWORD_HASH`
pub fn hash(password: Option<String>) -> Result<()> {
    let Some(password) = password.or_else(|| std::env::var("DEYE_PASSWORD").ok()) else {
        bail!("Pass --password or set DEYE_PASSWORD");
    };
    if password.is_empty() {
        bail!("Password must not be empty");
    }
    println!("{}", hash_password(&password));
    Ok(())
}

/// Run a saved Alexa request through the skill and print the response envelope
pub async fn invoke(config: &AppConfig, file: &Path) -> Result<()> {
    let text = std::fs::read_to_string(file)
        .with_context(|| format!("Failed to read {}", file.display()))?;
    let request: Value = serde_json::from_str(&text)
        .with_context(|| format!("{} is not valid JSON", file.display()))?;

    let envelope = skill(config)?.handle_value(&request).await?;
    println!("{}", serde_json::to_string_pretty(&envelope)?);
    Ok(())
}

