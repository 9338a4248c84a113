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

//! APL dashboard for devices with a screen
//!
//! The document layout is static per language; everything that changes per request
//! travels in the `batteryData` data source.

use crate::language::Language;
use crate::speech;
use chrono::{DateTime, Utc};
use fluxion_deye::TelemetryRecord;
use serde::Serialize;
use serde_json::{Value, json};

pub const RENDER_DOCUMENT_DIRECTIVE: &str = "Alexa.Presentation.APL.RenderDocument";
pub const APL_VERSION: &str = "1.8";
pub const DATASOURCE_NAME: &str = "batteryData";

/// Battery icon fill in dp per percent (268 dp inner width at 100%)
pub const FILL_SCALE_DP: f64 = 2.68;

/// Per-request values bound into the dashboard
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatteryDatasource {
    pub battery_percent: u8,
    pub battery_power: i64,
    pub solar_power: u64,
    pub grid_power: i64,
    pub consumption_power: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_update: Option<DateTime<Utc>>,
    pub status_label: &'static str,
    pub accent_color: &'static str,
    pub charge_state_label: &'static str,
    pub fill_width: f64,
}

impl BatteryDatasource {
    pub fn new(record: &TelemetryRecord, language: Language) -> Self {
        let presentation = record.presentation();
        Self {
            battery_percent: record.battery_percent,
            battery_power: record.battery_power_watts,
            solar_power: record.solar_power_watts,
            grid_power: record.grid_power_watts,
            consumption_power: record.consumption_power_watts,
            last_update: record.last_update,
            status_label: speech::status_label(language, presentation.status),
            accent_color: presentation.accent.hex(),
            charge_state_label: speech::charge_state_label(language, presentation.charge_state),
            fill_width: fill_width(record.battery_percent),
        }
    }
}

pub fn fill_width(percent: u8) -> f64 {
    f64::from(percent) * FILL_SCALE_DP
}

/// Full RenderDocument directive for one record
pub fn render_directive(record: &TelemetryRecord, language: Language) -> Value {
    json!({
        "type": RENDER_DOCUMENT_DIRECTIVE,
        "token": "batteryDashboard",
        "version": APL_VERSION,
        "document": dashboard_document(language),
        "datasources": {
            DATASOURCE_NAME: BatteryDatasource::new(record, language)
        }
    })
}

fn metric_column(label: &str, value_field: &str, color: &str) -> Value {
    json!({
        "type": "Container",
        "direction": "column",
        "alignItems": "center",
        "items": [
            {"type": "Text", "text": label, "fontSize": "25dp", "color": "#AAAAAA"},
            {
                "type": "Text",
                "text": format!("${{batteryData.{value_field}}} W"),
                "fontSize": "32dp",
                "fontWeight": "bold",
                "color": color
            }
        ]
    })
}

pub fn dashboard_document(language: Language) -> Value {
    let texts = speech::dashboard_texts(language);

    let battery = json!({
        "type": "Container",
        "direction": "column",
        "alignItems": "center",
        "items": [
            {
                "type": "Frame",
                "width": "280dp",
                "height": "140dp",
                "borderWidth": "6dp",
                "borderColor": "${batteryData.accentColor}",
                "borderRadius": "15dp",
                "items": [{
                    "type": "Frame",
                    "width": "${batteryData.fillWidth}dp",
                    "height": "100%",
                    "backgroundColor": "${batteryData.accentColor}",
                    "borderRadius": "10dp"
                }]
            },
            {
                "type": "Frame",
                "width": "35dp",
                "height": "18dp",
                "backgroundColor": "${batteryData.accentColor}",
                "position": "absolute",
                "left": "305dp",
                "top": "61dp"
            },
            {
                "type": "Text",
                "text": "${batteryData.batteryPercent}%",
                "fontSize": "100dp",
                "fontWeight": "bold",
                "color": "${batteryData.accentColor}",
                "paddingTop": "30dp"
            },
            {"type": "Text", "text": "${batteryData.statusLabel}", "fontSize": "35dp", "color": "#CCCCCC"},
            {
                "type": "Text",
                "text": "${batteryData.chargeStateLabel}",
                "fontSize": "30dp",
                "color": "#AAAAAA",
                "paddingTop": "10dp"
            }
        ]
    });

    let metrics = json!({
        "type": "Container",
        "direction": "row",
        "width": "85vw",
        "justifyContent": "spaceAround",
        "items": [
            metric_column(texts.solar, "solarPower", "#FFD700"),
            metric_column(texts.grid, "gridPower", "#00BFFF"),
            metric_column(texts.consumption, "consumptionPower", "#FF6B6B")
        ]
    });

    json!({
        "type": "APL",
        "version": APL_VERSION,
        "theme": "dark",
        "mainTemplate": {
            "parameters": [DATASOURCE_NAME],
            "items": [{
                "type": "Container",
                "width": "100vw",
                "height": "100vh",
                "alignItems": "center",
                "justifyContent": "center",
                "items": [{
                    "type": "Container",
                    "width": "90vw",
                    "height": "85vh",
                    "direction": "column",
                    "alignItems": "center",
                    "justifyContent": "spaceAround",
                    "items": [
                        {
                            "type": "Text",
                            "text": texts.title,
                            "fontSize": "50dp",
                            "fontWeight": "bold",
                            "color": "#FFFFFF"
                        },
                        battery,
                        metrics
                    ]
                }]
            }]
        }
    })
}
