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

//! Canonical battery telemetry and the mapping from Deye's field name variants
//!
//! The vendor is inconsistent about casing and naming across firmware and API
//! versions, so every canonical field has an ordered list of candidate keys. The
//! first candidate holding a usable number wins. Candidates are probed on the top
//! level of the document first and then inside a nested `data` object.

use crate::envelope;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Battery power beyond this magnitude counts as charging or discharging
pub const DEADZONE_WATTS: i64 = 50;

/// Candidate vendor keys for one canonical field, in priority order
#[derive(Debug, Clone, Copy)]
pub struct FieldVariants {
    pub field: &'static str,
    pub keys: &'static [&'static str],
}

pub const BATTERY_PERCENT: FieldVariants = FieldVariants {
    field: "batteryPercent",
    keys: &[
        "batterySoc",
        "battery_soc",
        "batterySOC",
        "batteryPercentage",
        "battery_percentage",
    ],
};

pub const BATTERY_POWER: FieldVariants = FieldVariants {
    field: "batteryPowerWatts",
    keys: &["batteryPower", "battery_power", "batterypower"],
};

pub const SOLAR_POWER: FieldVariants = FieldVariants {
    field: "solarPowerWatts",
    keys: &["generationPower", "generation_power", "pvPower"],
};

pub const GRID_POWER: FieldVariants = FieldVariants {
    field: "gridPowerWatts",
    keys: &["gridPower", "grid_power"],
};

pub const CONSUMPTION_POWER: FieldVariants = FieldVariants {
    field: "consumptionPowerWatts",
    keys: &["consumptionPower", "consumption_power"],
};

pub const LAST_UPDATE: FieldVariants = FieldVariants {
    field: "lastUpdate",
    keys: &["lastUpdateTime"],
};

/// Every canonical field, in the order `normalize` destructures them
const FIELD_TABLE: [FieldVariants; 6] = [
    BATTERY_PERCENT,
    BATTERY_POWER,
    SOLAR_POWER,
    GRID_POWER,
    CONSUMPTION_POWER,
    LAST_UPDATE,
];

/// First usable number for a field, top level before the nested `data` object
pub fn lookup_number(raw: &Value, variants: &FieldVariants) -> Option<f64> {
    let scopes = [Some(raw), raw.get("data").filter(|d| d.is_object())];
    scopes.into_iter().flatten().find_map(|scope| {
        variants
            .keys
            .iter()
            .filter_map(|key| scope.get(*key))
            .find_map(envelope::as_number)
    })
}

#[expect(clippy::cast_possible_truncation)]
fn truncate(value: f64) -> i64 {
    value.trunc() as i64
}

/// One normalized telemetry snapshot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TelemetryRecord {
    pub battery_percent: u8,
    /// Positive while charging, negative while discharging
    pub battery_power_watts: i64,
    pub solar_power_watts: u64,
    /// Sign as reported by the vendor
    pub grid_power_watts: i64,
    pub consumption_power_watts: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_update: Option<DateTime<Utc>>,
}

impl TelemetryRecord {
    pub fn presentation(&self) -> PresentationAttributes {
        PresentationAttributes::derive(self)
    }
}

/// Map a raw vendor document onto the canonical record
///
/// Never fails: missing or unusable fields become 0 (or `None` for the timestamp).
pub fn normalize(raw: &Value) -> TelemetryRecord {
    let [percent, battery, solar, grid, consumption, updated] =
        FIELD_TABLE.map(|variants| lookup_number(raw, &variants).map(truncate));
    let int = |value: Option<i64>| value.unwrap_or(0);

    #[expect(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let battery_percent = int(percent).clamp(0, 100) as u8;
    #[expect(clippy::cast_sign_loss)]
    let solar_power_watts = int(solar).max(0) as u64;
    #[expect(clippy::cast_sign_loss)]
    let consumption_power_watts = int(consumption).max(0) as u64;

    let last_update = updated
        .filter(|secs| *secs > 0)
        .and_then(|secs| DateTime::from_timestamp(secs, 0));

    TelemetryRecord {
        battery_percent,
        battery_power_watts: int(battery),
        solar_power_watts,
        grid_power_watts: int(grid),
        consumption_power_watts,
        last_update,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BatteryStatus {
    FullyCharged,
    Good,
    Medium,
    Low,
}

impl BatteryStatus {
    pub fn from_percent(percent: u8) -> Self {
        match percent {
            80.. => Self::FullyCharged,
            50..=79 => Self::Good,
            20..=49 => Self::Medium,
            0..=19 => Self::Low,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccentColor {
    Green,
    Orange,
    DarkOrange,
    Red,
}

impl AccentColor {
    pub fn for_status(status: BatteryStatus) -> Self {
        match status {
            BatteryStatus::FullyCharged => Self::Green,
            BatteryStatus::Good => Self::Orange,
            BatteryStatus::Medium => Self::DarkOrange,
            BatteryStatus::Low => Self::Red,
        }
    }

    pub fn hex(self) -> &'static str {
        match self {
            Self::Green => "#00FF00",
            Self::Orange => "#FFA500",
            Self::DarkOrange => "#FF6B00",
            Self::Red => "#FF0000",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChargeState {
    Charging,
    Discharging,
    Idle,
}

impl ChargeState {
    pub fn from_power(watts: i64) -> Self {
        if watts > DEADZONE_WATTS {
            Self::Charging
        } else if watts < -DEADZONE_WATTS {
            Self::Discharging
        } else {
            Self::Idle
        }
    }
}

/// Language-neutral presentation derived from a record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PresentationAttributes {
    pub status: BatteryStatus,
    pub accent: AccentColor,
    pub charge_state: ChargeState,
}

impl PresentationAttributes {
    pub fn derive(record: &TelemetryRecord) -> Self {
        let status = BatteryStatus::from_percent(record.battery_percent);
        Self {
            status,
            accent: AccentColor::for_status(status),
            charge_state: ChargeState::from_power(record.battery_power_watts),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    #[test]
    fn test_first_variant_wins() {
        let raw = json!({"batterySoc": 85, "battery_soc": 10, "batterySOC": 20});
        assert_eq!(normalize(&raw).battery_percent, 85);
    }

    #[test]
    fn test_later_variant_used_when_earlier_missing_or_null() {
        let raw = json!({
            "batterySoc": null,
            "batteryPercentage": 64,
            "battery_power": "-310.8",
            "pvPower": 1500.9
        });
        let record = normalize(&raw);

        assert_eq!(record.battery_percent, 64);
        assert_eq!(record.battery_power_watts, -310);
        assert_eq!(record.solar_power_watts, 1500);
    }

    #[test]
    fn test_unparsable_value_is_skipped() {
        let raw = json!({"batterySoc": "n/a", "battery_soc": "77"});
        assert_eq!(normalize(&raw).battery_percent, 77);
    }

    #[test]
    fn test_nested_data_object_is_probed_after_top_level() {
        let raw = json!({
            "code": "1000000",
            "gridPower": 12,
            "data": {"batterySOC": 42, "gridPower": 999, "consumptionPower": 450}
        });
        let record = normalize(&raw);

        assert_eq!(record.battery_percent, 42);
        assert_eq!(record.grid_power_watts, 12);
        assert_eq!(record.consumption_power_watts, 450);
    }

    #[test]
    fn test_missing_fields_default_to_zero() {
        for raw in [json!({}), json!(null), json!([1, 2]), json!({"data": "oops"})] {
            assert_eq!(normalize(&raw), TelemetryRecord::default());
        }
    }

    #[test]
    fn test_clamping() {
        let raw = json!({
            "batterySoc": 140,
            "generationPower": -20,
            "consumptionPower": -1,
            "gridPower": -800
        });
        let record = normalize(&raw);

        assert_eq!(record.battery_percent, 100);
        assert_eq!(record.solar_power_watts, 0);
        assert_eq!(record.consumption_power_watts, 0);
        assert_eq!(record.grid_power_watts, -800);

        assert_eq!(normalize(&json!({"batterySoc": -3})).battery_percent, 0);
    }

    #[test]
    fn test_last_update_from_epoch_seconds() {
        let record = normalize(&json!({"lastUpdateTime": 1_761_991_200}));
        assert_eq!(
            record.last_update,
            Some(Utc.with_ymd_and_hms(2025, 11, 1, 10, 0, 0).unwrap())
        );
        assert!(normalize(&json!({"lastUpdateTime": 0})).last_update.is_none());
    }

    #[test]
    fn test_normalize_is_idempotent() {
        let raw = json!({
            "batterySoc": 85,
            "batteryPower": 120,
            "generationPower": 300,
            "gridPower": -50,
            "consumptionPower": 250
        });
        let first = normalize(&raw);

        assert_eq!(first, normalize(&raw));
        assert_eq!(first.battery_percent, 85);
        assert_eq!(first.grid_power_watts, -50);
    }

    #[test]
    fn test_field_table_covers_every_canonical_field() {
        let fields: Vec<_> = FIELD_TABLE.iter().map(|v| v.field).collect();
        assert_eq!(
            fields,
            [
                "batteryPercent",
                "batteryPowerWatts",
                "solarPowerWatts",
                "gridPowerWatts",
                "consumptionPowerWatts",
                "lastUpdate"
            ]
        );
        assert!(FIELD_TABLE.iter().all(|v| !v.keys.is_empty()));
    }

    #[test]
    fn test_each_table_row_feeds_its_field() {
        let mut raw = serde_json::Map::new();
        for (variants, value) in FIELD_TABLE.iter().zip([61, -700, 1800, 230, 950, 1_761_991_200]) {
            raw.insert(variants.keys[variants.keys.len() - 1].to_owned(), json!(value));
        }
        let record = normalize(&Value::Object(raw));

        assert_eq!(
            record,
            TelemetryRecord {
                battery_percent: 61,
                battery_power_watts: -700,
                solar_power_watts: 1800,
                grid_power_watts: 230,
                consumption_power_watts: 950,
                last_update: Some(Utc.with_ymd_and_hms(2025, 11, 1, 10, 0, 0).unwrap()),
            }
        );
    }

    #[test]
    fn test_status_bands_have_no_gaps() {
        for percent in 0..=100_u8 {
            let expected = if percent >= 80 {
                BatteryStatus::FullyCharged
            } else if percent >= 50 {
                BatteryStatus::Good
            } else if percent >= 20 {
                BatteryStatus::Medium
            } else {
                BatteryStatus::Low
            };
            assert_eq!(BatteryStatus::from_percent(percent), expected, "{percent}%");
        }
    }

    #[test]
    fn test_band_edges_and_colors() {
        let cases = [
            (100, BatteryStatus::FullyCharged, "#00FF00"),
            (80, BatteryStatus::FullyCharged, "#00FF00"),
            (79, BatteryStatus::Good, "#FFA500"),
            (50, BatteryStatus::Good, "#FFA500"),
            (49, BatteryStatus::Medium, "#FF6B00"),
            (20, BatteryStatus::Medium, "#FF6B00"),
            (19, BatteryStatus::Low, "#FF0000"),
            (0, BatteryStatus::Low, "#FF0000"),
        ];
        for (percent, status, color) in cases {
            assert_eq!(BatteryStatus::from_percent(percent), status);
            assert_eq!(AccentColor::for_status(status).hex(), color);
        }
    }

    #[test]
    fn test_charge_state_deadzone() {
        assert_eq!(ChargeState::from_power(51), ChargeState::Charging);
        assert_eq!(ChargeState::from_power(50), ChargeState::Idle);
        assert_eq!(ChargeState::from_power(0), ChargeState::Idle);
        assert_eq!(ChargeState::from_power(-50), ChargeState::Idle);
        assert_eq!(ChargeState::from_power(-51), ChargeState::Discharging);
    }

    #[test]
    fn test_presentation_for_scenario_record() {
        let record = normalize(&json!({"batterySoc": 85, "batteryPower": 120}));
        let presentation = record.presentation();

        assert_eq!(presentation.status, BatteryStatus::FullyCharged);
        assert_eq!(presentation.accent, AccentColor::Green);
        assert_eq!(presentation.charge_state, ChargeState::Charging);
    }
}
