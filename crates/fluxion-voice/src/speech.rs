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

//! Spoken phrases and display labels in every supported language

use crate::language::Language;
use crate::request::PowerMetric;
use fluxion_deye::telemetry::DEADZONE_WATTS;
use fluxion_deye::{BatteryStatus, ChargeState, FailureKind, TelemetryRecord};

/// Battery level, with a charging or discharging clause outside the deadzone
pub fn battery_report(language: Language, record: &TelemetryRecord) -> String {
    let percent = record.battery_percent;
    let watts = record.battery_power_watts;

    let mut text = match language {
        Language::English => format!("Your home battery is at {percent} percent."),
        Language::Portuguese => format!("A bateria da sua casa está em {percent} por cento."),
    };

    let clause = match (ChargeState::from_power(watts), language) {
        (ChargeState::Charging, Language::English) => format!(" It is charging at {watts} watts."),
        (ChargeState::Charging, Language::Portuguese) => {
            format!(" Está carregando em {watts} watts.")
        }
        (ChargeState::Discharging, Language::English) => {
            format!(" It is discharging at {} watts.", watts.unsigned_abs())
        }
        (ChargeState::Discharging, Language::Portuguese) => {
            format!(" Está descarregando em {} watts.", watts.unsigned_abs())
        }
        (ChargeState::Idle, _) => String::new(),
    };
    text.push_str(&clause);
    text
}

/// One reading, as asked for by the power reading intent
pub fn metric_reading(language: Language, metric: PowerMetric, record: &TelemetryRecord) -> String {
    match metric {
        PowerMetric::Battery => battery_report(language, record),
        PowerMetric::Solar => {
            let watts = record.solar_power_watts;
            match language {
                Language::English => format!("Your solar panels are producing {watts} watts."),
                Language::Portuguese => {
                    format!("Os painéis solares estão gerando {watts} watts.")
                }
            }
        }
        PowerMetric::Consumption => {
            let watts = record.consumption_power_watts;
            match language {
                Language::English => format!("Your home is using {watts} watts."),
                Language::Portuguese => format!("Sua casa está consumindo {watts} watts."),
            }
        }
        PowerMetric::Grid => grid_reading(language, record.grid_power_watts),
    }
}

/// Positive grid power is import, negative is export
fn grid_reading(language: Language, watts: i64) -> String {
    let magnitude = watts.unsigned_abs();
    if watts > DEADZONE_WATTS {
        match language {
            Language::English => format!("You are drawing {magnitude} watts from the grid."),
            Language::Portuguese => format!("Você está consumindo {magnitude} watts da rede."),
        }
    } else if watts < -DEADZONE_WATTS {
        match language {
            Language::English => format!("You are sending {magnitude} watts to the grid."),
            Language::Portuguese => format!("Você está enviando {magnitude} watts para a rede."),
        }
    } else {
        match language {
            Language::English => "Your home is barely exchanging power with the grid.".to_owned(),
            Language::Portuguese => "Sua casa quase não está trocando energia com a rede.".to_owned(),
        }
    }
}

/// Fixed apology per failure kind; never includes vendor detail
pub fn apology(language: Language, kind: FailureKind) -> &'static str {
    match (language, kind) {
        (Language::English, FailureKind::Auth) => {
            "Sorry, I couldn't connect to your inverter. Please check your credentials."
        }
        (Language::English, FailureKind::Fetch) => "Sorry, I couldn't retrieve your battery data.",
        (Language::English, FailureKind::Timeout) => {
            "Sorry, the request timed out. Please try again."
        }
        (Language::English, FailureKind::Unexpected) => {
            "Sorry, I ran into an error while retrieving your battery status."
        }
        (Language::Portuguese, FailureKind::Auth) => {
            "Desculpe, não consegui conectar ao seu inversor. Por favor, verifique suas credenciais."
        }
        (Language::Portuguese, FailureKind::Fetch) => {
            "Desculpe, não consegui recuperar os dados da sua bateria."
        }
        (Language::Portuguese, FailureKind::Timeout) => {
            "Desculpe, a requisição expirou. Por favor, tente novamente."
        }
        (Language::Portuguese, FailureKind::Unexpected) => {
            "Desculpe, encontrei um erro ao recuperar o status da sua bateria."
        }
    }
}

pub fn help(language: Language) -> &'static str {
    match language {
        Language::English => {
            "You can ask me: what is my battery percentage? You can also ask for the solar, grid or consumption reading."
        }
        Language::Portuguese => {
            "Você pode me perguntar: qual é o percentual da minha bateria? Também pode pedir a leitura solar, da rede ou do consumo."
        }
    }
}

pub fn goodbye(language: Language) -> &'static str {
    match language {
        Language::English => "Goodbye!",
        Language::Portuguese => "Adeus!",
    }
}

pub fn not_understood(language: Language) -> &'static str {
    match language {
        Language::English => "I didn't understand that. Please try again.",
        Language::Portuguese => "Não entendi isso. Por favor, tente novamente.",
    }
}

/// Question asked when the power reading intent arrives without a usable metric
pub fn ask_metric(language: Language) -> &'static str {
    match language {
        Language::English => "Which reading would you like: solar, grid, consumption or battery?",
        Language::Portuguese => "Qual leitura você quer: solar, rede, consumo ou bateria?",
    }
}

pub fn status_label(language: Language, status: BatteryStatus) -> &'static str {
    match (language, status) {
        (Language::English, BatteryStatus::FullyCharged) => "Fully Charged",
        (Language::English, BatteryStatus::Good) => "Good",
        (Language::English, BatteryStatus::Medium) => "Medium",
        (Language::English, BatteryStatus::Low) => "Low - Consider Charging",
        (Language::Portuguese, BatteryStatus::FullyCharged) => "Totalmente Carregado",
        (Language::Portuguese, BatteryStatus::Good) => "Bom",
        (Language::Portuguese, BatteryStatus::Medium) => "Médio",
        (Language::Portuguese, BatteryStatus::Low) => "Baixo - Considere Carregar",
    }
}

pub fn charge_state_label(language: Language, state: ChargeState) -> &'static str {
    match (language, state) {
        (Language::English, ChargeState::Charging) => "⚡ Charging",
        (Language::English, ChargeState::Discharging) => "🔋 Discharging",
        (Language::English, ChargeState::Idle) => "⏸️ Idle",
        (Language::Portuguese, ChargeState::Charging) => "⚡ Carregando",
        (Language::Portuguese, ChargeState::Discharging) => "🔋 Descarregando",
        (Language::Portuguese, ChargeState::Idle) => "⏸️ Inativo",
    }
}

/// Static texts of the dashboard layout
#[derive(Debug, Clone, Copy)]
pub struct DashboardTexts {
    pub title: &'static str,
    pub solar: &'static str,
    pub grid: &'static str,
    pub consumption: &'static str,
}

pub fn dashboard_texts(language: Language) -> DashboardTexts {
    match language {
        Language::English => DashboardTexts {
            title: "Battery Status",
            solar: "☀️ Solar",
            grid: "🔌 Grid",
            consumption: "🏠 Consumption",
        },
        Language::Portuguese => DashboardTexts {
            title: "Status da Bateria",
            solar: "☀️ Solar",
            grid: "🔌 Rede",
            consumption: "🏠 Consumo",
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(percent: u8, battery_watts: i64) -> TelemetryRecord {
        TelemetryRecord {
            battery_percent: percent,
            battery_power_watts: battery_watts,
            ..TelemetryRecord::default()
        }
    }

    #[test]
    fn test_portuguese_report_with_charging_clause() {
        assert_eq!(
            battery_report(Language::Portuguese, &record(85, 120)),
            "A bateria da sua casa está em 85 por cento. Está carregando em 120 watts."
        );
    }

    #[test]
    fn test_discharging_clause_uses_magnitude() {
        assert_eq!(
            battery_report(Language::English, &record(40, -640)),
            "Your home battery is at 40 percent. It is discharging at 640 watts."
        );
        assert_eq!(
            battery_report(Language::Portuguese, &record(40, -51)),
            "A bateria da sua casa está em 40 por cento. Está descarregando em 51 watts."
        );
    }

    #[test]
    fn test_deadzone_has_no_clause() {
        for watts in [-50, -1, 0, 1, 50] {
            assert_eq!(
                battery_report(Language::English, &record(60, watts)),
                "Your home battery is at 60 percent."
            );
        }
    }

    #[test]
    fn test_grid_reading_direction() {
        assert_eq!(
            grid_reading(Language::English, 300),
            "You are drawing 300 watts from the grid."
        );
        assert_eq!(
            grid_reading(Language::Portuguese, -1200),
            "Você está enviando 1200 watts para a rede."
        );
        assert!(grid_reading(Language::English, 10).contains("barely"));
    }

    #[test]
    fn test_metric_reading() {
        let record = TelemetryRecord {
            solar_power_watts: 2300,
            consumption_power_watts: 700,
            ..record(90, 0)
        };
        assert_eq!(
            metric_reading(Language::English, PowerMetric::Solar, &record),
            "Your solar panels are producing 2300 watts."
        );
        assert_eq!(
            metric_reading(Language::Portuguese, PowerMetric::Consumption, &record),
            "Sua casa está consumindo 700 watts."
        );
        assert_eq!(
            metric_reading(Language::Portuguese, PowerMetric::Battery, &record),
            battery_report(Language::Portuguese, &record)
        );
    }

    #[test]
    fn test_apologies_are_distinct_per_kind() {
        for language in [Language::English, Language::Portuguese] {
            let texts = [
                apology(language, FailureKind::Auth),
                apology(language, FailureKind::Fetch),
                apology(language, FailureKind::Timeout),
                apology(language, FailureKind::Unexpected),
            ];
            for (i, a) in texts.iter().enumerate() {
                for b in &texts[i + 1..] {
                    assert_ne!(a, b);
                }
            }
        }
    }

    #[test]
    fn test_labels() {
        assert_eq!(
            status_label(Language::Portuguese, BatteryStatus::Low),
            "Baixo - Considere Carregar"
        );
        assert_eq!(
            charge_state_label(Language::English, ChargeState::Idle),
            "⏸️ Idle"
        );
        assert_eq!(dashboard_texts(Language::Portuguese).grid, "🔌 Rede");
    }
}
