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

use crate::language::Language;
use crate::request::{PowerMetric, RequestDescriptor, RequestError, RequestKind};
use crate::response::{Outcome, ResponseBuilder, ResponseEnvelope};
use crate::speech;
use fluxion_deye::TelemetrySource;
use serde_json::Value;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, error, info};

pub const GET_BATTERY_STATUS: &str = "GetBatteryStatus";
pub const GET_POWER_READING: &str = "GetPowerReading";
pub const METRIC_SLOT: &str = "metric";
pub const HELP_INTENT: &str = "AMAZON.HelpIntent";
pub const CANCEL_INTENT: &str = "AMAZON.CancelIntent";
pub const STOP_INTENT: &str = "AMAZON.StopIntent";
pub const FALLBACK_INTENT: &str = "AMAZON.FallbackIntent";

/// Routes voice requests to telemetry lookups and fixed answers
pub struct BatterySkill {
    source: Arc<dyn TelemetrySource>,
    default_language: Language,
}

impl fmt::Debug for BatterySkill {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BatterySkill")
            .field("default_language", &self.default_language)
            .finish_non_exhaustive()
    }
}

impl BatterySkill {
    pub fn new(source: Arc<dyn TelemetrySource>, default_language: Language) -> Self {
        Self {
            source,
            default_language,
        }
    }

    /// Parse a raw Alexa request and answer it
    pub async fn handle_value(&self, body: &Value) -> Result<ResponseEnvelope, RequestError> {
        let descriptor = RequestDescriptor::from_value(body)?;
        Ok(self.handle(&descriptor).await)
    }

    /// Answer one request; failures become spoken apologies, never errors
    pub async fn handle(&self, request: &RequestDescriptor) -> ResponseEnvelope {
        let language = Language::resolve(request.locale.as_deref(), self.default_language);
        let builder = ResponseBuilder::new(language);
        let id = request.request_id.as_deref().unwrap_or("-");

        match &request.kind {
            RequestKind::Launch => {
                info!("🎙️ [SKILL] Launch request [{}]", id);
                self.battery_status(&builder, request.has_display).await
            }
            RequestKind::Intent { name, .. } => {
                info!("🎙️ [SKILL] Intent: {} [{}]", name, id);
                self.dispatch_intent(name, request, &builder).await
            }
            RequestKind::SessionEnded { reason } => {
                debug!(
                    "Session ended: {} [{}]",
                    reason.as_deref().unwrap_or("unknown"),
                    id
                );
                builder.empty()
            }
            RequestKind::Other(kind) => {
                debug!("Unhandled request type: {} [{}]", kind, id);
                builder.say(speech::not_understood(language))
            }
        }
    }

    async fn dispatch_intent(
        &self,
        name: &str,
        request: &RequestDescriptor,
        builder: &ResponseBuilder,
    ) -> ResponseEnvelope {
        let language = builder.language();
        match name {
            GET_BATTERY_STATUS => self.battery_status(builder, request.has_display).await,
            GET_POWER_READING => {
                let Some(metric) = request.slot(METRIC_SLOT).and_then(PowerMetric::from_slot)
                else {
                    debug!("Power reading without a usable metric, asking the user");
                    return builder.ask(speech::ask_metric(language));
                };
                let outcome = match self.source.latest_telemetry().await {
                    Ok(record) => Outcome::Reading(metric, record),
                    Err(e) => {
                        error!("❌ [SKILL] Telemetry lookup failed ({}): {}", e.kind(), e);
                        Outcome::Failure(e.kind())
                    }
                };
                builder.build(&outcome, request.has_display)
            }
            HELP_INTENT => builder.say(speech::help(language)),
            CANCEL_INTENT | STOP_INTENT => builder.say(speech::goodbye(language)),
            FALLBACK_INTENT => builder.say(speech::not_understood(language)),
            other => {
                debug!("Unknown intent: {}", other);
                builder.say(speech::not_understood(language))
            }
        }
    }

    async fn battery_status(&self, builder: &ResponseBuilder, has_display: bool) -> ResponseEnvelope {
        let outcome = match self.source.latest_telemetry().await {
            Ok(record) => Outcome::Battery(record),
            Err(e) => {
                error!("❌ [SKILL] Telemetry lookup failed ({}): {}", e.kind(), e);
                Outcome::Failure(e.kind())
            }
        };
        builder.build(&outcome, has_display)
    }
}
