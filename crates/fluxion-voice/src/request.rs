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

//! Inbound Alexa request parsing
//!
//! Only the parts of the Alexa request JSON the skill acts on are modelled; every
//! other field is ignored.

use serde::Deserialize;
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};
use thiserror::Error;

/// Interface name announced by devices with a screen
pub const APL_INTERFACE: &str = "Alexa.Presentation.APL";

#[derive(Debug, Error)]
#[error("invalid Alexa request: {0}")]
pub struct RequestError(#[from] serde_json::Error);

#[derive(Debug, Clone, Deserialize)]
pub struct AlexaRequest {
    #[serde(default)]
    pub context: Option<AlexaContext>,
    pub request: AlexaRequestBody,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AlexaContext {
    #[serde(rename = "System", default)]
    pub system: Option<SystemContext>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SystemContext {
    #[serde(default)]
    pub device: Option<Device>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Device {
    /// An object keyed by interface name
    #[serde(default)]
    pub supported_interfaces: Value,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlexaRequestBody {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub request_id: Option<String>,
    #[serde(default)]
    pub locale: Option<String>,
    #[serde(default)]
    pub intent: Option<Intent>,
    #[serde(default)]
    pub reason: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Intent {
    pub name: String,
    #[serde(default)]
    pub slots: HashMap<String, Slot>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Slot {
    #[serde(default)]
    pub value: Option<String>,
}

/// What the user asked for
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestKind {
    Launch,
    /// Intent name with its filled slot values
    Intent {
        name: String,
        slots: BTreeMap<String, String>,
    },
    SessionEnded {
        reason: Option<String>,
    },
    /// Any request type the skill does not handle
    Other(String),
}

/// Parsed, transport-independent view of one voice request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestDescriptor {
    pub kind: RequestKind,
    /// Platform-assigned id, used to correlate log lines
    pub request_id: Option<String>,
    pub locale: Option<String>,
    pub has_display: bool,
}

impl RequestDescriptor {
    pub fn from_value(value: &Value) -> Result<Self, RequestError> {
        let request = AlexaRequest::deserialize(value)?;
        Ok(Self::from(request))
    }

    pub fn from_json(text: &str) -> Result<Self, RequestError> {
        let request: AlexaRequest = serde_json::from_str(text)?;
        Ok(Self::from(request))
    }

    pub fn slot(&self, name: &str) -> Option<&str> {
        match &self.kind {
            RequestKind::Intent { slots, .. } => slots.get(name).map(String::as_str),
            RequestKind::Launch | RequestKind::SessionEnded { .. } | RequestKind::Other(_) => None,
        }
    }
}

impl From<AlexaRequest> for RequestDescriptor {
    fn from(request: AlexaRequest) -> Self {
        let has_display = request
            .context
            .as_ref()
            .and_then(|c| c.system.as_ref())
            .and_then(|s| s.device.as_ref())
            .is_some_and(|d| supports_apl(&d.supported_interfaces));

        let body = request.request;
        let kind = match body.kind.as_str() {
            "LaunchRequest" => RequestKind::Launch,
            "IntentRequest" => match body.intent {
                Some(intent) => RequestKind::Intent {
                    name: intent.name,
                    slots: intent
                        .slots
                        .into_iter()
                        .filter_map(|(name, slot)| {
                            let value = slot.value?.trim().to_owned();
                            (!value.is_empty()).then_some((name, value))
                        })
                        .collect(),
                },
                None => RequestKind::Other(body.kind),
            },
            "SessionEndedRequest" => RequestKind::SessionEnded {
                reason: body.reason,
            },
            _ => RequestKind::Other(body.kind),
        };

        Self {
            kind,
            request_id: body.request_id,
            locale: body.locale,
            has_display,
        }
    }
}

/// Alexa sends an object keyed by interface name; a plain list is accepted as well
fn supports_apl(interfaces: &Value) -> bool {
    match interfaces {
        Value::Object(map) => map.contains_key(APL_INTERFACE),
        Value::Array(items) => items.iter().any(|item| item.as_str() == Some(APL_INTERFACE)),
        Value::Null | Value::Bool(_) | Value::Number(_) | Value::String(_) => false,
    }
}

/// Reading the user can ask for by name
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PowerMetric {
    Solar,
    Grid,
    Consumption,
    Battery,
}

impl PowerMetric {
    /// Slot value in English or Portuguese
    pub fn from_slot(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "solar" | "pv" | "sun" | "sol" | "painéis" => Some(Self::Solar),
            "grid" | "rede" | "network" => Some(Self::Grid),
            "consumption" | "load" | "usage" | "consumo" | "casa" => Some(Self::Consumption),
            "battery" | "bateria" => Some(Self::Battery),
            _ => None,
        }
    }
}
