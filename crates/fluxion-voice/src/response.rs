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

//! Outbound Alexa response envelope

use crate::apl;
use crate::language::Language;
use crate::request::PowerMetric;
use crate::speech;
use fluxion_deye::{FailureKind, TelemetryRecord};
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const RESPONSE_VERSION: &str = "1.0";
const PLAIN_TEXT: &str = "PlainText";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponseEnvelope {
    pub version: String,
    pub response: ResponseBody,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseBody {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_speech: Option<OutputSpeech>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reprompt: Option<Reprompt>,
    pub should_end_session: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub directives: Vec<Value>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputSpeech {
    #[serde(rename = "type")]
    pub kind: String,
    pub text: String,
}

impl OutputSpeech {
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            kind: PLAIN_TEXT.to_owned(),
            text: text.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Reprompt {
    pub output_speech: OutputSpeech,
}

impl ResponseEnvelope {
    pub fn speech_text(&self) -> Option<&str> {
        self.response.output_speech.as_ref().map(|s| s.text.as_str())
    }

    pub fn should_end_session(&self) -> bool {
        self.response.should_end_session
    }

    pub fn has_directives(&self) -> bool {
        !self.response.directives.is_empty()
    }

    fn new(body: ResponseBody) -> Self {
        Self {
            version: RESPONSE_VERSION.to_owned(),
            response: body,
        }
    }
}

/// Result of a telemetry-backed request, ready to be rendered
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Full battery report
    Battery(TelemetryRecord),
    /// A single reading the user asked for
    Reading(PowerMetric, TelemetryRecord),
    Failure(FailureKind),
}

/// Renders outcomes and fixed phrases in one language
#[derive(Debug, Clone, Copy)]
pub struct ResponseBuilder {
    language: Language,
}

impl ResponseBuilder {
    pub fn new(language: Language) -> Self {
        Self { language }
    }

    pub fn language(&self) -> Language {
        self.language
    }

    /// Terminal answer for a telemetry outcome
    ///
    /// The dashboard directive is attached only for successful outcomes on devices
    /// with a display.
    pub fn build(&self, outcome: &Outcome, has_display: bool) -> ResponseEnvelope {
        let (text, record) = match outcome {
            Outcome::Battery(record) => (speech::battery_report(self.language, record), Some(record)),
            Outcome::Reading(metric, record) => (
                speech::metric_reading(self.language, *metric, record),
                Some(record),
            ),
            Outcome::Failure(kind) => (speech::apology(self.language, *kind).to_owned(), None),
        };

        let directives = match record {
            Some(record) if has_display => vec![apl::render_directive(record, self.language)],
            Some(_) | None => Vec::new(),
        };

        ResponseEnvelope::new(ResponseBody {
            output_speech: Some(OutputSpeech::plain(text)),
            reprompt: None,
            should_end_session: true,
            directives,
        })
    }

    /// Terminal answer with speech only
    pub fn say(&self, text: impl Into<String>) -> ResponseEnvelope {
        ResponseEnvelope::new(ResponseBody {
            output_speech: Some(OutputSpeech::plain(text)),
            reprompt: None,
            should_end_session: true,
            directives: Vec::new(),
        })
    }

    /// Question that keeps the session open for the user's answer
    pub fn ask(&self, text: impl Into<String>) -> ResponseEnvelope {
        let text = text.into();
        ResponseEnvelope::new(ResponseBody {
            output_speech: Some(OutputSpeech::plain(text.clone())),
            reprompt: Some(Reprompt {
                output_speech: OutputSpeech::plain(text),
            }),
            should_end_session: false,
            directives: Vec::new(),
        })
    }

    /// Acknowledgement without speech, for session end notifications
    pub fn empty(&self) -> ResponseEnvelope {
        ResponseEnvelope::new(ResponseBody {
            output_speech: None,
            reprompt: None,
            should_end_session: true,
            directives: Vec::new(),
        })
    }
}
