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

//! Alexa skill for the home battery: request parsing, dispatch, spoken answers and
//! the APL dashboard.

pub mod apl;
pub mod language;
pub mod request;
pub mod response;
pub mod server;
pub mod skill;
pub mod speech;

pub use language::Language;
pub use request::{PowerMetric, RequestDescriptor, RequestError, RequestKind};
pub use response::{Outcome, ResponseBuilder, ResponseEnvelope};
pub use server::{router, serve};
pub use skill::BatterySkill;
