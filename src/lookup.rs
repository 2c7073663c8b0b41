/*
 * This file is part of gettemp.
 *
 * Copyright (C) 2025 gettemp contributors
 *
 * gettemp is free software: you can redistribute it and/or modify
 * it under the terms of the GNU General Public License as published by
 * the Free Software Foundation, either version 3 of the License, or
 * (at your option) any later version.
 *
 * gettemp is distributed in the hope that it will be useful,
 * but WITHOUT ANY WARRANTY; without even the implied warranty of
 * MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
 * GNU General Public License for more details.
 *
 * You should have received a copy of the GNU General Public License
 * along with gettemp. If not, see <https://www.gnu.org/licenses/>.
 */

use std::io::Write;

use serde_json::json;
use thiserror::Error;

use crate::logger;
use crate::sensors::{AttrSource, Sensors, SensorsError};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LookupError {
    #[error("no detected chip with prefix {0:?}")]
    NoSuchChip(String),
    #[error("chip {chip:?} has no feature {feature:?}")]
    NoSuchFeature { chip: String, feature: String },
    #[error("feature {chip}.{feature} has no readable input")]
    NoReadableInput { chip: String, feature: String },
    #[error("err: {}", .0.status())]
    Retrieval(SensorsError),
}

impl LookupError {
    /// Not-found outcomes produce no console output.
    pub fn is_silent(&self) -> bool {
        !matches!(self, LookupError::Retrieval(_))
    }
}

/// Find the readable `<feature>_input` subfeature of `feature_name` on the
/// first chip whose prefix is `chip_prefix` and read it. Every chip with a
/// matching prefix is searched until one yields a value or a read error.
pub fn lookup<A: AttrSource>(
    sensors: &Sensors<A>,
    chip_prefix: &str,
    feature_name: &str,
) -> Result<f64, LookupError> {
    let input_name = format!("{}_input", feature_name);
    let mut chip_seen = false;
    let mut feature_seen = false;

    for chip in sensors.detected_chips().filter(|c| c.prefix() == chip_prefix) {
        chip_seen = true;
        for feature in chip.features().filter(|f| f.name == feature_name) {
            feature_seen = true;
            // An unreadable input is passed over, not reported
            if let Some(sub) = chip.subfeatures(feature).find(|s| s.name == input_name && s.is_readable()) {
                return sensors.get_value(chip, sub.number).map_err(LookupError::Retrieval);
            }
        }
    }

    let (chip, feature) = (chip_prefix.to_string(), feature_name.to_string());
    Err(if !chip_seen {
        LookupError::NoSuchChip(chip)
    } else if !feature_seen {
        LookupError::NoSuchFeature { chip, feature }
    } else {
        LookupError::NoReadableInput { chip, feature }
    })
}

/// Print a lookup outcome: the value on `out`, a retrieval error as
/// `err: <status>` on `err`, nothing for the not-found kinds. A failed write
/// (closed pipe) drops that line only.
pub fn report<O: Write, E: Write>(result: &Result<f64, LookupError>, out: &mut O, err: &mut E) {
    let _ = match result {
        Ok(value) => writeln!(out, "{}", value),
        Err(e) if e.is_silent() => Ok(()),
        Err(e) => writeln!(err, "{}", e),
    };
}

pub(crate) fn log_lookup(chip: &str, feature: &str, result: &Result<f64, LookupError>) {
    let data = match result {
        Ok(value) => json!({ "chip": chip, "feature": feature, "value": value }),
        Err(LookupError::Retrieval(e)) => json!({
            "chip": chip,
            "feature": feature,
            "status": e.status(),
            "error": e.to_string(),
        }),
        Err(e) => json!({ "chip": chip, "feature": feature, "not_found": e.to_string() }),
    };
    logger::log_event("lookup", data);
}
