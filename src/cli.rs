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
use crate::lookup::{log_lookup, lookup, report};
use crate::sensors::{AttrSource, Sensors};

pub const EXIT_OK: i32 = 0;
pub const EXIT_MALFORMED_ARG: i32 = 1;

/// A `chip.feature` argument split at its first dot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Query<'a> {
    pub chip: &'a str,
    pub feature: &'a str,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CliError {
    #[error("No dot in arg {0}")]
    NoDot(String),
}

pub fn parse_query(arg: &str) -> Result<Query<'_>, CliError> {
    arg.split_once('.')
        .map(|(chip, feature)| Query { chip, feature })
        .ok_or_else(|| CliError::NoDot(arg.to_string()))
}

/// Look up and print each argument in order. The first argument without a
/// dot aborts the batch with `EXIT_MALFORMED_ARG`; later arguments are not
/// looked at. Lookups that find nothing leave the exit code alone, and so do
/// failed writes to `out` or `err`.
pub fn run<A, I, S, O, E>(args: I, sensors: &Sensors<A>, out: &mut O, err: &mut E) -> i32
where
    A: AttrSource,
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
    O: Write,
    E: Write,
{
    for arg in args {
        let arg = arg.as_ref();
        let query = match parse_query(arg) {
            Ok(q) => q,
            Err(e) => {
                let _ = writeln!(err, "gettemp error: {}", e);
                logger::log_event("malformed_arg", json!({ "arg": arg }));
                return EXIT_MALFORMED_ARG;
            }
        };
        let result = lookup(sensors, query.chip, query.feature);
        log_lookup(query.chip, query.feature, &result);
        report(&result, out, err);
    }
    let _ = out.flush();
    EXIT_OK
}
