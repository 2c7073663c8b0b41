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

use std::env;
use std::ffi::OsString;
use std::path::PathBuf;

use serde::Serialize;

pub const DEFAULT_HWMON_ROOT: &str = "/sys/class/hwmon";

/// Overrides the hwmon class directory that is scanned for chips
pub const HWMON_ROOT_VAR: &str = "GETTEMP_HWMON_ROOT";
/// File to append JSON event lines to; logging is off when unset
pub const LOG_PATH_VAR: &str = "GETTEMP_LOG";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Config {
    pub hwmon_root: PathBuf,
    pub log_path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self { hwmon_root: PathBuf::from(DEFAULT_HWMON_ROOT), log_path: None }
    }
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var_os(key))
    }

    /// Build from an arbitrary variable lookup. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<OsString>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.is_empty()).map(PathBuf::from);
        let defaults = Self::default();
        Self {
            hwmon_root: var(HWMON_ROOT_VAR).unwrap_or(defaults.hwmon_root),
            log_path: var(LOG_PATH_VAR),
        }
    }
}
