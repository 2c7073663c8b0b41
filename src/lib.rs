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

//! gettemp - print hwmon sensor readings
//!
//! Each `chip.feature` argument selects the `<feature>_input` reading of the
//! first detected chip with that name, e.g. `coretemp.temp1`.

pub mod sensors;
pub mod lookup;
pub mod cli;
pub mod config;
pub mod logger;

#[cfg(test)]
pub mod test_utils;
