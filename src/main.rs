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

use std::io;

use anyhow::Context;
use serde_json::json;

use gettemp::cli;
use gettemp::config::Config;
use gettemp::logger;
use gettemp::sensors::Sensors;

fn main() -> anyhow::Result<()> {
    let code = run()?;
    // Sensors are released by now; exit skips destructors
    if code != cli::EXIT_OK {
        std::process::exit(code);
    }
    Ok(())
}

fn run() -> anyhow::Result<i32> {
    let args: Vec<String> = std::env::args_os()
        .skip(1)
        .map(|a| a.to_string_lossy().into_owned())
        .collect();

    let config = Config::from_env();
    if let Some(path) = &config.log_path {
        // Logging is best effort and must not change the command's output
        if logger::init_logging(path).is_ok() {
            logger::log_event(
                "startup",
                json!({
                    "config": serde_json::to_value(&config).unwrap_or_default(),
                    "args": args,
                }),
            );
        }
    }

    // Scan failures leave an empty table; only a second init is fatal
    let sensors = Sensors::init(&config.hwmon_root)
        .with_context(|| format!("failed to initialize sensors from {}", config.hwmon_root.display()))?;

    let stdout = io::stdout();
    let stderr = io::stderr();
    Ok(cli::run(&args, &sensors, &mut stdout.lock(), &mut stderr.lock()))
}
