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

//! Sensor chip detection over the hwmon sysfs interface.
//!
//! `Sensors::init` scans the hwmon class directory once and keeps a detection
//! table of chips, their features (`temp1`, `fan2`, `in0`, ...) and each
//! feature's subfeatures (`temp1_input`, `temp1_max`, ...). Values are read
//! live from sysfs and scaled to base units the way libsensors does.

use std::fs;
use std::io::{self, Read};
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use lazy_static::lazy_static;
use serde_json::json;
use thiserror::Error;

use crate::logger;

/// Subfeature can be read.
pub const MODE_R: u32 = 0x1;
/// Subfeature can be written.
pub const MODE_W: u32 = 0x2;

lazy_static! {
    static ref INITIALIZED: Mutex<bool> = Mutex::new(false);
}

/// Status codes reported by value reads. Numbering and messages follow the
/// libsensors error table; callers see them negated via [`SensorsError::status`].
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SensorsError {
    #[error("No such subfeature known")]
    NoEntry = 2,
    #[error("Can't read")]
    AccessR = 3,
    #[error("Kernel interface error")]
    Kernel = 4,
    #[error("I/O error")]
    Io = 10,
}

impl SensorsError {
    pub fn code(self) -> i32 {
        self as i32
    }

    /// Negative status as returned by a failed read.
    pub fn status(self) -> i32 {
        -self.code()
    }
}

#[derive(Error, Debug)]
pub enum InitError {
    #[error("sensors already initialized")]
    AlreadyInitialized,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum FeatureType {
    In,
    Fan,
    Temp,
    Power,
    Energy,
    Curr,
    Humidity,
    Vid,
    Intrusion,
}

// "in" must come after "intrusion" so the longer prefix wins.
const TYPE_PREFIXES: [(&str, FeatureType); 9] = [
    ("intrusion", FeatureType::Intrusion),
    ("humidity", FeatureType::Humidity),
    ("energy", FeatureType::Energy),
    ("power", FeatureType::Power),
    ("curr", FeatureType::Curr),
    ("temp", FeatureType::Temp),
    ("fan", FeatureType::Fan),
    ("cpu", FeatureType::Vid),
    ("in", FeatureType::In),
];

const TEMP_SUFFIXES: &[&str] = &[
    "input", "max", "max_hyst", "min", "min_hyst", "lcrit", "lcrit_hyst", "crit", "crit_hyst",
    "emergency", "emergency_hyst", "lowest", "highest", "alarm", "min_alarm", "max_alarm",
    "lcrit_alarm", "crit_alarm", "emergency_alarm", "fault", "type", "offset", "beep",
];

const VOLTAGE_SUFFIXES: &[&str] = &[
    "input", "min", "max", "lcrit", "crit", "average", "lowest", "highest", "alarm", "min_alarm",
    "max_alarm", "lcrit_alarm", "crit_alarm", "beep",
];

const FAN_SUFFIXES: &[&str] = &[
    "input", "min", "max", "alarm", "min_alarm", "max_alarm", "fault", "div", "pulses", "beep",
];

const POWER_SUFFIXES: &[&str] = &[
    "average", "average_highest", "average_lowest", "average_interval", "input", "input_highest",
    "input_lowest", "cap", "cap_hyst", "cap_max", "cap_min", "max", "crit", "alarm", "cap_alarm",
    "max_alarm", "crit_alarm",
];

impl FeatureType {
    /// Known subfeature suffixes, in the order they are exposed.
    pub fn suffixes(self) -> &'static [&'static str] {
        match self {
            FeatureType::Temp => TEMP_SUFFIXES,
            FeatureType::In | FeatureType::Curr => VOLTAGE_SUFFIXES,
            FeatureType::Fan => FAN_SUFFIXES,
            FeatureType::Power => POWER_SUFFIXES,
            FeatureType::Energy | FeatureType::Humidity => &["input"],
            FeatureType::Vid => &["vid"],
            FeatureType::Intrusion => &["alarm", "beep"],
        }
    }

    /// Divisor turning the raw sysfs integer into base units.
    pub fn scaling(self, suffix: &str) -> f64 {
        if suffix.ends_with("alarm") || matches!(suffix, "fault" | "beep" | "type" | "div" | "pulses") {
            return 1.0;
        }
        match self {
            FeatureType::Fan | FeatureType::Intrusion => 1.0,
            FeatureType::Power | FeatureType::Energy if !suffix.ends_with("interval") => 1_000_000.0,
            _ => 1000.0,
        }
    }
}

/// Identity of a detected chip.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChipName {
    pub prefix: String,
    pub path: PathBuf,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Feature {
    pub name: String,
    pub number: usize,
    pub kind: FeatureType,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Subfeature {
    pub name: String,
    pub number: usize,
    /// Number of the owning feature.
    pub mapping: usize,
    pub flags: u32,
    scale: f64,
    path: PathBuf,
}

impl Subfeature {
    pub fn is_readable(&self) -> bool {
        self.flags & MODE_R != 0
    }

    pub fn is_writable(&self) -> bool {
        self.flags & MODE_W != 0
    }
}

/// Handle to one entry of the detection table.
#[derive(Debug, Clone)]
pub struct Chip {
    name: ChipName,
    features: Vec<Feature>,
    subfeatures: Vec<Subfeature>,
}

impl Chip {
    pub fn name(&self) -> &ChipName {
        &self.name
    }

    pub fn prefix(&self) -> &str {
        &self.name.prefix
    }

    pub fn features(&self) -> impl Iterator<Item = &Feature> + '_ {
        self.features.iter()
    }

    pub fn subfeatures(&self, feature: &Feature) -> impl Iterator<Item = &Subfeature> + '_ {
        let mapping = feature.number;
        self.subfeatures.iter().filter(move |s| s.mapping == mapping)
    }

    pub fn subfeature(&self, number: usize) -> Option<&Subfeature> {
        self.subfeatures.get(number)
    }
}

/// Source of raw attribute text.
#[cfg_attr(test, mockall::automock)]
pub trait AttrSource {
    fn read_attr(&self, path: &Path) -> io::Result<String>;
}

/// Reads attributes straight from sysfs.
#[derive(Debug, Default, Clone, Copy)]
pub struct SysfsAttrs;

impl AttrSource for SysfsAttrs {
    fn read_attr(&self, path: &Path) -> io::Result<String> {
        read_trimmed(path)
    }
}

/// Process-wide sensor state. At most one instance is alive at a time;
/// dropping it releases the detection table.
pub struct Sensors<A: AttrSource = SysfsAttrs> {
    root: PathBuf,
    chips: Vec<Chip>,
    source: A,
}

impl Sensors<SysfsAttrs> {
    pub fn init<P: AsRef<Path>>(root: P) -> Result<Self, InitError> {
        Self::with_source(root, SysfsAttrs)
    }
}

impl<A: AttrSource> Sensors<A> {
    pub fn with_source<P: AsRef<Path>>(root: P, source: A) -> Result<Self, InitError> {
        let root = root.as_ref().to_path_buf();
        let mut initialized = INITIALIZED.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        if *initialized {
            return Err(InitError::AlreadyInitialized);
        }
        // An unreadable root leaves the table empty, lookups then find nothing
        let chips = scan_chips(&root).unwrap_or_else(|e| {
            logger::log_event(
                "sensors_init_failed",
                json!({ "root": root.display().to_string(), "error": e.to_string() }),
            );
            Vec::new()
        });
        *initialized = true;

        logger::log_event(
            "sensors_init",
            json!({
                "root": root.display().to_string(),
                "chips": chips.iter().map(|c| c.prefix()).collect::<Vec<_>>(),
            }),
        );
        Ok(Self { root, chips, source })
    }

    pub fn detected_chips(&self) -> impl Iterator<Item = &Chip> + '_ {
        self.chips.iter()
    }

    /// Read and scale the current value of subfeature `number` on `chip`.
    pub fn get_value(&self, chip: &Chip, number: usize) -> Result<f64, SensorsError> {
        let sub = chip.subfeature(number).ok_or(SensorsError::NoEntry)?;
        if !sub.is_readable() {
            return Err(SensorsError::AccessR);
        }
        let raw = self.source.read_attr(&sub.path).map_err(|e| match e.raw_os_error() {
            Some(libc::EIO) => SensorsError::Io,
            _ => SensorsError::Kernel,
        })?;
        let value: f64 = raw.trim().parse().map_err(|_| SensorsError::AccessR)?;
        Ok(value / sub.scale)
    }
}

impl<A: AttrSource> Drop for Sensors<A> {
    fn drop(&mut self) {
        self.chips.clear();
        match INITIALIZED.lock() {
            Ok(mut guard) => *guard = false,
            Err(poisoned) => *poisoned.into_inner() = false,
        }
        logger::log_event("sensors_cleanup", json!({ "root": self.root.display().to_string() }));
    }
}

fn scan_chips(root: &Path) -> io::Result<Vec<Chip>> {
    let entries = match fs::read_dir(root) {
        Ok(it) => it,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(e),
    };

    let mut dirs: Vec<PathBuf> = entries.flatten().map(|e| e.path()).collect();
    dirs.sort_by_key(|p| hwmon_sort_key(p));

    let mut chips = Vec::new();
    for path in dirs {
        if !path.is_dir() {
            continue;
        }
        // Resolve to the actual device dir in case of symlink
        let dir = fs::canonicalize(&path).unwrap_or(path);
        let Some(prefix) = read_chip_prefix(&dir) else { continue };

        // Older drivers keep their attributes under device/
        let chip = read_chip(&dir, &prefix).or_else(|| read_chip(&dir.join("device"), &prefix));
        if let Some(chip) = chip {
            chips.push(chip);
        }
    }
    Ok(chips)
}

fn hwmon_sort_key(path: &Path) -> (usize, String) {
    let tag = path.file_name().and_then(|s| s.to_str()).unwrap_or("").to_string();
    (extract_index(&tag, "hwmon", "").unwrap_or(usize::MAX), tag)
}

fn read_chip_prefix(dir: &Path) -> Option<String> {
    [dir.join("name"), dir.join("device").join("name")]
        .iter()
        .filter_map(|p| read_trimmed(p).ok())
        .find(|name| !name.is_empty())
}

struct Attr {
    kind: FeatureType,
    index: usize,
    order: usize,
    feature: String,
    name: String,
    flags: u32,
}

fn read_chip(dir: &Path, prefix: &str) -> Option<Chip> {
    let mut attrs: Vec<Attr> = Vec::new();
    for file in fs::read_dir(dir).ok()?.flatten() {
        let fname = file.file_name();
        let fname = fname.to_string_lossy();
        let Some((kind, index, order)) = parse_attr_name(&fname) else { continue };
        let Ok(meta) = fs::metadata(file.path()) else { continue };
        if !meta.is_file() {
            continue;
        }
        let feature = fname.split_once('_').map(|(f, _)| f).unwrap_or(&fname[..]).to_string();
        attrs.push(Attr {
            kind,
            index,
            order,
            feature,
            name: fname.into_owned(),
            flags: mode_flags(meta.permissions().mode()),
        });
    }
    if attrs.is_empty() {
        return None;
    }
    // Name in the key keeps spellings like temp01 and temp1 from interleaving
    attrs.sort_by(|a, b| (a.kind, a.index, &a.feature, a.order).cmp(&(b.kind, b.index, &b.feature, b.order)));

    let mut features: Vec<Feature> = Vec::new();
    let mut subfeatures: Vec<Subfeature> = Vec::new();
    for attr in attrs {
        if features.last().map_or(true, |f| f.name != attr.feature) {
            features.push(Feature { name: attr.feature.clone(), number: features.len(), kind: attr.kind });
        }
        let suffix = attr.kind.suffixes()[attr.order];
        subfeatures.push(Subfeature {
            number: subfeatures.len(),
            mapping: features.len() - 1,
            flags: attr.flags,
            scale: attr.kind.scaling(suffix),
            path: dir.join(&attr.name),
            name: attr.name,
        });
    }

    Some(Chip {
        name: ChipName { prefix: prefix.to_string(), path: dir.to_path_buf() },
        features,
        subfeatures,
    })
}

/// Split an attribute file name like `temp1_max_hyst` into its feature type,
/// feature index and position of the suffix in the type's suffix table.
pub fn parse_attr_name(fname: &str) -> Option<(FeatureType, usize, usize)> {
    let (feature, suffix) = fname.split_once('_')?;
    let &(prefix, kind) = TYPE_PREFIXES.iter().find(|(p, _)| feature.starts_with(p))?;
    let index = extract_index(feature, prefix, "")?;
    let order = kind.suffixes().iter().position(|s| *s == suffix)?;
    Some((kind, index, order))
}

fn mode_flags(mode: u32) -> u32 {
    let mut flags = 0;
    if mode & (libc::S_IRUSR as u32) != 0 {
        flags |= MODE_R;
    }
    if mode & (libc::S_IWUSR as u32) != 0 {
        flags |= MODE_W;
    }
    flags
}

fn read_trimmed<P: AsRef<Path>>(p: P) -> io::Result<String> {
    let mut s = String::new();
    fs::File::open(p)?.read_to_string(&mut s)?;
    Ok(s.trim().to_string())
}

pub fn extract_index(fname: &str, prefix: &str, suffix: &str) -> Option<usize> {
    if fname.len() >= prefix.len() + suffix.len() && fname.starts_with(prefix) && fname.ends_with(suffix) {
        let mid = &fname[prefix.len()..fname.len() - suffix.len()];
        mid.parse().ok()
    } else {
        None
    }
}
