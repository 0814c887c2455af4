/*
Copyright 2026 gridtraj developers

This file is part of gridtraj.

gridtraj is a free software: you can redistribute it and/or modify
it under the terms of the GNU General Public License as published by
the Free Software Foundation; either version 3 of the License, or
(at your option) any later version.

gridtraj is distributed in the hope that it will be useful,
but WITHOUT ANY WARRANTY; without even the implied warranty of
MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
GNU General Public License for more details.

You should have received a copy of the GNU General Public License
along with gridtraj. If not, see https://www.gnu.org/licenses/.
*/

//! Module responsible for parsing and checking the configuration file.
//!
//! The configuration file uses
//! [YAML](https://en.wikipedia.org/wiki/YAML) and `serde` to enforce
//! strong typing and automatic type checking.
//!
//! The structures and their fields in this module directly correspond
//! to the fields inside `config.yaml` so you can check this
//! documentation for more details how to set the config file.

use crate::errors::ConfigError;
use crate::model::met::Strictness;
use chrono::NaiveDateTime;
use serde::Deserialize;
use std::{fs, path::Path, path::PathBuf};

/// Fields with information about the time period to fill.
#[derive(Clone, PartialEq, PartialOrd, Debug, Deserialize)]
pub struct DateTime {
    /// First datetime of the period. Snapshots are filled from the
    /// first archive snapshot at or after this time.
    pub start: NaiveDateTime,

    /// Last datetime of the period (inclusive).
    pub end: NaiveDateTime,
}

impl DateTime {
    /// Checks if the period is well-ordered.
    pub fn check_bounds(&self) -> Result<(), ConfigError> {
        if self.end < self.start {
            return Err(ConfigError::OutOfBounds(
                "End datetime cannot be before start datetime",
            ));
        }

        Ok(())
    }
}

/// Fields describing what met data to fetch and how.
#[derive(Clone, PartialEq, Debug, Deserialize)]
pub struct Met {
    /// List of quantities to fill the cache with. Derived quantities
    /// (e.g. `Theta`, `ThetaDot`) are allowed; a `@sfc` suffix selects
    /// the 2D surface reader (e.g. `PS@sfc`).
    pub quantities: Vec<String>,

    /// Directory of the met-data disk cache. Snapshot files are laid
    /// out in year/month/day subdirectories beneath it.
    pub cache_dir: PathBuf,

    /// _(Optional)_ Lifetime of cached snapshots in hours; entries
    /// older than this are refetched. Unset entries never go stale.
    #[serde(default)]
    pub cache_lifetime: Option<i64>,

    /// _(Optional)_ Vertical coordinate system to serve 3D fields on.
    /// Only pressure levels (`P`) are supported; the name is checked
    /// before any fetching starts.
    #[serde(default = "Met::default_vertical")]
    pub vertical: String,

    /// _(Optional)_ Which grid/time dimensions may never fall back to
    /// another published layout when the preferred one is missing.
    /// All default to `false` (fallback allowed).
    #[serde(default)]
    pub strictness: Strictness,

    /// _(Optional)_ Preferred archive layout codes; unset dimensions
    /// are don't-cares.
    #[serde(default)]
    pub preference: Preference,

    /// _(Optional)_ Horizontal thinning factor: keep every n-th
    /// latitude and longitude of each snapshot.
    ///
    /// Cannot be `0`. Defaults to `1` (no thinning).
    #[serde(default = "Met::default_thin")]
    pub thin: usize,

    /// _(Optional)_ Longitude offset of the first thinned point.
    /// Defaults to `0`.
    #[serde(default)]
    pub thin_offset: usize,

    /// _(Optional)_ Override of the archive snapshot time base, in
    /// minutes after midnight.
    #[serde(default)]
    pub time_base: Option<i32>,

    /// _(Optional)_ Override of the archive snapshot spacing, in
    /// hours.
    #[serde(default)]
    pub time_spacing: Option<i32>,
}

impl Met {
    fn default_thin() -> usize {
        1
    }

    fn default_vertical() -> String {
        "P".to_owned()
    }

    /// Checks if the met specification follows conventions and limits.
    pub fn check_bounds(&self) -> Result<(), ConfigError> {
        if self.quantities.is_empty() {
            return Err(ConfigError::OutOfBounds(
                "At least one quantity must be listed",
            ));
        }

        if self.thin < 1 {
            return Err(ConfigError::OutOfBounds(
                "Thinning factor cannot be less than 1",
            ));
        }

        if let Some(spacing) = self.time_spacing {
            if spacing < 1 {
                return Err(ConfigError::OutOfBounds(
                    "Snapshot spacing override cannot be less than 1 hour",
                ));
            }
        }

        Ok(())
    }
}

/// _(Optional)_ Preferred archive layout, one code per dimension.
/// The codes are archive-specific small integers; leave a dimension
/// out to accept whatever the archive publishes there.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default, Deserialize)]
#[serde(default)]
pub struct Preference {
    pub vertical: Option<i32>,
    pub horizontal: Option<i32>,
    pub time_spacing: Option<i32>,
    pub time_averaging: Option<i32>,
}

/// _(Optional)_ Fields with information about
/// resources available for the filler.
#[derive(Clone, PartialEq, PartialOrd, Debug, Deserialize)]
pub struct Resources {
    /// _(Optional)_ Thread count used by the filler. The thread pool
    /// will use up to this number of workers, each fetching one
    /// snapshot at a time.
    ///
    /// Cannot be less than `1`. Defaults to `1`.
    #[serde(default = "Resources::default_threads")]
    pub threads: u16,

    /// _(Optional)_ Heap memory limit in MB, for meaningful
    /// out-of-memory error messages instead of a silent kill.
    ///
    /// Cannot be less than `128`. Defaults to the whole addressable
    /// space.
    #[serde(default = "Resources::default_memory")]
    pub memory: usize,
}

impl Resources {
    fn default_threads() -> u16 {
        1
    }

    fn default_memory() -> usize {
        usize::MAX / (1024 * 1024)
    }

    /// Checks if thread count and memory limit are above limits.
    pub fn check_bounds(&self) -> Result<(), ConfigError> {
        if self.threads < 1 {
            return Err(ConfigError::OutOfBounds(
                "Available threads cannot be less than 1",
            ));
        }

        if self.memory < 128 {
            return Err(ConfigError::OutOfBounds(
                "Available memory cannot be less than 128 MB",
            ));
        }

        Ok(())
    }
}

impl Default for Resources {
    fn default() -> Self {
        Resources {
            threads: Resources::default_threads(),
            memory: Resources::default_memory(),
        }
    }
}

/// Main config structure representing the fields in
/// the configuration file.
#[derive(Clone, PartialEq, Debug, Deserialize)]
pub struct Config {
    pub datetime: DateTime,

    pub met: Met,

    #[serde(default)]
    pub resources: Resources,
}

impl Config {
    /// Config structure constructor, responsible for
    /// deserializing configuration and checking it.
    pub fn new_from_file(file_path: &Path) -> Result<Config, ConfigError> {
        let data = fs::read(file_path)?;
        let config: Config = serde_yaml::from_slice(data.as_slice())?;

        config.datetime.check_bounds()?;
        config.met.check_bounds()?;
        config.resources.check_bounds()?;

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(yaml: &str) -> Config {
        serde_yaml::from_str(yaml).unwrap()
    }

    const MINIMAL: &str = "
datetime:
  start: 2021-07-15T00:00:00
  end: 2021-07-16T00:00:00
met:
  quantities: [T, Theta, PS@sfc]
  cache_dir: /tmp/met-cache
";

    #[test]
    fn minimal_configuration_gets_defaults() {
        let config = parse(MINIMAL);

        assert_eq!(config.met.quantities.len(), 3);
        assert_eq!(config.met.thin, 1);
        assert_eq!(config.met.vertical, "P");
        assert_eq!(config.met.cache_lifetime, None);
        assert_eq!(config.met.preference, Preference::default());
        assert_eq!(config.met.strictness, Strictness::default());
        assert_eq!(config.resources.threads, 1);

        assert!(config.datetime.check_bounds().is_ok());
        assert!(config.met.check_bounds().is_ok());
        assert!(config.resources.check_bounds().is_ok());
    }

    #[test]
    fn full_configuration_round_trips() {
        let config = parse(
            "
datetime:
  start: 2021-07-15T00:00:00
  end: 2021-07-15T12:00:00
met:
  quantities: [ThetaDot]
  cache_dir: ./cache
  strictness:
    horizontal: true
  preference:
    horizontal: 0
    vertical: 2
  thin: 2
  thin_offset: 1
  time_spacing: 6
resources:
  threads: 8
  memory: 2048
",
        );

        assert!(config.met.strictness.horizontal);
        assert!(!config.met.strictness.vertical);
        assert_eq!(config.met.preference.horizontal, Some(0));
        assert_eq!(config.met.preference.time_spacing, None);
        assert_eq!(config.met.thin, 2);
        assert_eq!(config.met.time_spacing, Some(6));
        assert_eq!(config.met.time_base, None);
        assert_eq!(config.resources.threads, 8);
    }

    #[test]
    fn inverted_period_is_rejected() {
        let config = parse(
            "
datetime:
  start: 2021-07-16T00:00:00
  end: 2021-07-15T00:00:00
met:
  quantities: [T]
  cache_dir: ./cache
",
        );

        assert!(config.datetime.check_bounds().is_err());
    }

    #[test]
    fn empty_quantity_list_is_rejected() {
        let config = parse(
            "
datetime:
  start: 2021-07-15T00:00:00
  end: 2021-07-16T00:00:00
met:
  quantities: []
  cache_dir: ./cache
",
        );

        assert!(config.met.check_bounds().is_err());
    }
}
