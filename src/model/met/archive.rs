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

//! Archive backends.
//!
//! An archive publishes raw quantities on one or more grid/time
//! layouts and serves gridded snapshots of them. [`MerraArchive`] is a
//! self-contained backend with smooth analytic fields on a MERRA-style
//! catalog; it stands in for a remote data portal, so everything above
//! it (lookup fallback, caching, derivation recipes) runs without
//! network access.

use crate::errors::MetError;
use crate::model::met::gridfield::{GridField3D, GridFieldSfc};
use crate::model::met::lookup::GridPreference;
use crate::model::met::registry;
use crate::Float;
use chrono::{NaiveDateTime, Timelike};
use ndarray::{Array2, Array3};
use serde::{Deserialize, Serialize};

/// A published layout of one quantity, as returned by a catalog query.
///
/// The grid and time codes are small integers private to the archive
/// (e.g. vertical 2 = pressure levels, horizontal 0 = the native
/// resolution); `time_base` is minutes after midnight of the first
/// daily snapshot and `time_spacing` is hours between snapshots.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ArchiveMatch {
    pub vertical: i32,
    pub horizontal: i32,
    pub time_spacing: i32,
    pub time_averaging: i32,
    pub time_base: i32,
    /// Archive-side collection name the quantity is read from.
    pub locator: String,
    pub units: String,
    pub scale: Float,
    pub offset: Float,
    pub ndims: u8,
}

/// A met-data backend: a catalog plus snapshot readers.
pub trait MetArchive: Send + Sync {
    /// Short name identifying the archive, used in cache-file names.
    fn tag(&self) -> &str;

    /// Looks the quantity up in the catalog, returning the best
    /// published layout admitted by the preference, or `None`.
    fn query(
        &self,
        quantity: &str,
        date: NaiveDateTime,
        want: &GridPreference,
    ) -> Option<ArchiveMatch>;

    /// Reads one 3D snapshot on the given layout.
    fn read_3d(
        &self,
        quantity: &str,
        date: NaiveDateTime,
        layout: &ArchiveMatch,
    ) -> Result<GridField3D, MetError>;

    /// Reads one single-surface snapshot on the given layout.
    fn read_sfc(
        &self,
        quantity: &str,
        surface: &str,
        date: NaiveDateTime,
        layout: &ArchiveMatch,
    ) -> Result<GridFieldSfc, MetError>;
}

// vertical grid codes
pub(crate) const VGRID_SURFACE: i32 = 0;
const VGRID_PRESSURE: i32 = 2;
// horizontal grid codes
const HGRID_NATIVE: i32 = 0;
const HGRID_COARSE: i32 = 1;
// time-averaging codes
const TAVG_INSTANT: i32 = 0;
const TAVG_3HOUR: i32 = 3;

/// MERRA-style pressure levels, in hPa.
const PRESSURE_LEVELS: [Float; 37] = [
    1000.0, 975.0, 950.0, 925.0, 900.0, 875.0, 850.0, 825.0, 800.0, 775.0, 750.0, 725.0, 700.0,
    650.0, 600.0, 550.0, 500.0, 450.0, 400.0, 350.0, 300.0, 250.0, 200.0, 150.0, 100.0, 70.0,
    50.0, 40.0, 30.0, 20.0, 10.0, 7.0, 5.0, 4.0, 3.0, 2.0, 1.0,
];

/// Analytic archive on a MERRA-style catalog.
///
/// Catalog layout:
///
/// * `T` — pressure levels, native and coarse horizontal grids,
///   instantaneous 3-hourly snapshots on the hour, plus an hourly 2D
///   surface product;
/// * `U`, `V`, `OMEGA` — pressure levels, native grid only,
///   instantaneous 3-hourly;
/// * `DTDTTOT` — pressure levels, coarse grid only, 3-hour averages
///   stamped mid-interval (01:30, 04:30, ...), in K/day;
/// * `PS` — 2D, native grid, hourly.
///
/// The coarse-only temperature tendency forces the horizontal-grid
/// fallback (and field reconciliation) paths whenever the heating
/// rate is derived alongside native-grid temperatures.
pub struct MerraArchive {
    tag: String,
}

impl MerraArchive {
    pub fn new() -> Self {
        MerraArchive {
            tag: "merra".to_owned(),
        }
    }

    fn catalog(&self, quantity: &str) -> Vec<ArchiveMatch> {
        let inst3d = |horizontal: i32, locator: &str, units: &str, scale: Float| ArchiveMatch {
            vertical: VGRID_PRESSURE,
            horizontal,
            time_spacing: 3,
            time_averaging: TAVG_INSTANT,
            time_base: 0,
            locator: locator.to_owned(),
            units: units.to_owned(),
            scale,
            offset: 0.0,
            ndims: 3,
        };

        match registry::native(quantity) {
            registry::TEMPERATURE => vec![
                inst3d(HGRID_NATIVE, "inst3_3d_asm_Np", "K", 1.0),
                inst3d(HGRID_COARSE, "inst3_3d_asm_Nc", "K", 1.0),
                ArchiveMatch {
                    vertical: VGRID_SURFACE,
                    horizontal: HGRID_NATIVE,
                    time_spacing: 1,
                    time_averaging: TAVG_INSTANT,
                    time_base: 0,
                    locator: "inst1_2d_asm_Nx".to_owned(),
                    units: "K".to_owned(),
                    scale: 1.0,
                    offset: 0.0,
                    ndims: 2,
                },
            ],
            registry::EASTWARD_WIND | registry::NORTHWARD_WIND => {
                vec![inst3d(HGRID_NATIVE, "inst3_3d_asm_Np", "m/s", 1.0)]
            }
            registry::OMEGA => vec![inst3d(HGRID_NATIVE, "inst3_3d_asm_Np", "Pa/s", 1.0)],
            registry::T_TENDENCY => vec![ArchiveMatch {
                vertical: VGRID_PRESSURE,
                horizontal: HGRID_COARSE,
                time_spacing: 3,
                time_averaging: TAVG_3HOUR,
                time_base: 90,
                locator: "tavg3_3d_tdt_Nc".to_owned(),
                units: "K/day".to_owned(),
                scale: 1.0 / 86400.0,
                offset: 0.0,
                ndims: 3,
            }],
            registry::SURFACE_PRESSURE => vec![ArchiveMatch {
                vertical: VGRID_SURFACE,
                horizontal: HGRID_NATIVE,
                time_spacing: 1,
                time_averaging: TAVG_INSTANT,
                time_base: 0,
                locator: "inst1_2d_asm_Nx".to_owned(),
                units: "Pa".to_owned(),
                scale: 1.0,
                offset: 0.0,
                ndims: 2,
            }],
            _ => vec![],
        }
    }

    fn lats(horizontal: i32) -> Vec<Float> {
        let step: Float = if horizontal == HGRID_NATIVE { 2.0 } else { 4.0 };
        let n = (180.0 / step) as usize + 1;
        (0..n).map(|j| -90.0 + j as Float * step).collect()
    }

    fn lons(horizontal: i32) -> Vec<Float> {
        let step: Float = if horizontal == HGRID_NATIVE { 2.5 } else { 5.0 };
        let n = (360.0 / step) as usize;
        (0..n).map(|i| -180.0 + i as Float * step).collect()
    }

    /// Smooth analytic sample of a raw quantity, in the catalog's raw
    /// units. `z` is pressure altitude in km.
    fn sample(quantity: &str, z: Float, lat: Float, lon: Float, hours: Float) -> Float {
        let latr = lat.to_radians();
        let lonr = lon.to_radians();
        let diurnal = (hours / 24.0 * std::f64::consts::TAU).sin();

        match registry::native(quantity) {
            registry::TEMPERATURE => {
                215.0
                    + 75.0 * (-z / 8.0).exp()
                    + 10.0 * latr.cos() * (2.0 * lonr).cos() * (-z / 20.0).exp()
                    + 2.0 * diurnal
            }
            registry::EASTWARD_WIND => 40.0 * latr.cos() + 5.0 * (3.0 * lonr).sin(),
            registry::NORTHWARD_WIND => 5.0 * (2.0 * latr).sin() * lonr.cos(),
            registry::OMEGA => {
                0.05 * (3.0 * latr).sin() * (2.0 * lonr).cos() * (-((z - 8.0) / 6.0).powi(2)).exp()
            }
            // K/day raw units
            registry::T_TENDENCY => {
                1.5 * latr.cos() * (-((z - 2.0) / 10.0).powi(2)).exp() + 0.3 * diurnal
            }
            registry::SURFACE_PRESSURE => {
                101_325.0 - 800.0 * (2.0 * latr).sin().powi(2) + 150.0 * lonr.cos() * diurnal
            }
            _ => 0.0,
        }
    }
}

impl Default for MerraArchive {
    fn default() -> Self {
        MerraArchive::new()
    }
}

impl MetArchive for MerraArchive {
    fn tag(&self) -> &str {
        &self.tag
    }

    fn query(
        &self,
        quantity: &str,
        _date: NaiveDateTime,
        want: &GridPreference,
    ) -> Option<ArchiveMatch> {
        self.catalog(quantity).into_iter().find(|m| want.admits(m))
    }

    fn read_3d(
        &self,
        quantity: &str,
        date: NaiveDateTime,
        layout: &ArchiveMatch,
    ) -> Result<GridField3D, MetError> {
        if layout.ndims != 3 {
            return Err(MetError::BadInputQuantity);
        }

        let lats = MerraArchive::lats(layout.horizontal);
        let lons = MerraArchive::lons(layout.horizontal);
        let hours = date.num_seconds_from_midnight() as Float / 3600.0;

        let alts: Vec<Float> = PRESSURE_LEVELS
            .iter()
            .map(|p| crate::model::met::calc::std_atm_palt(p * 100.0))
            .collect::<Result<_, _>>()?;

        let data = Array3::from_shape_fn(
            (PRESSURE_LEVELS.len(), lats.len(), lons.len()),
            |(k, j, i)| MerraArchive::sample(quantity, alts[k], lats[j], lons[i], hours),
        );

        let mut field = GridField3D::new(
            registry::native(quantity),
            &layout.units,
            "P",
            "hPa",
            PRESSURE_LEVELS.to_vec(),
            lats,
            lons,
            data,
            date,
        );
        field.mks_scale = layout.scale;
        field.mks_offset = layout.offset;
        field.mks_vscale = 100.0;

        Ok(field)
    }

    fn read_sfc(
        &self,
        quantity: &str,
        surface: &str,
        date: NaiveDateTime,
        layout: &ArchiveMatch,
    ) -> Result<GridFieldSfc, MetError> {
        if layout.ndims != 2 {
            return Err(MetError::BadInputQuantity);
        }

        let lats = MerraArchive::lats(layout.horizontal);
        let lons = MerraArchive::lons(layout.horizontal);
        let hours = date.num_seconds_from_midnight() as Float / 3600.0;

        let data = Array2::from_shape_fn((lats.len(), lons.len()), |(j, i)| {
            MerraArchive::sample(quantity, 0.0, lats[j], lons[i], hours)
        });

        let mut field = GridFieldSfc::new(
            registry::native(quantity),
            &layout.units,
            surface,
            lats,
            lons,
            data,
            date,
        );
        field.mks_scale = layout.scale;
        field.mks_offset = layout.offset;

        Ok(field)
    }
}
