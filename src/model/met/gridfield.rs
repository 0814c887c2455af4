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

//! Gridded met field containers.
//!
//! A field carries, besides its samples, everything the derived-field
//! calculators need to interpret them: the physical quantity name, the
//! raw-units-to-MKS affine transform, the vertical coordinate identity
//! (with its own affine transform for 3D fields), and the fill value
//! marking missing samples.

use crate::errors::MetError;
use crate::Float;
use chrono::NaiveDateTime;
use ndarray::{Array2, Array3, Axis, Zip};
use serde::{Deserialize, Serialize};

/// A 3D (level x lat x lon) gridded field.
///
/// Data layout is `(level, lat, lon)`; vertical profiles are the lanes
/// along `Axis(0)`. A sample in raw units converts to MKS as
/// `value * mks_scale + mks_offset`; the level values convert with the
/// `mks_vscale`/`mks_voffset` pair.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GridField3D {
    pub quantity: String,
    pub units: String,
    pub mks_scale: Float,
    pub mks_offset: Float,

    /// Name of the vertical coordinate system of the level axis.
    pub vertical: String,
    pub vunits: String,
    pub mks_vscale: Float,
    pub mks_voffset: Float,

    /// Sentinel marking missing or invalid samples.
    pub fillval: Float,

    levels: Vec<Float>,
    lats: Vec<Float>,
    lons: Vec<Float>,

    pub data: Array3<Float>,

    /// Timestamp of validity of the data.
    pub met_time: NaiveDateTime,
    /// Cache-expiration horizon; `None` means the data never go stale.
    pub expires: Option<NaiveDateTime>,
}

impl GridField3D {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        quantity: &str,
        units: &str,
        vertical: &str,
        vunits: &str,
        levels: Vec<Float>,
        lats: Vec<Float>,
        lons: Vec<Float>,
        data: Array3<Float>,
        met_time: NaiveDateTime,
    ) -> Self {
        debug_assert_eq!(data.dim(), (levels.len(), lats.len(), lons.len()));

        GridField3D {
            quantity: quantity.to_owned(),
            units: units.to_owned(),
            mks_scale: 1.0,
            mks_offset: 0.0,
            vertical: vertical.to_owned(),
            vunits: vunits.to_owned(),
            mks_vscale: 1.0,
            mks_voffset: 0.0,
            fillval: 1.0e15,
            levels,
            lats,
            lons,
            data,
            met_time,
            expires: None,
        }
    }

    /// Ordered vertical-level values, in raw vertical units.
    pub fn levels(&self) -> &[Float] {
        &self.levels
    }

    /// Vertical-level values converted to MKS.
    pub fn levels_mks(&self) -> Vec<Float> {
        self.levels
            .iter()
            .map(|z| z * self.mks_vscale + self.mks_voffset)
            .collect()
    }

    pub fn lats(&self) -> &[Float] {
        &self.lats
    }

    pub fn lons(&self) -> &[Float] {
        &self.lons
    }

    /// Checks whether two fields share the same horizontal and
    /// vertical grid layout, a precondition for any point-wise
    /// combination of them.
    pub fn compatible(&self, other: &GridField3D) -> bool {
        self.levels == other.levels && self.lats == other.lats && self.lons == other.lons
    }

    /// Clones the grid shape of this field under a new physical
    /// identity. Calculators use input 1 as the base of their output.
    pub fn with_identity(&self, quantity: &str, units: &str, scale: Float, offset: Float) -> Self {
        let mut out = self.clone();
        out.quantity = quantity.to_owned();
        out.units = units.to_owned();
        out.mks_scale = scale;
        out.mks_offset = offset;
        out
    }

    /// Builds a field whose data values are the vertical coordinate
    /// values themselves (e.g. pressure, for a field on pressure
    /// surfaces).
    pub fn generate_vertical(&self) -> Self {
        let mut out = self.clone();
        out.quantity = self.vertical.clone();
        out.units = self.vunits.clone();
        out.mks_scale = self.mks_vscale;
        out.mks_offset = self.mks_voffset;

        for (k, level) in self.levels.iter().enumerate() {
            out.data.index_axis_mut(Axis(0), k).fill(*level);
        }

        out
    }

    /// Subsamples the horizontal grid, keeping every `skip`-th
    /// latitude and longitude; `offset` shifts the first kept
    /// longitude. A `skip` of 0 or 1 keeps the field as is.
    pub fn thin(&self, skip: usize, offset: usize) -> Self {
        if skip <= 1 {
            return self.clone();
        }

        let jsel: Vec<usize> = (0..self.lats.len()).step_by(skip).collect();
        let isel: Vec<usize> = (offset.min(self.lons.len())..self.lons.len())
            .step_by(skip)
            .collect();

        let mut out = self.clone();
        out.lats = jsel.iter().map(|j| self.lats[*j]).collect();
        out.lons = isel.iter().map(|i| self.lons[*i]).collect();
        out.data = Array3::from_shape_fn(
            (self.levels.len(), jsel.len(), isel.len()),
            |(k, j, i)| self.data[[k, jsel[j], isel[i]]],
        );

        out
    }

    /// Re-expresses the raw samples in new units, preserving their
    /// MKS meaning. Fill samples are left untouched.
    pub fn transform(&mut self, units: &str, scale: Float, offset: Float) {
        let (old_scale, old_offset) = (self.mks_scale, self.mks_offset);
        let fill = self.fillval;

        self.data.mapv_inplace(|v| {
            if v == fill {
                v
            } else {
                (v * old_scale + old_offset - offset) / scale
            }
        });

        self.units = units.to_owned();
        self.mks_scale = scale;
        self.mks_offset = offset;
    }
}

/// A 2D gridded field evaluated on a single surface.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GridFieldSfc {
    pub quantity: String,
    pub units: String,
    pub mks_scale: Float,
    pub mks_offset: Float,

    /// Name of the surface the field is evaluated on (e.g. "sfc").
    pub surface: String,

    pub fillval: Float,

    lats: Vec<Float>,
    lons: Vec<Float>,

    pub data: Array2<Float>,

    pub met_time: NaiveDateTime,
    pub expires: Option<NaiveDateTime>,
}

impl GridFieldSfc {
    pub fn new(
        quantity: &str,
        units: &str,
        surface: &str,
        lats: Vec<Float>,
        lons: Vec<Float>,
        data: Array2<Float>,
        met_time: NaiveDateTime,
    ) -> Self {
        debug_assert_eq!(data.dim(), (lats.len(), lons.len()));

        GridFieldSfc {
            quantity: quantity.to_owned(),
            units: units.to_owned(),
            mks_scale: 1.0,
            mks_offset: 0.0,
            surface: surface.to_owned(),
            fillval: 1.0e15,
            lats,
            lons,
            data,
            met_time,
            expires: None,
        }
    }

    pub fn lats(&self) -> &[Float] {
        &self.lats
    }

    pub fn lons(&self) -> &[Float] {
        &self.lons
    }

    pub fn compatible(&self, other: &GridFieldSfc) -> bool {
        self.lats == other.lats && self.lons == other.lons
    }

    pub fn with_identity(&self, quantity: &str, units: &str, scale: Float, offset: Float) -> Self {
        let mut out = self.clone();
        out.quantity = quantity.to_owned();
        out.units = units.to_owned();
        out.mks_scale = scale;
        out.mks_offset = offset;
        out
    }

    pub fn transform(&mut self, units: &str, scale: Float, offset: Float) {
        let (old_scale, old_offset) = (self.mks_scale, self.mks_offset);
        let fill = self.fillval;

        self.data.mapv_inplace(|v| {
            if v == fill {
                v
            } else {
                (v * old_scale + old_offset - offset) / scale
            }
        });

        self.units = units.to_owned();
        self.mks_scale = scale;
        self.mks_offset = offset;
    }

    /// Surface counterpart of [`GridField3D::thin`].
    pub fn thin(&self, skip: usize, offset: usize) -> Self {
        if skip <= 1 {
            return self.clone();
        }

        let jsel: Vec<usize> = (0..self.lats.len()).step_by(skip).collect();
        let isel: Vec<usize> = (offset.min(self.lons.len())..self.lons.len())
            .step_by(skip)
            .collect();

        let mut out = self.clone();
        out.lats = jsel.iter().map(|j| self.lats[*j]).collect();
        out.lons = isel.iter().map(|i| self.lons[*i]).collect();
        out.data =
            Array2::from_shape_fn((jsel.len(), isel.len()), |(j, i)| {
                self.data[[jsel[j], isel[i]]]
            });

        out
    }
}

/// Regrids `src` horizontally onto the lat/lon layout of `target`
/// by bilinear interpolation, keeping `src`'s physical identity.
///
/// Both fields must share the same level axis. The longitude axis is
/// periodic with period 360, so target points east of `src`'s last
/// column interpolate across the seam back to its first column;
/// latitudes of `target` lying outside `src`'s coverage become fill.
/// Used by the data-source facade when dependency fields arrive on
/// mismatched horizontal grids (e.g. a heating-rate product published
/// on a coarser grid than the temperatures).
pub fn reconcile(src: &GridField3D, target: &GridField3D) -> Result<GridField3D, MetError> {
    if src.levels != target.levels {
        return Err(MetError::BadGrid);
    }

    let mut out = src.clone();
    out.lats = target.lats.clone();
    out.lons = target.lons.clone();
    out.data = Array3::from_elem(
        (src.levels.len(), target.lats.len(), target.lons.len()),
        src.fillval,
    );

    // precompute per-axis bracketing indices and weights
    let lat_w: Vec<Option<(usize, Float)>> = target
        .lats
        .iter()
        .map(|lat| axis_weight(&src.lats, *lat))
        .collect();
    let lon_w: Vec<Option<(usize, Float)>> = target
        .lons
        .iter()
        .map(|lon| lon_weight(&src.lons, *lon))
        .collect();

    let nlon = src.lons.len();

    for k in 0..src.levels.len() {
        let plane = src.data.index_axis(Axis(0), k);
        let mut oplane = out.data.index_axis_mut(Axis(0), k);

        Zip::indexed(&mut oplane).for_each(|(j, i), dest| {
            if let (Some((j0, wj)), Some((i0, wi))) = (lat_w[j], lon_w[i]) {
                // the seam interval's upper neighbour is column 0
                let i1 = (i0 + 1) % nlon;
                let corners = [
                    plane[[j0, i0]],
                    plane[[j0, i1]],
                    plane[[j0 + 1, i0]],
                    plane[[j0 + 1, i1]],
                ];

                if corners.iter().all(|c| *c != src.fillval) {
                    *dest = corners[0] * (1.0 - wj) * (1.0 - wi)
                        + corners[1] * (1.0 - wj) * wi
                        + corners[2] * wj * (1.0 - wi)
                        + corners[3] * wj * wi;
                }
            }
        });
    }

    Ok(out)
}

/// Finds the interval of a sorted ascending coordinate axis that
/// contains `x`, returning the lower index and the linear weight of
/// the upper neighbour.
fn axis_weight(axis: &[Float], x: Float) -> Option<(usize, Float)> {
    if axis.len() < 2 {
        return None;
    }

    let first = *axis.first().unwrap();
    let last = *axis.last().unwrap();
    if x < first || x > last {
        return None;
    }

    let idx = match axis.iter().position(|a| *a > x) {
        Some(i) => i - 1,
        // x equals the last coordinate
        None => axis.len() - 2,
    };

    let w = (x - axis[idx]) / (axis[idx + 1] - axis[idx]);
    Some((idx, w))
}

/// Longitude variant of [`axis_weight`]. Longitudes repeat every 360
/// degrees, so a value past the last grid column falls in the seam
/// interval between the last and first columns; the returned lower
/// index is then the last column's.
fn lon_weight(axis: &[Float], x: Float) -> Option<(usize, Float)> {
    if axis.len() < 2 {
        return None;
    }

    let first = axis[0];
    let last = *axis.last().unwrap();

    let mut lon = x;
    while lon < first {
        lon += 360.0;
    }
    while lon >= first + 360.0 {
        lon -= 360.0;
    }

    if lon > last {
        let w = (lon - last) / (first + 360.0 - last);
        return Some((axis.len() - 1, w));
    }

    axis_weight(axis, lon)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use float_cmp::approx_eq;
    use ndarray::Array3;

    fn sample_time() -> NaiveDateTime {
        NaiveDate::from_ymd(2021, 7, 15).and_hms(12, 0, 0)
    }

    fn sample_field(lats: Vec<Float>, lons: Vec<Float>) -> GridField3D {
        let data = Array3::from_elem((2, lats.len(), lons.len()), 1.5);
        GridField3D::new(
            "T",
            "K",
            "P",
            "hPa",
            vec![500.0, 100.0],
            lats,
            lons,
            data,
            sample_time(),
        )
    }

    #[test]
    fn compatibility_requires_identical_axes() {
        let a = sample_field(vec![0.0, 10.0], vec![0.0, 10.0, 20.0]);
        let b = sample_field(vec![0.0, 10.0], vec![0.0, 10.0, 20.0]);
        let c = sample_field(vec![0.0, 20.0], vec![0.0, 10.0, 20.0]);

        assert!(a.compatible(&b));
        assert!(!a.compatible(&c));
    }

    #[test]
    fn transform_preserves_mks_meaning() {
        let mut f = sample_field(vec![0.0, 10.0], vec![0.0, 10.0]);
        f.mks_scale = 100.0; // raw hPa, MKS Pa
        f.data.fill(850.0);

        f.transform("Pa", 1.0, 0.0);

        assert!(approx_eq!(Float, f.data[[0, 0, 0]], 85000.0, ulps = 2));
        assert!(approx_eq!(Float, f.mks_scale, 1.0, ulps = 2));
    }

    #[test]
    fn transform_skips_fill_values() {
        let mut f = sample_field(vec![0.0, 10.0], vec![0.0, 10.0]);
        f.mks_scale = 100.0;
        f.data[[0, 0, 0]] = f.fillval;

        f.transform("Pa", 1.0, 0.0);

        assert_eq!(f.data[[0, 0, 0]], f.fillval);
    }

    #[test]
    fn generate_vertical_broadcasts_levels() {
        let mut f = sample_field(vec![0.0, 10.0], vec![0.0, 10.0]);
        f.mks_vscale = 100.0;

        let p = f.generate_vertical();

        assert_eq!(p.quantity, "P");
        assert!(approx_eq!(Float, p.data[[0, 1, 1]], 500.0, ulps = 2));
        assert!(approx_eq!(Float, p.data[[1, 0, 1]], 100.0, ulps = 2));
        assert!(approx_eq!(Float, p.mks_scale, 100.0, ulps = 2));
    }

    #[test]
    fn reconcile_interpolates_onto_target_grid() {
        let mut coarse = sample_field(vec![0.0, 10.0], vec![0.0, 10.0]);
        coarse.data.index_axis_mut(Axis(0), 0).fill(0.0);
        coarse.data[[0, 0, 1]] = 10.0;
        coarse.data[[0, 1, 0]] = 10.0;
        coarse.data[[0, 1, 1]] = 20.0;

        let fine = sample_field(vec![0.0, 5.0, 10.0], vec![0.0, 5.0, 10.0]);

        let r = reconcile(&coarse, &fine).unwrap();

        assert!(r.compatible(&fine));
        assert!(approx_eq!(Float, r.data[[0, 1, 1]], 10.0, ulps = 2));
        assert!(approx_eq!(Float, r.data[[0, 0, 1]], 5.0, ulps = 2));
    }

    #[test]
    fn thinning_subsamples_the_horizontal_grid() {
        let f = sample_field(vec![0.0, 10.0, 20.0, 30.0], vec![0.0, 10.0, 20.0, 30.0]);

        let t = f.thin(2, 1);

        assert_eq!(t.lats(), &[0.0, 20.0]);
        assert_eq!(t.lons(), &[10.0, 30.0]);
        assert_eq!(t.data.dim(), (2, 2, 2));
        assert_eq!(t.levels(), f.levels());

        // skip 1 is the identity
        let same = f.thin(1, 0);
        assert!(same.compatible(&f));
    }

    #[test]
    fn reconcile_wraps_the_longitude_seam() {
        let mut coarse = sample_field(vec![0.0, 10.0], vec![0.0, 120.0, 240.0]);
        coarse.data.index_axis_mut(Axis(0), 0).fill(0.0);
        coarse.data[[0, 0, 0]] = 30.0;
        coarse.data[[0, 1, 0]] = 30.0;

        let fine = sample_field(vec![0.0, 10.0], vec![0.0, 120.0, 240.0, 300.0]);

        let r = reconcile(&coarse, &fine).unwrap();

        // lon 300 sits midway between the last column (240) and the
        // first one wrapped around (360)
        assert!(approx_eq!(Float, r.data[[0, 0, 3]], 15.0, ulps = 4));
        assert_ne!(r.data[[0, 1, 3]], coarse.fillval);
    }

    #[test]
    fn reconcile_marks_uncovered_latitudes_as_fill() {
        let coarse = sample_field(vec![0.0, 10.0], vec![0.0, 10.0]);
        let wide = sample_field(vec![0.0, 10.0, 20.0], vec![0.0, 10.0]);

        let r = reconcile(&coarse, &wide).unwrap();

        assert_eq!(r.data[[0, 2, 0]], coarse.fillval);
    }
}
