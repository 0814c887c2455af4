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

//! Air-pressure calculator.
//!
//! Outputs are in hPa (MKS scale 100) except for the layer-thickness
//! integration variant, which stays in the thickness input's units.

use crate::constants::{KAPPA, R_DRY};
use crate::errors::MetError;
use crate::model::met::calc::std_atm_pressure;
use crate::model::met::gridfield::{GridField3D, GridFieldSfc};
use crate::model::met::registry;
use crate::Float;
use ndarray::{Axis, Zip};

/// Pressure from a single input field. Accepted variants:
///
/// * any field on pressure surfaces (the levels supply the values);
/// * temperature on isentropic (theta) surfaces, inverting Poisson;
/// * any field on pressure-altitude surfaces, via the standard
///   atmosphere;
/// * a pressure-altitude field, via the standard atmosphere;
/// * a layer-thickness field, integrated downward from `start`
///   (required for this variant only, in the thickness units).
pub fn calc_single(input: &GridField3D, start: Option<Float>) -> Result<GridField3D, MetError> {
    if registry::same(&input.vertical, registry::PRESSURE) {
        return Ok(input.generate_vertical());
    }

    if registry::same(&input.quantity, registry::TEMPERATURE)
        && registry::same(&input.vertical, registry::THETA)
    {
        let mut out = input.with_identity("air_pressure", "hPa", 100.0, 0.0);
        let theta_mks = input.levels_mks();

        for (k, th) in theta_mks.iter().enumerate() {
            let plane = input.data.index_axis(Axis(0), k);
            let mut oplane = out.data.index_axis_mut(Axis(0), k);

            Zip::from(&mut oplane).and(&plane).for_each(|dest, &tv| {
                *dest = if tv != input.fillval {
                    let t_mks = tv * input.mks_scale + input.mks_offset;
                    // invert Poisson's relation; 1000 hPa reference
                    1000.0 * (th / t_mks).powf(-1.0 / KAPPA)
                } else {
                    input.fillval
                };
            });
        }

        return Ok(out);
    }

    if registry::same(&input.vertical, registry::PALT) {
        let mut out = input.with_identity("air_pressure", "hPa", 100.0, 0.0);
        let alts_mks = input.levels_mks();

        for (k, alt_m) in alts_mks.iter().enumerate() {
            let p_hpa = std_atm_pressure(alt_m / 1000.0)? / 100.0;
            out.data.index_axis_mut(Axis(0), k).fill(p_hpa);
        }

        return Ok(out);
    }

    if registry::same(&input.quantity, registry::PALT) {
        let mut out = input.with_identity("air_pressure", "hPa", 100.0, 0.0);

        Zip::from(&mut out.data)
            .and(&input.data)
            .for_each(|dest, &zv| {
                *dest = if zv != input.fillval {
                    let alt_km = (zv * input.mks_scale + input.mks_offset) / 1000.0;
                    match std_atm_pressure(alt_km) {
                        Ok(p_pa) => p_pa / 100.0,
                        Err(_) => input.fillval,
                    }
                } else {
                    input.fillval
                };
            });

        return Ok(out);
    }

    if registry::same(&input.quantity, registry::THICKNESS) {
        let start = start.ok_or(MetError::BadInputQuantity)?;
        return integrate_thickness(input, start);
    }

    Err(MetError::BadInputQuantity)
}

/// Pressure from two fields on the same grid, in either order:
/// temperature with theta (Poisson), or temperature with density
/// (ideal gas law).
pub fn calc_pair(a: &GridField3D, b: &GridField3D) -> Result<GridField3D, MetError> {
    // put temperature first
    let (t, other) = if registry::same(&a.quantity, registry::TEMPERATURE) {
        (a, b)
    } else if registry::same(&b.quantity, registry::TEMPERATURE) {
        (b, a)
    } else {
        return Err(MetError::BadInputQuantity);
    };

    if !t.compatible(other) {
        return Err(MetError::BadGrid);
    }

    // the output inherits the first input's grid and fill sentinel,
    // whichever role that input plays
    let mut out = a.with_identity("air_pressure", "hPa", 100.0, 0.0);

    if registry::same(&other.quantity, registry::THETA) {
        Zip::from(&mut out.data)
            .and(&t.data)
            .and(&other.data)
            .for_each(|dest, &tv, &thv| {
                *dest = if tv != t.fillval && thv != other.fillval {
                    let t_mks = tv * t.mks_scale + t.mks_offset;
                    let th_mks = thv * other.mks_scale + other.mks_offset;
                    1000.0 * (th_mks / t_mks).powf(-1.0 / KAPPA)
                } else {
                    a.fillval
                };
            });
    } else if registry::same(&other.quantity, registry::DENSITY) {
        Zip::from(&mut out.data)
            .and(&t.data)
            .and(&other.data)
            .for_each(|dest, &tv, &rv| {
                *dest = if tv != t.fillval && rv != other.fillval {
                    let t_mks = tv * t.mks_scale + t.mks_offset;
                    let rho_mks = rv * other.mks_scale + other.mks_offset;
                    rho_mks * R_DRY * t_mks / 100.0
                } else {
                    a.fillval
                };
            });
    } else {
        return Err(MetError::BadInputQuantity);
    }

    Ok(out)
}

/// Surface-pressure variant of [`calc_pair`].
pub fn calc_pair_sfc(a: &GridFieldSfc, b: &GridFieldSfc) -> Result<GridFieldSfc, MetError> {
    let (t, other) = if registry::same(&a.quantity, registry::TEMPERATURE) {
        (a, b)
    } else if registry::same(&b.quantity, registry::TEMPERATURE) {
        (b, a)
    } else {
        return Err(MetError::BadInputQuantity);
    };

    if !t.compatible(other) || t.surface != other.surface {
        return Err(MetError::BadGrid);
    }

    let mut out = a.with_identity("air_pressure", "hPa", 100.0, 0.0);

    if registry::same(&other.quantity, registry::THETA) {
        Zip::from(&mut out.data)
            .and(&t.data)
            .and(&other.data)
            .for_each(|dest, &tv, &thv| {
                *dest = if tv != t.fillval && thv != other.fillval {
                    let t_mks = tv * t.mks_scale + t.mks_offset;
                    let th_mks = thv * other.mks_scale + other.mks_offset;
                    1000.0 * (th_mks / t_mks).powf(-1.0 / KAPPA)
                } else {
                    a.fillval
                };
            });
    } else if registry::same(&other.quantity, registry::DENSITY) {
        Zip::from(&mut out.data)
            .and(&t.data)
            .and(&other.data)
            .for_each(|dest, &tv, &rv| {
                *dest = if tv != t.fillval && rv != other.fillval {
                    let t_mks = tv * t.mks_scale + t.mks_offset;
                    let rho_mks = rv * other.mks_scale + other.mks_offset;
                    rho_mks * R_DRY * t_mks / 100.0
                } else {
                    a.fillval
                };
            });
    } else {
        return Err(MetError::BadInputQuantity);
    }

    Ok(out)
}

/// Accumulates layer pressure thicknesses from the model top down,
/// each level getting the pressure at its layer midpoint. Output stays
/// in the thickness input's units.
fn integrate_thickness(delp: &GridField3D, start: Float) -> Result<GridField3D, MetError> {
    let mut out = delp.with_identity("air_pressure", &delp.units, delp.mks_scale, delp.mks_offset);

    let nlev = delp.levels().len();
    let (_, nlat, nlon) = delp.data.dim();

    for j in 0..nlat {
        for i in 0..nlon {
            let mut accum = start;
            let mut dead = false;

            for k in 0..nlev {
                let d = delp.data[[k, j, i]];

                if dead || d == delp.fillval {
                    dead = true;
                    out.data[[k, j, i]] = delp.fillval;
                } else {
                    out.data[[k, j, i]] = accum + d / 2.0;
                    accum += d;
                }
            }
        }
    }

    Ok(out)
}
