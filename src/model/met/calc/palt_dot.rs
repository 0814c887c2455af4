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

//! Pressure-altitude tendency calculator.
//!
//! Converts a pressure tendency (omega, Pa/s) into a vertical velocity
//! in pressure-altitude coordinates via the standard-atmosphere
//! `dz/dp` derivative:
//!
//! ```text
//! dz/dt = omega * dz/dp
//! ```
//!
//! Outputs are in m/s.

use crate::errors::MetError;
use crate::model::met::calc::{std_atm_dzdp, std_atm_palt};
use crate::model::met::gridfield::GridField3D;
use crate::model::met::registry;
use crate::Float;
use ndarray::{Axis, Zip};

/// `dz/dt` in m/s from omega in Pa/s at a pressure altitude in km.
fn dzdt(omega_pa_s: Float, alt_km: Float) -> Result<Float, MetError> {
    // dz/dp in km/hPa; the factor 10 rescales to m/Pa
    Ok(omega_pa_s * std_atm_dzdp(alt_km)? * 10.0)
}

/// Vertical velocity from an omega field whose level axis fixes the
/// altitude: either pressure surfaces (altitude via the standard
/// atmosphere) or pressure-altitude surfaces.
pub fn calc_single(omega: &GridField3D) -> Result<GridField3D, MetError> {
    if !registry::same(&omega.quantity, registry::OMEGA) {
        return Err(MetError::BadInputQuantity);
    }

    let on_p = registry::same(&omega.vertical, registry::PRESSURE);
    let on_z = registry::same(&omega.vertical, registry::PALT);
    if !on_p && !on_z {
        return Err(MetError::BadInputQuantity);
    }

    let mut out = omega.with_identity("upward_air_velocity", "m/s", 1.0, 0.0);
    let levels_mks = omega.levels_mks();

    for (k, lev) in levels_mks.iter().enumerate() {
        let alt_km = if on_p {
            std_atm_palt(*lev)?
        } else {
            lev / 1000.0
        };

        let wplane = omega.data.index_axis(Axis(0), k);
        let mut oplane = out.data.index_axis_mut(Axis(0), k);

        let mut status = Ok(());
        Zip::from(&mut oplane).and(&wplane).for_each(|dest, &wv| {
            *dest = if wv != omega.fillval {
                match dzdt(wv * omega.mks_scale + omega.mks_offset, alt_km) {
                    Ok(v) => v,
                    Err(e) => {
                        status = Err(e);
                        omega.fillval
                    }
                }
            } else {
                omega.fillval
            };
        });
        status?;
    }

    Ok(out)
}

/// Vertical velocity from an omega field paired with a pressure or
/// pressure-altitude field on the same grid, in either order.
pub fn calc_pair(a: &GridField3D, b: &GridField3D) -> Result<GridField3D, MetError> {
    let (omega, alt) = if registry::same(&a.quantity, registry::OMEGA) {
        (a, b)
    } else if registry::same(&b.quantity, registry::OMEGA) {
        (b, a)
    } else {
        return Err(MetError::BadInputQuantity);
    };

    if !omega.compatible(alt) {
        return Err(MetError::BadGrid);
    }

    let from_p = registry::same(&alt.quantity, registry::PRESSURE);
    let from_z = registry::same(&alt.quantity, registry::PALT);
    if !from_p && !from_z {
        return Err(MetError::BadInputQuantity);
    }

    // the output inherits the first input's grid and fill sentinel
    let mut out = a.with_identity("upward_air_velocity", "m/s", 1.0, 0.0);
    let fill = a.fillval;

    Zip::from(&mut out.data)
        .and(&omega.data)
        .and(&alt.data)
        .for_each(|dest, &wv, &av| {
            if wv == omega.fillval || av == alt.fillval {
                *dest = fill;
                return;
            }

            let a_mks = av * alt.mks_scale + alt.mks_offset;
            let alt_km = if from_p {
                match std_atm_palt(a_mks) {
                    Ok(z) => z,
                    Err(_) => {
                        *dest = fill;
                        return;
                    }
                }
            } else {
                a_mks / 1000.0
            };

            *dest = match dzdt(wv * omega.mks_scale + omega.mks_offset, alt_km) {
                Ok(v) => v,
                Err(_) => fill,
            };
        });

    Ok(out)
}
