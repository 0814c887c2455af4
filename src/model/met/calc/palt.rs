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

//! Pressure-altitude calculator.
//!
//! Pressure altitude is the altitude at which the US standard
//! atmosphere attains a given pressure. Outputs are in km
//! (MKS scale 1000).

use crate::errors::MetError;
use crate::model::met::calc::std_atm_palt;
use crate::model::met::gridfield::{GridField3D, GridFieldSfc};
use crate::model::met::registry;
use ndarray::{Axis, Zip};

/// Pressure altitude from a single input field. Accepted variants:
/// a pressure field (converted pointwise), any field on pressure
/// surfaces (the levels supply the pressures), or a field already on
/// pressure-altitude surfaces.
pub fn calc_single(input: &GridField3D) -> Result<GridField3D, MetError> {
    if registry::same(&input.quantity, registry::PALT) {
        return Ok(input.clone());
    }

    if registry::same(&input.vertical, registry::PALT) {
        return Ok(input.generate_vertical());
    }

    if registry::same(&input.quantity, registry::PRESSURE) {
        let mut out = input.with_identity("pressure_altitude", "km", 1000.0, 0.0);

        Zip::from(&mut out.data)
            .and(&input.data)
            .for_each(|dest, &pv| {
                *dest = if pv != input.fillval {
                    let p_pa = pv * input.mks_scale + input.mks_offset;
                    match std_atm_palt(p_pa) {
                        Ok(z_km) => z_km,
                        Err(_) => input.fillval,
                    }
                } else {
                    input.fillval
                };
            });

        return Ok(out);
    }

    if registry::same(&input.vertical, registry::PRESSURE) {
        let mut out = input.with_identity("pressure_altitude", "km", 1000.0, 0.0);
        let levels_mks = input.levels_mks();

        for (k, p_pa) in levels_mks.iter().enumerate() {
            let z_km = std_atm_palt(*p_pa)?;
            out.data.index_axis_mut(Axis(0), k).fill(z_km);
        }

        return Ok(out);
    }

    Err(MetError::BadInputQuantity)
}

/// Surface variant: pressure altitude from a surface pressure field.
pub fn calc_sfc(input: &GridFieldSfc) -> Result<GridFieldSfc, MetError> {
    if registry::same(&input.quantity, registry::PALT) {
        return Ok(input.clone());
    }

    if !(registry::same(&input.quantity, registry::PRESSURE)
        || registry::same(&input.quantity, registry::SURFACE_PRESSURE))
    {
        return Err(MetError::BadInputQuantity);
    }

    let mut out = input.with_identity("pressure_altitude", "km", 1000.0, 0.0);

    Zip::from(&mut out.data)
        .and(&input.data)
        .for_each(|dest, &pv| {
            *dest = if pv != input.fillval {
                let p_pa = pv * input.mks_scale + input.mks_offset;
                match std_atm_palt(p_pa) {
                    Ok(z_km) => z_km,
                    Err(_) => input.fillval,
                }
            } else {
                input.fillval
            };
        });

    Ok(out)
}
