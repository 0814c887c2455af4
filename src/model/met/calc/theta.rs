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

//! Potential-temperature calculator.

use crate::constants::{KAPPA, P0};
use crate::errors::MetError;
use crate::model::met::gridfield::{GridField3D, GridFieldSfc};
use crate::model::met::registry;
use crate::Float;
use ndarray::{Axis, Zip};

/// Poisson's relation: potential temperature (K) from temperature (K)
/// and pressure (Pa).
pub fn poisson(t_kelvin: Float, p_pa: Float) -> Float {
    t_kelvin * (P0 / p_pa).powf(KAPPA)
}

/// Theta from a temperature field and a pressure field on the same
/// grid.
pub fn calc(t: &GridField3D, p: &GridField3D) -> Result<GridField3D, MetError> {
    if !registry::same(&t.quantity, registry::TEMPERATURE)
        || !registry::same(&p.quantity, registry::PRESSURE)
    {
        return Err(MetError::BadInputQuantity);
    }
    if !t.compatible(p) {
        return Err(MetError::BadGrid);
    }

    let mut out = t.with_identity("air_potential_temperature", "K", 1.0, 0.0);

    Zip::from(&mut out.data)
        .and(&t.data)
        .and(&p.data)
        .for_each(|dest, &tv, &pv| {
            *dest = if tv != t.fillval && pv != p.fillval && pv > 0.0 {
                poisson(
                    tv * t.mks_scale + t.mks_offset,
                    pv * p.mks_scale + p.mks_offset,
                )
            } else {
                t.fillval
            };
        });

    Ok(out)
}

/// Theta from a temperature field whose vertical coordinate is
/// pressure; the level values supply the pressures.
pub fn calc_on_levels(t: &GridField3D) -> Result<GridField3D, MetError> {
    if !registry::same(&t.quantity, registry::TEMPERATURE)
        || !registry::same(&t.vertical, registry::PRESSURE)
    {
        return Err(MetError::BadInputQuantity);
    }

    let mut out = t.with_identity("air_potential_temperature", "K", 1.0, 0.0);
    let levels_mks = t.levels_mks();

    for (k, p_pa) in levels_mks.iter().enumerate() {
        let plane = t.data.index_axis(Axis(0), k);
        let mut oplane = out.data.index_axis_mut(Axis(0), k);

        Zip::from(&mut oplane).and(&plane).for_each(|dest, &tv| {
            *dest = if tv != t.fillval && *p_pa > 0.0 {
                poisson(tv * t.mks_scale + t.mks_offset, *p_pa)
            } else {
                t.fillval
            };
        });
    }

    Ok(out)
}

/// Theta on a surface, from surface temperature and pressure. The
/// pressure input may be surface pressure.
pub fn calc_sfc(t: &GridFieldSfc, p: &GridFieldSfc) -> Result<GridFieldSfc, MetError> {
    if !registry::same(&t.quantity, registry::TEMPERATURE)
        || !(registry::same(&p.quantity, registry::PRESSURE)
            || registry::same(&p.quantity, registry::SURFACE_PRESSURE))
    {
        return Err(MetError::BadInputQuantity);
    }
    if !t.compatible(p) || t.surface != p.surface {
        return Err(MetError::BadGrid);
    }

    let mut out = t.with_identity("air_potential_temperature", "K", 1.0, 0.0);

    Zip::from(&mut out.data)
        .and(&t.data)
        .and(&p.data)
        .for_each(|dest, &tv, &pv| {
            *dest = if tv != t.fillval && pv != p.fillval && pv > 0.0 {
                poisson(
                    tv * t.mks_scale + t.mks_offset,
                    pv * p.mks_scale + p.mks_offset,
                )
            } else {
                t.fillval
            };
        });

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, NaiveDateTime};
    use float_cmp::approx_eq;
    use ndarray::{Array2, Array3};

    fn sample_time() -> NaiveDateTime {
        NaiveDate::from_ymd(2021, 7, 15).and_hms(12, 0, 0)
    }

    fn temperature_on_pressure_levels() -> GridField3D {
        let mut t = GridField3D::new(
            "T",
            "K",
            "P",
            "hPa",
            vec![1000.0, 500.0],
            vec![-10.0, 0.0, 10.0],
            vec![0.0, 90.0],
            Array3::from_elem((2, 3, 2), 250.0),
            sample_time(),
        );
        t.mks_vscale = 100.0;
        t
    }

    #[test]
    fn poisson_reference_value() {
        // theta == T at the reference pressure
        assert!(approx_eq!(Float, poisson(270.0, P0), 270.0, ulps = 2));

        let th = poisson(210.0, 10_000.0);
        assert!(approx_eq!(
            Float,
            th,
            210.0 * 10.0_f64.powf(KAPPA),
            ulps = 4
        ));
    }

    #[test]
    fn two_field_and_level_variants_agree() {
        let t = temperature_on_pressure_levels();
        let p = t.generate_vertical();

        let a = calc(&t, &p).unwrap();
        let b = calc_on_levels(&t).unwrap();

        assert_eq!(a.quantity, "air_potential_temperature");
        assert!(approx_eq!(
            Float,
            a.data[[1, 2, 0]],
            b.data[[1, 2, 0]],
            ulps = 2
        ));
        assert!(approx_eq!(
            Float,
            b.data[[1, 0, 0]],
            poisson(250.0, 50_000.0),
            ulps = 4
        ));
    }

    #[test]
    fn poisson_relation_is_self_inverse() {
        use crate::model::met::calc::pressure;

        let t = temperature_on_pressure_levels();
        let original = calc_on_levels(&t).unwrap();

        // theta -> pressure -> theta must close the loop
        let p = pressure::calc_pair(&t, &original).unwrap();
        let recovered = calc(&t, &p).unwrap();

        for idx in [[0, 0, 0], [1, 2, 1]] {
            assert!(approx_eq!(
                Float,
                recovered.data[idx],
                original.data[idx],
                epsilon = 1.0e-9
            ));
        }
    }

    #[test]
    fn mks_transforms_are_honored() {
        let mut t = temperature_on_pressure_levels();
        // raw values in celsius
        t.mks_offset = 273.15;
        t.data.fill(-23.15);

        let th = calc_on_levels(&t).unwrap();

        assert!(approx_eq!(
            Float,
            th.data[[0, 0, 0]],
            poisson(250.0, 100_000.0),
            ulps = 4
        ));
    }

    #[test]
    fn fill_values_propagate() {
        let t = temperature_on_pressure_levels();
        let mut p = t.generate_vertical();
        p.data[[0, 1, 1]] = p.fillval;

        let th = calc(&t, &p).unwrap();

        assert_eq!(th.data[[0, 1, 1]], t.fillval);
        assert_ne!(th.data[[0, 1, 0]], t.fillval);
    }

    #[test]
    fn wrong_inputs_are_rejected() {
        let t = temperature_on_pressure_levels();
        let u = t.with_identity("U", "m/s", 1.0, 0.0);

        assert!(matches!(calc(&t, &u), Err(MetError::BadInputQuantity)));
        assert!(matches!(calc(&u, &t), Err(MetError::BadInputQuantity)));
    }

    #[test]
    fn mismatched_grids_are_rejected() {
        let t = temperature_on_pressure_levels();
        let mut p = temperature_on_pressure_levels().generate_vertical();
        p = GridField3D::new(
            &p.quantity,
            &p.units,
            "P",
            "hPa",
            vec![1000.0, 500.0],
            vec![-10.0, 0.0, 20.0],
            vec![0.0, 90.0],
            p.data.clone(),
            sample_time(),
        );

        assert!(matches!(calc(&t, &p), Err(MetError::BadGrid)));
    }

    #[test]
    fn surface_variant_matches_poisson() {
        let t = GridFieldSfc::new(
            "T",
            "K",
            "sfc",
            vec![0.0, 10.0],
            vec![0.0, 10.0],
            Array2::from_elem((2, 2), 288.0),
            sample_time(),
        );
        let mut p = t.with_identity("PS", "hPa", 100.0, 0.0);
        p.quantity = "surface_air_pressure".to_owned();
        p.data.fill(1013.25);

        let th = calc_sfc(&t, &p).unwrap();

        assert!(approx_eq!(
            Float,
            th.data[[0, 0]],
            poisson(288.0, 101_325.0),
            ulps = 4
        ));
    }
}
