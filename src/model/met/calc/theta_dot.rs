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

//! Potential-temperature tendency (net heating rate) calculator.
//!
//! The full form is
//!
//! ```text
//! dtheta/dt = theta * ( (dT/dt)/T - kappa * omega / p )
//! ```
//!
//! When no pressure-tendency field is supplied the second term is
//! dropped, giving `theta * (dT/dt) / T`. On pressure surfaces the
//! dropped term is exactly the adiabatic part of dT/dt, so the
//! approximation holds only when the temperature-tendency input is a
//! diabatic (net heating) tendency, and even then the two forms differ
//! by roughly a percent. Callers that have omega available should
//! prefer the three-input variants.

use crate::constants::{KAPPA, P0};
use crate::errors::MetError;
use crate::model::met::calc::theta::poisson;
use crate::model::met::gridfield::GridField3D;
use crate::model::met::registry;
use crate::Float;
use ndarray::{Axis, Zip};

/// Per-sample evaluation of the tendency formula; `omega_over_p` is
/// `omega / p` in 1/s, or zero for the approximate form.
fn tendency(theta: Float, temp: Float, dtdt: Float, omega_over_p: Float) -> Float {
    theta * (dtdt / temp - KAPPA * omega_over_p)
}

fn output_for(base: &GridField3D) -> GridField3D {
    base.with_identity("tendency_of_air_potential_temperature", "K/s", 1.0, 0.0)
}

/// Approximate tendency from a temperature-tendency field plus one
/// state field. Accepted state fields: temperature on theta surfaces,
/// temperature on pressure surfaces, theta on pressure surfaces, or
/// pressure on theta surfaces.
pub fn calc2(dtdt: &GridField3D, state: &GridField3D) -> Result<GridField3D, MetError> {
    if !registry::same(&dtdt.quantity, registry::T_TENDENCY) {
        return Err(MetError::BadInputQuantity);
    }
    if !dtdt.compatible(state) {
        return Err(MetError::BadGrid);
    }

    let is_t = registry::same(&state.quantity, registry::TEMPERATURE);
    let is_th = registry::same(&state.quantity, registry::THETA);
    let is_p = registry::same(&state.quantity, registry::PRESSURE);
    let on_p = registry::same(&state.vertical, registry::PRESSURE);
    let on_th = registry::same(&state.vertical, registry::THETA);

    if !(is_t && (on_p || on_th) || is_th && on_p || is_p && on_th) {
        return Err(MetError::BadInputQuantity);
    }

    let mut out = output_for(dtdt);
    let levels_mks = state.levels_mks();

    for (k, lev) in levels_mks.iter().enumerate() {
        let dplane = dtdt.data.index_axis(Axis(0), k);
        let splane = state.data.index_axis(Axis(0), k);
        let mut oplane = out.data.index_axis_mut(Axis(0), k);

        Zip::from(&mut oplane)
            .and(&dplane)
            .and(&splane)
            .for_each(|dest, &dv, &sv| {
                if dv == dtdt.fillval || sv == state.fillval {
                    *dest = dtdt.fillval;
                    return;
                }

                let d_mks = dv * dtdt.mks_scale + dtdt.mks_offset;
                let s_mks = sv * state.mks_scale + state.mks_offset;

                let (theta, temp) = if is_t && on_th {
                    (*lev, s_mks)
                } else if is_t && on_p {
                    (poisson(s_mks, *lev), s_mks)
                } else if is_th {
                    // theta on pressure surfaces
                    (s_mks, s_mks * (lev / P0).powf(KAPPA))
                } else {
                    // pressure on theta surfaces
                    (*lev, lev * (s_mks / P0).powf(KAPPA))
                };

                *dest = tendency(theta, temp, d_mks, 0.0);
            });
    }

    Ok(out)
}

/// Tendency from a temperature-tendency field plus two state fields,
/// in either order. With a pressure-tendency (omega) input the exact
/// form is used; the temperature-with-theta pairing falls back to the
/// approximate form.
pub fn calc3(
    dtdt: &GridField3D,
    a: &GridField3D,
    b: &GridField3D,
) -> Result<GridField3D, MetError> {
    if !registry::same(&dtdt.quantity, registry::T_TENDENCY) {
        return Err(MetError::BadInputQuantity);
    }
    if !dtdt.compatible(a) || !dtdt.compatible(b) {
        return Err(MetError::BadGrid);
    }

    let find = |q: &str| -> Option<&GridField3D> {
        if registry::same(&a.quantity, q) {
            Some(a)
        } else if registry::same(&b.quantity, q) {
            Some(b)
        } else {
            None
        }
    };

    let temp = find(registry::TEMPERATURE);
    let theta = find(registry::THETA);
    let press = find(registry::PRESSURE);
    let omega = find(registry::OMEGA);

    match (temp, theta, press, omega) {
        // exact forms; pressure supplied by the level axis
        (Some(t), None, None, Some(w)) if registry::same(&t.vertical, registry::PRESSURE) => {
            let mut out = output_for(dtdt);
            per_level(&mut out, dtdt, t, w, |t_mks, p_pa, d_mks, w_mks| {
                tendency(poisson(t_mks, p_pa), t_mks, d_mks, w_mks / p_pa)
            });
            Ok(out)
        }
        (None, Some(th), None, Some(w)) if registry::same(&th.vertical, registry::PRESSURE) => {
            let mut out = output_for(dtdt);
            per_level(&mut out, dtdt, th, w, |th_mks, p_pa, d_mks, w_mks| {
                let t_mks = th_mks * (p_pa / P0).powf(KAPPA);
                tendency(th_mks, t_mks, d_mks, w_mks / p_pa)
            });
            Ok(out)
        }
        // approximate forms, no omega available
        (Some(t), None, Some(p), None) => {
            let mut out = output_for(dtdt);
            pointwise(&mut out, dtdt, t, p, |t_mks, p_mks, d_mks| {
                tendency(poisson(t_mks, p_mks), t_mks, d_mks, 0.0)
            });
            Ok(out)
        }
        (Some(t), Some(th), None, None) => {
            let mut out = output_for(dtdt);
            pointwise(&mut out, dtdt, t, th, |t_mks, th_mks, d_mks| {
                tendency(th_mks, t_mks, d_mks, 0.0)
            });
            Ok(out)
        }
        _ => Err(MetError::BadInputQuantity),
    }
}

/// Exact tendency from temperature-tendency, temperature, pressure,
/// and pressure-tendency fields, in any order of the last three.
pub fn calc4(
    dtdt: &GridField3D,
    a: &GridField3D,
    b: &GridField3D,
    c: &GridField3D,
) -> Result<GridField3D, MetError> {
    if !registry::same(&dtdt.quantity, registry::T_TENDENCY) {
        return Err(MetError::BadInputQuantity);
    }
    if !dtdt.compatible(a) || !dtdt.compatible(b) || !dtdt.compatible(c) {
        return Err(MetError::BadGrid);
    }

    let find = |q: &str| -> Option<&GridField3D> {
        [a, b, c]
            .into_iter()
            .find(|f| registry::same(&f.quantity, q))
    };

    let (t, p, w) = match (
        find(registry::TEMPERATURE),
        find(registry::PRESSURE),
        find(registry::OMEGA),
    ) {
        (Some(t), Some(p), Some(w)) => (t, p, w),
        _ => return Err(MetError::BadInputQuantity),
    };

    let mut out = output_for(dtdt);

    Zip::from(&mut out.data)
        .and(&dtdt.data)
        .and(&t.data)
        .and(&p.data)
        .and(&w.data)
        .for_each(|dest, &dv, &tv, &pv, &wv| {
            if dv == dtdt.fillval || tv == t.fillval || pv == p.fillval || wv == w.fillval {
                *dest = dtdt.fillval;
                return;
            }

            let d_mks = dv * dtdt.mks_scale + dtdt.mks_offset;
            let t_mks = tv * t.mks_scale + t.mks_offset;
            let p_mks = pv * p.mks_scale + p.mks_offset;
            let w_mks = wv * w.mks_scale + w.mks_offset;

            *dest = tendency(poisson(t_mks, p_mks), t_mks, d_mks, w_mks / p_mks);
        });

    Ok(out)
}

/// Exact tendency with every state field supplied explicitly:
/// temperature, theta, pressure, and pressure-tendency, in any order.
/// The explicit theta is used as given rather than recomputed from
/// temperature and pressure.
pub fn calc5(
    dtdt: &GridField3D,
    inputs: [&GridField3D; 4],
) -> Result<GridField3D, MetError> {
    if !registry::same(&dtdt.quantity, registry::T_TENDENCY) {
        return Err(MetError::BadInputQuantity);
    }
    for f in inputs {
        if !dtdt.compatible(f) {
            return Err(MetError::BadGrid);
        }
    }

    let find = |q: &str| -> Option<&GridField3D> {
        inputs.into_iter().find(|f| registry::same(&f.quantity, q))
    };

    let (t, th, p, w) = match (
        find(registry::TEMPERATURE),
        find(registry::THETA),
        find(registry::PRESSURE),
        find(registry::OMEGA),
    ) {
        (Some(t), Some(th), Some(p), Some(w)) => (t, th, p, w),
        _ => return Err(MetError::BadInputQuantity),
    };

    let mut out = output_for(dtdt);

    Zip::from(&mut out.data)
        .and(&dtdt.data)
        .and(&t.data)
        .and(&th.data)
        .and(&p.data)
        .and(&w.data)
        .for_each(|dest, &dv, &tv, &thv, &pv, &wv| {
            if dv == dtdt.fillval
                || tv == t.fillval
                || thv == th.fillval
                || pv == p.fillval
                || wv == w.fillval
            {
                *dest = dtdt.fillval;
                return;
            }

            let d_mks = dv * dtdt.mks_scale + dtdt.mks_offset;
            let t_mks = tv * t.mks_scale + t.mks_offset;
            let th_mks = thv * th.mks_scale + th.mks_offset;
            let p_mks = pv * p.mks_scale + p.mks_offset;
            let w_mks = wv * w.mks_scale + w.mks_offset;

            *dest = tendency(th_mks, t_mks, d_mks, w_mks / p_mks);
        });

    Ok(out)
}

/// Level-wise evaluation: pressure comes from the shared level axis.
fn per_level<F>(
    out: &mut GridField3D,
    dtdt: &GridField3D,
    state: &GridField3D,
    omega: &GridField3D,
    f: F,
) where
    F: Fn(Float, Float, Float, Float) -> Float,
{
    let levels_mks = state.levels_mks();

    for (k, p_pa) in levels_mks.iter().enumerate() {
        let dplane = dtdt.data.index_axis(Axis(0), k);
        let splane = state.data.index_axis(Axis(0), k);
        let wplane = omega.data.index_axis(Axis(0), k);
        let mut oplane = out.data.index_axis_mut(Axis(0), k);

        Zip::from(&mut oplane)
            .and(&dplane)
            .and(&splane)
            .and(&wplane)
            .for_each(|dest, &dv, &sv, &wv| {
                *dest = if dv != dtdt.fillval && sv != state.fillval && wv != omega.fillval {
                    f(
                        sv * state.mks_scale + state.mks_offset,
                        *p_pa,
                        dv * dtdt.mks_scale + dtdt.mks_offset,
                        wv * omega.mks_scale + omega.mks_offset,
                    )
                } else {
                    dtdt.fillval
                };
            });
    }
}

fn pointwise<F>(
    out: &mut GridField3D,
    dtdt: &GridField3D,
    x: &GridField3D,
    y: &GridField3D,
    f: F,
) where
    F: Fn(Float, Float, Float) -> Float,
{
    Zip::from(&mut out.data)
        .and(&dtdt.data)
        .and(&x.data)
        .and(&y.data)
        .for_each(|dest, &dv, &xv, &yv| {
            *dest = if dv != dtdt.fillval && xv != x.fillval && yv != y.fillval {
                f(
                    xv * x.mks_scale + x.mks_offset,
                    yv * y.mks_scale + y.mks_offset,
                    dv * dtdt.mks_scale + dtdt.mks_offset,
                )
            } else {
                dtdt.fillval
            };
        });
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, NaiveDateTime};
    use float_cmp::approx_eq;
    use ndarray::Array3;

    fn sample_time() -> NaiveDateTime {
        NaiveDate::from_ymd(2021, 7, 15).and_hms(12, 0, 0)
    }

    fn on_pressure(quantity: &str, value: Float) -> GridField3D {
        let mut f = GridField3D::new(
            quantity,
            "1",
            "P",
            "hPa",
            vec![500.0, 100.0],
            vec![0.0, 10.0],
            vec![0.0, 10.0],
            Array3::from_elem((2, 2, 2), value),
            sample_time(),
        );
        f.mks_vscale = 100.0;
        f
    }

    #[test]
    fn approximate_form_from_temperature_on_pressure() {
        let mut dtdt = on_pressure("DTDTTOT", 2.0);
        // kelvin per day in the raw data
        dtdt.mks_scale = 1.0 / 86400.0;
        let t = on_pressure("T", 250.0);

        let td = calc2(&dtdt, &t).unwrap();

        let theta = poisson(250.0, 50_000.0);
        let expect = theta * (2.0 / 86400.0) / 250.0;
        assert_eq!(td.quantity, "tendency_of_air_potential_temperature");
        assert!(approx_eq!(Float, td.data[[0, 0, 0]], expect, ulps = 4));
    }

    #[test]
    fn theta_on_pressure_recovers_temperature() {
        let dtdt = on_pressure("DTDTTOT", 1.0e-5);
        let t = on_pressure("T", 250.0);
        let mut th = on_pressure("air_potential_temperature", 0.0);
        th.data.fill(poisson(250.0, 50_000.0));
        th.data
            .index_axis_mut(Axis(0), 1)
            .fill(poisson(250.0, 10_000.0));

        let from_t = calc2(&dtdt, &t).unwrap();
        let from_th = calc2(&dtdt, &th).unwrap();

        for idx in [[0, 0, 0], [1, 1, 1]] {
            assert!(approx_eq!(
                Float,
                from_t.data[idx],
                from_th.data[idx],
                epsilon = 1.0e-12
            ));
        }
    }

    #[test]
    fn exact_form_subtracts_the_adiabatic_part() {
        let dtdt = on_pressure("DTDTTOT", 1.0e-5);
        let t = on_pressure("T", 250.0);
        let mut omega = on_pressure("OMEGA", 0.02);
        omega.units = "Pa/s".to_owned();

        let approx = calc3(&dtdt, &t, &t.generate_vertical()).unwrap();
        let exact = calc3(&dtdt, &t, &omega).unwrap();

        let theta = poisson(250.0, 50_000.0);
        let adiabatic = theta * KAPPA * 0.02 / 50_000.0;
        assert!(approx_eq!(
            Float,
            approx.data[[0, 0, 0]] - exact.data[[0, 0, 0]],
            adiabatic,
            epsilon = 1.0e-12
        ));
    }

    fn on_theta(quantity: &str, value: Float) -> GridField3D {
        GridField3D::new(
            quantity,
            "1",
            "Theta",
            "K",
            vec![380.0, 500.0],
            vec![0.0, 10.0],
            vec![0.0, 10.0],
            Array3::from_elem((2, 2, 2), value),
            sample_time(),
        )
    }

    #[test]
    fn isentropic_variants_agree_with_each_other() {
        // on a theta surface the same air state can be described by
        // its temperature or by its pressure
        let dtdt = on_theta("DTDTTOT", 1.0e-5);

        let theta = 380.0;
        let p_pa = 15_000.0;
        let t_val = theta * (p_pa / P0).powf(KAPPA);

        let mut t = on_theta("T", t_val);
        t.units = "K".to_owned();
        let mut p = on_theta("air_pressure", p_pa / 100.0);
        p.units = "hPa".to_owned();
        p.mks_scale = 100.0;

        let from_t = calc2(&dtdt, &t).unwrap();
        let from_p = calc2(&dtdt, &p).unwrap();

        assert!(approx_eq!(
            Float,
            from_t.data[[0, 0, 0]],
            from_p.data[[0, 0, 0]],
            epsilon = 1.0e-12
        ));
        assert!(approx_eq!(
            Float,
            from_t.data[[0, 1, 1]],
            380.0 * 1.0e-5 / t_val,
            epsilon = 1.0e-12
        ));
    }

    #[test]
    fn five_input_form_matches_four_input_form() {
        let dtdt = on_pressure("DTDTTOT", 1.0e-5);
        let t = on_pressure("T", 230.0);
        let omega = on_pressure("OMEGA", -0.01);
        let p = t.generate_vertical();
        let mut th = on_pressure("air_potential_temperature", 0.0);
        th.data.fill(poisson(230.0, 50_000.0));
        th.data
            .index_axis_mut(Axis(0), 1)
            .fill(poisson(230.0, 10_000.0));

        let four = calc4(&dtdt, &t, &p, &omega).unwrap();
        let five = calc5(&dtdt, [&th, &omega, &p, &t]).unwrap();

        for idx in [[0, 0, 0], [1, 1, 0]] {
            assert!(approx_eq!(
                Float,
                four.data[idx],
                five.data[idx],
                epsilon = 1.0e-15
            ));
        }
    }

    #[test]
    fn four_input_form_matches_three_input_form() {
        let dtdt = on_pressure("DTDTTOT", 1.0e-5);
        let t = on_pressure("T", 230.0);
        let omega = on_pressure("OMEGA", -0.01);
        let p = t.generate_vertical();

        let three = calc3(&dtdt, &omega, &t).unwrap();
        let four = calc4(&dtdt, &p, &omega, &t).unwrap();

        assert!(approx_eq!(
            Float,
            three.data[[1, 0, 1]],
            four.data[[1, 0, 1]],
            epsilon = 1.0e-15
        ));
    }

    #[test]
    fn fill_values_propagate() {
        let dtdt = on_pressure("DTDTTOT", 1.0e-5);
        let mut t = on_pressure("T", 250.0);
        t.data[[1, 1, 0]] = t.fillval;

        let td = calc2(&dtdt, &t).unwrap();

        assert_eq!(td.data[[1, 1, 0]], dtdt.fillval);
        assert_ne!(td.data[[1, 0, 0]], dtdt.fillval);
    }

    #[test]
    fn unsupported_pairings_are_rejected() {
        let dtdt = on_pressure("DTDTTOT", 1.0e-5);
        let u = on_pressure("U", 10.0);

        assert!(matches!(
            calc2(&dtdt, &u),
            Err(MetError::BadInputQuantity)
        ));
        assert!(matches!(
            calc2(&u, &dtdt),
            Err(MetError::BadInputQuantity)
        ));
        assert!(matches!(
            calc3(&dtdt, &u, &u),
            Err(MetError::BadInputQuantity)
        ));
    }
}
