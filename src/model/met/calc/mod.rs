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

//! Derived-field calculators.
//!
//! Each calculator is a pure function from one to five mutually
//! grid-compatible input fields to one output field. The calculator
//! classifies its inputs by their quantity and vertical-coordinate
//! identity to pick a formula variant, converts every sample to MKS
//! with that sample's own field transform before applying the formula,
//! and propagates fill values unconditionally: an output sample is
//! fill iff any contributing input sample was fill.

pub mod palt;
pub mod palt_dot;
pub mod pressure;
pub mod theta;
pub mod theta_dot;

use crate::constants::{STD_ATM_LOG_DZDP, STD_ATM_LOG_P, STD_ATM_Z};
use crate::errors::MetError;
use crate::Float;

/// US standard atmosphere pressure (Pa) at a pressure altitude (km),
/// by linear interpolation in log-pressure.
pub(crate) fn std_atm_pressure(alt_km: Float) -> Result<Float, MetError> {
    if alt_km < STD_ATM_Z[0] || alt_km > STD_ATM_Z[STD_ATM_Z.len() - 1] {
        return Err(MetError::BadCalculation);
    }

    for i in 1..STD_ATM_Z.len() {
        if STD_ATM_Z[i - 1] <= alt_km && alt_km <= STD_ATM_Z[i] {
            let logp = (STD_ATM_LOG_P[i] - STD_ATM_LOG_P[i - 1]) / (STD_ATM_Z[i] - STD_ATM_Z[i - 1])
                * (alt_km - STD_ATM_Z[i - 1])
                + STD_ATM_LOG_P[i - 1];
            return Ok(logp.exp());
        }
    }

    Err(MetError::BadCalculation)
}

/// US standard atmosphere pressure altitude (km) at a pressure (Pa),
/// by linear interpolation in log-pressure.
pub(crate) fn std_atm_palt(p_pa: Float) -> Result<Float, MetError> {
    if p_pa <= 0.0 {
        return Err(MetError::BadCalculation);
    }

    let logp = p_pa.ln();

    for i in 1..STD_ATM_LOG_P.len() {
        // the log-pressure table decreases with index
        if STD_ATM_LOG_P[i] <= logp && logp <= STD_ATM_LOG_P[i - 1] {
            let z = (STD_ATM_Z[i] - STD_ATM_Z[i - 1]) / (STD_ATM_LOG_P[i] - STD_ATM_LOG_P[i - 1])
                * (logp - STD_ATM_LOG_P[i - 1])
                + STD_ATM_Z[i - 1];
            return Ok(z);
        }
    }

    Err(MetError::BadCalculation)
}

/// US standard atmosphere `dz/dp` (km/hPa, negative) at a pressure
/// altitude (km), by linear interpolation in the log of its magnitude.
pub(crate) fn std_atm_dzdp(alt_km: Float) -> Result<Float, MetError> {
    if alt_km < STD_ATM_Z[0] || alt_km > STD_ATM_Z[STD_ATM_Z.len() - 1] {
        return Err(MetError::BadCalculation);
    }

    for i in 1..STD_ATM_Z.len() {
        if STD_ATM_Z[i - 1] <= alt_km && alt_km <= STD_ATM_Z[i] {
            let logd = (STD_ATM_LOG_DZDP[i] - STD_ATM_LOG_DZDP[i - 1])
                / (STD_ATM_Z[i] - STD_ATM_Z[i - 1])
                * (alt_km - STD_ATM_Z[i - 1])
                + STD_ATM_LOG_DZDP[i - 1];
            return Ok(-logd.exp());
        }
    }

    Err(MetError::BadCalculation)
}

#[cfg(test)]
mod tests {
    use super::*;
    use float_cmp::approx_eq;

    #[test]
    fn standard_atmosphere_is_self_inverse() {
        for alt in [0.5, 5.0, 11.3, 25.0, 60.0] {
            let p = std_atm_pressure(alt).unwrap();
            let z = std_atm_palt(p).unwrap();
            assert!(approx_eq!(Float, z, alt, epsilon = 1.0e-6));
        }
    }

    #[test]
    fn surface_pressure_is_near_one_atmosphere() {
        let p = std_atm_pressure(0.0).unwrap();
        assert!((p - 101_325.0).abs() < 500.0);
    }

    #[test]
    fn out_of_table_altitudes_are_rejected() {
        assert!(std_atm_pressure(-1.0).is_err());
        assert!(std_atm_pressure(100.0).is_err());
        assert!(std_atm_palt(-10.0).is_err());
        assert!(std_atm_dzdp(95.0).is_err());
    }

    #[test]
    fn dzdp_is_negative_and_grows_with_altitude() {
        let low = std_atm_dzdp(1.0).unwrap();
        let high = std_atm_dzdp(30.0).unwrap();

        assert!(low < 0.0 && high < 0.0);
        assert!(high.abs() > low.abs());
    }
}
