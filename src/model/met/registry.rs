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

//! Static registry of physical quantity names.
//!
//! Every quantity is known under a native (archive-convention) name
//! and a CF-standard name, and the two are synonyms everywhere a
//! quantity name is compared or looked up. For quantities that the
//! archive does not carry directly, the registry also declares the
//! probe set of raw quantities whose availability decides whether the
//! derived quantity is obtainable at a given time.

/// Native name of air temperature.
pub const TEMPERATURE: &str = "T";
/// Native name of air pressure (derived on pressure-level archives).
pub const PRESSURE: &str = "P";
/// Native name of potential temperature (always derived).
pub const THETA: &str = "Theta";
/// Native name of the potential-temperature tendency (net heating rate).
pub const THETA_DOT: &str = "ThetaDot";
/// Native name of the total temperature tendency.
pub const T_TENDENCY: &str = "DTDTTOT";
/// Native name of the pressure tendency.
pub const OMEGA: &str = "OMEGA";
/// Native name of the vertical velocity (pressure-altitude tendency).
pub const W: &str = "W";
/// Native name of pressure altitude (always derived).
pub const PALT: &str = "PAlt";
/// Native name of the eastward wind component.
pub const EASTWARD_WIND: &str = "U";
/// Native name of the northward wind component.
pub const NORTHWARD_WIND: &str = "V";
/// Native name of air density.
pub const DENSITY: &str = "RHO";
/// Native name of the layer pressure thickness.
pub const THICKNESS: &str = "DELP";
/// Native name of surface pressure (2D).
pub const SURFACE_PRESSURE: &str = "PS";
/// Vertical coordinate name of model-level-index archives.
pub const MODEL_LEVELS: &str = "Model-Levels";

/// Sentinel quantity whose fetch always fails; used to exercise the
/// error-handling path in tests.
pub const NO_DATA_LOAD: &str = "nodataload";

/// Synonym groups; the first entry of each group is the native name,
/// the rest are CF-standard (or historical) equivalents.
static SYNONYMS: &[&[&str]] = &[
    &[TEMPERATURE, "air_temperature"],
    &[PRESSURE, "air_pressure"],
    &[THETA, "air_potential_temperature"],
    &[
        THETA_DOT,
        "tendency_of_air_potential_temperature",
        "net_heating_rate",
    ],
    &[T_TENDENCY, "tendency_of_air_temperature"],
    &[OMEGA, "lagrangian_tendency_of_air_pressure"],
    &[W, "upward_air_velocity", "tendency_of_pressure_altitude"],
    &[PALT, "pressure_altitude"],
    &[EASTWARD_WIND, "eastward_wind"],
    &[NORTHWARD_WIND, "northward_wind"],
    &[DENSITY, "air_density"],
    &[THICKNESS, "air_layer_pressure_thickness"],
    &[SURFACE_PRESSURE, "surface_air_pressure"],
];

fn group_of(name: &str) -> Option<&'static [&'static str]> {
    SYNONYMS
        .iter()
        .find(|group| group.contains(&name))
        .copied()
}

/// True iff the two names denote the same physical quantity,
/// resolving native/CF synonyms.
pub fn same(a: &str, b: &str) -> bool {
    if a == b {
        return true;
    }

    match group_of(a) {
        Some(group) => group.contains(&b),
        None => false,
    }
}

/// Canonical native name for a quantity; unknown names pass through.
pub fn native(name: &str) -> &str {
    match group_of(name) {
        Some(group) => group[0],
        None => name,
    }
}

/// True iff the quantity is synthesized on the fly rather than read
/// directly from the archive.
pub fn is_derived(name: &str) -> bool {
    matches!(native(name), PRESSURE | THETA | THETA_DOT | W | PALT)
}

/// Minimal raw-quantity probe set for a quantity.
///
/// The probes are used purely to test availability (and to resolve the
/// archive time axis), not to drive fetching; the facade declares its
/// own dependency recipe. Unknown quantities are assumed raw and probe
/// for themselves.
pub fn test_names(name: &str) -> Vec<&str> {
    match native(name) {
        // theta, pressure and pressure altitude all reduce to
        // temperature availability on this kind of archive
        THETA | PRESSURE | PALT => vec![TEMPERATURE],
        THETA_DOT => vec![TEMPERATURE, T_TENDENCY],
        W => vec![OMEGA],
        _ => vec![name],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn native_and_cf_names_are_synonyms() {
        assert!(same("T", "air_temperature"));
        assert!(same("air_temperature", "T"));
        assert!(same("ThetaDot", "net_heating_rate"));
        assert!(!same("T", "air_pressure"));
    }

    #[test]
    fn unknown_quantities_pass_through() {
        assert_eq!(native("QV"), "QV");
        assert!(!is_derived("QV"));
        assert_eq!(test_names("QV"), vec!["QV"]);
    }

    #[test]
    fn derived_quantities_are_recognized_under_both_conventions() {
        assert!(is_derived("Theta"));
        assert!(is_derived("air_potential_temperature"));
        assert!(is_derived("upward_air_velocity"));
        assert!(!is_derived("T"));
    }

    #[test]
    fn probe_sets_match_the_derivation_recipes() {
        assert_eq!(test_names("Theta"), vec![TEMPERATURE]);
        assert_eq!(test_names("net_heating_rate"), vec![TEMPERATURE, T_TENDENCY]);
        assert_eq!(test_names("upward_air_velocity"), vec![OMEGA]);
    }
}
