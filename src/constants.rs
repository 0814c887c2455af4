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

//! Module containing constants used by the model.

use crate::Float;

/// Reference pressure of the Poisson relation, in Pa.
pub const P0: Float = 100_000.0;

/// Poisson exponent `R/cp` for dry air.
pub const KAPPA: Float = 2.0 / 7.0;

/// Gas constant for dry air, in J/(kg K).
pub const R_DRY: Float = 287.04;

/// Tolerance (in seconds) within which a requested time counts
/// as falling exactly on an archive time tick.
pub const TICK_EPSILON_SECS: i64 = 15;

/// US standard atmosphere reference altitudes, in km.
#[allow(clippy::excessive_precision)]
pub const STD_ATM_Z: [Float; 70] = [
    0.00, 1.00, 2.00, 3.00, 4.00, 5.00, 6.00, 7.00, 8.00, 9.00, 10.0, 11.0, 12.0, 13.0, 14.0,
    15.0, 16.0, 17.0, 18.0, 19.0, 20.0, 21.0, 22.0, 23.0, 24.0, 25.0, 26.0, 27.0, 28.0, 29.0,
    30.0, 31.0, 32.0, 33.0, 34.0, 35.0, 36.0, 37.0, 38.0, 39.0, 40.0, 41.0, 42.0, 43.0, 44.0,
    45.0, 46.0, 47.0, 48.0, 49.0, 50.0, 51.0, 52.0, 53.0, 54.0, 55.0, 56.0, 57.0, 58.0, 59.0,
    60.0, 61.0, 62.0, 63.0, 64.0, 65.0, 66.0, 67.0, 68.0, 69.0,
];

/// Natural log of US standard atmosphere pressure (in Pa) at each
/// altitude of [`STD_ATM_Z`].
#[allow(clippy::excessive_precision)]
pub const STD_ATM_LOG_P: [Float; 70] = [
    11.5261, 11.4062, 11.2835, 11.1578, 11.0291, 10.8971, 10.7617, 10.6228, 10.4801, 10.3334,
    10.1825, 10.0271, 9.86943, 9.71175, 9.55406, 9.39637, 9.23868, 9.08099, 8.92330, 8.76562,
    8.60793, 8.45060, 8.29400, 8.13811, 7.98292, 7.82845, 7.67466, 7.52157, 7.36915, 7.21742,
    7.06635, 6.91595, 6.76621, 6.61771, 6.47099, 6.32601, 6.18274, 6.04113, 5.90114, 5.76274,
    5.62590, 5.49057, 5.35673, 5.22434, 5.09337, 4.96379, 4.83557, 4.70869, 4.58246, 4.45623,
    4.33001, 4.20378, 4.07690, 3.94868, 3.81910, 3.68813, 3.55574, 3.42190, 3.28657, 3.14972,
    3.01132, 2.87134, 2.72973, 2.58645, 2.44148, 2.29476, 2.14625, 1.99592, 1.84371, 1.68958,
];

/// Natural log of the magnitude of the US standard atmosphere
/// `dz/dp` derivative (in km/hPa) at each altitude of [`STD_ATM_Z`].
/// The derivative itself is negative (pressure falls with height).
#[allow(clippy::excessive_precision)]
pub const STD_ATM_LOG_DZDP: [Float; 70] = [
    -4.79626, -4.68790, -4.58836, -4.48643, -4.38200, -4.27493, -4.16509, -4.05234, -3.93651,
    -3.81744, -3.69492, -3.56036, -3.40889, -3.25120, -3.09351, -2.93582, -2.77813, -2.62045,
    -2.46276, -2.30507, -2.14607, -1.98517, -1.82406, -1.66368, -1.50403, -1.34511, -1.18688,
    -1.02939, -0.872589, -0.716475, -0.561058, -0.406319, -0.250038, -0.0911927, 0.0673624,
    0.224037, 0.378872, 0.531911, 0.683210, 0.832789, 0.980690, 1.12696, 1.27163, 1.41473,
    1.55630, 1.69636, 1.83497, 1.96922, 2.09768, 2.22390, 2.35013, 2.47347, 2.59231, 2.71012,
    2.82918, 2.94952, 3.07118, 3.19416, 3.31852, 3.44427, 3.57145, 3.70010, 3.83024, 3.96191,
    4.09514, 4.23000, 4.36648, 4.50465, 4.64457, 4.76667,
];
