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

//! gridtraj is an atmospheric trajectory model core: it feeds parcel
//! advection with wind and thermodynamic fields taken from a gridded
//! meteorological archive, deriving on the fly the quantities (potential
//! temperature, pressure, net heating rate, pressure altitude) that the
//! archive does not carry directly.
//!
//! The shipped binary is a met-cache filler: it walks a range of archive
//! time ticks, fetches the requested quantities through the full
//! derivation pipeline, and leaves the results in the disk cache for a
//! subsequent trajectory run.

mod constants;
mod errors;
mod model;

use cap::Cap;
use env_logger::Env;
use log::{error, info};
use std::alloc;

type Float = f64;

/// Global allocator used by the model.
///
/// Use of static global allocator allows for capping the memory to the limit set by user
/// in configuration file and in effect provide better [OOM error](https://en.wikipedia.org/wiki/Out_of_memory) handling.
#[global_allocator]
static ALLOCATOR: Cap<alloc::System> = Cap::new(alloc::System, usize::MAX);

/// The main program function.
/// Prepares the runtime environment and calls the [`model::main`].
///
/// To provide meaningful and high-quality error messages the `env_logger`
/// needs to be initiated before any log messages are possible to occur.
fn main() {
    #[cfg(not(feature = "debug"))]
    let logger_env = Env::new().filter_or("GRIDTRAJ_LOG_LEVEL", "info");

    #[cfg(feature = "debug")]
    let logger_env = Env::new().filter_or("GRIDTRAJ_LOG_LEVEL", "debug");

    env_logger::Builder::from_env(logger_env)
        .format_timestamp_millis()
        .init();

    match model::main() {
        Ok(_) => info!("Cache filling finished. Check the cache directory and log."),
        Err(err) => error!("Cache filling failed with error: {}", err),
    }
}
