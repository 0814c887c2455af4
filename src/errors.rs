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

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ModelError {
    #[error("Error while reading config.yaml: {0}")]
    Config(#[from] ConfigError),

    #[error("Error while creating ThreadPool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),

    #[error("Error while fetching met data: {0}")]
    Met(#[from] MetError),

    #[error("Output handling failed: {0}")]
    FaultyOutput(&'static str),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Error while writing manifest: {0}")]
    Manifest(#[from] csv::Error),
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Cannot open config.yaml: {0}")]
    CantOpenFile(#[from] std::io::Error),

    #[error("Cannot deserialize config.yaml: {0}")]
    CantDeserialize(#[from] serde_yaml::Error),

    #[error("Configuration component is out of bounds: {0}")]
    OutOfBounds(&'static str),
}

/// Errors raised by the met-data core.
///
/// Every failure mode of lookup, bracketing and on-the-fly
/// derivation is one of these variants; they propagate unmodified
/// to the top-level fetch caller and no partial field is ever
/// returned alongside one.
#[derive(Error, Debug)]
pub enum MetError {
    /// Inputs to a calculator do not share a grid layout.
    #[error("Input fields are not grid-compatible")]
    BadGrid,

    /// Calculator inputs match none of its supported formula variants.
    #[error("Unrecognized combination of input quantities")]
    BadInputQuantity,

    /// Lookup failed even after strictness relaxation.
    #[error("Quantity {0} not found in the archive")]
    QuantityNotFound(String),

    /// The requested vertical coordinate system is not supported.
    #[error("Unsupported vertical coordinate: {0}")]
    BadVerticalCoord(String),

    /// The requested evaluation surface is not supported.
    #[error("Unsupported surface: {0}")]
    BadSurface(String),

    /// The `nodataload` sentinel quantity, which always fails.
    #[error("Synthetic no-data-load failure")]
    DataLoadFailed,

    /// A value fell outside the standard-atmosphere table.
    #[error("Value outside the standard atmosphere table")]
    BadCalculation,

    #[error("Cache file I/O failed: {0}")]
    CacheIo(#[from] std::io::Error),

    #[error("Cache file is damaged: {0}")]
    CacheFormat(#[from] serde_json::Error),
}
