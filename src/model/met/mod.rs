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

//! Meteorological data layer: quantity registry, gridded field
//! containers, derived-field calculators, archive catalog lookup, and
//! the caching data-source facade tying them together.

pub mod archive;
pub mod calc;
pub mod gridfield;
pub mod lookup;
pub mod registry;
pub mod source;

pub use archive::{ArchiveMatch, MerraArchive, MetArchive};
pub use gridfield::{reconcile, GridField3D, GridFieldSfc};
pub use lookup::{bracket, GridPreference, Lookup, Strictness};
pub use source::MetSource;
