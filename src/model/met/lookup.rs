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

//! Archive catalog lookup and snapshot-time bracketing.
//!
//! A quantity is published by the archive on one or more grid/time
//! layouts. The caller states a preference (each dimension an exact
//! code or a don't-care) and a strictness policy; a miss on the
//! preferred layout falls back to relaxed preferences dimension by
//! dimension, skipping dimensions the policy marks strict.

use crate::constants::TICK_EPSILON_SECS;
use crate::errors::MetError;
use crate::model::met::archive::{ArchiveMatch, MetArchive};
use crate::Float;
use chrono::{Duration, NaiveDateTime};
use rustc_hash::FxHashMap;
use serde::Deserialize;

/// Which layout dimensions must match the preference exactly.
/// A strict dimension is never relaxed during fallback.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Strictness {
    pub horizontal: bool,
    pub vertical: bool,
    pub time_spacing: bool,
    pub time_averaging: bool,
}

/// A desired layout; `None` in a dimension means don't-care.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct GridPreference {
    pub vertical: Option<i32>,
    pub horizontal: Option<i32>,
    pub time_spacing: Option<i32>,
    pub time_averaging: Option<i32>,
}

impl GridPreference {
    /// True iff a published layout satisfies this preference.
    pub fn admits(&self, m: &ArchiveMatch) -> bool {
        fn dim(want: Option<i32>, got: i32) -> bool {
            want.map_or(true, |w| w == got)
        }

        dim(self.vertical, m.vertical)
            && dim(self.horizontal, m.horizontal)
            && dim(self.time_spacing, m.time_spacing)
            && dim(self.time_averaging, m.time_averaging)
    }
}

/// Memoizing layout resolver.
///
/// Resolutions are remembered per quantity and calendar day together
/// with the preference they were made under; a repeat query with the
/// same preference is served from the memo, a query with a different
/// preference bypasses and replaces the memo entry.
#[derive(Clone, Default)]
pub struct Lookup {
    memo: FxHashMap<(String, chrono::NaiveDate), (GridPreference, ArchiveMatch)>,
}

impl Lookup {
    pub fn new() -> Self {
        Lookup::default()
    }

    /// Resolves the layout to read `quantity` from at `date`.
    ///
    /// Tries the full preference first, then relaxes non-strict
    /// dimensions one at a time in the order time averaging, time
    /// spacing, horizontal, vertical, then all of them together.
    pub fn resolve(
        &mut self,
        archive: &dyn MetArchive,
        quantity: &str,
        date: NaiveDateTime,
        want: &GridPreference,
        strict: &Strictness,
    ) -> Result<ArchiveMatch, MetError> {
        let key = (quantity.to_owned(), date.date());

        if let Some((memo_want, hit)) = self.memo.get(&key) {
            if memo_want == want {
                return Ok(hit.clone());
            }
        }

        for pref in relaxation_ladder(want, strict) {
            if let Some(m) = archive.query(quantity, date, &pref) {
                debug_assert!(pref.admits(&m));
                self.memo.insert(key, (*want, m.clone()));
                return Ok(m);
            }
        }

        Err(MetError::QuantityNotFound(quantity.to_owned()))
    }
}

fn relaxation_ladder(want: &GridPreference, strict: &Strictness) -> Vec<GridPreference> {
    let mut ladder = vec![*want];

    let mut push = |p: GridPreference| {
        if !ladder.contains(&p) {
            ladder.push(p);
        }
    };

    if !strict.time_averaging {
        let mut p = *want;
        p.time_averaging = None;
        push(p);
    }
    if !strict.time_spacing {
        let mut p = *want;
        p.time_spacing = None;
        push(p);
    }
    if !strict.horizontal {
        let mut p = *want;
        p.horizontal = None;
        push(p);
    }
    if !strict.vertical {
        let mut p = *want;
        p.vertical = None;
        push(p);
    }

    let mut all = *want;
    if !strict.time_averaging {
        all.time_averaging = None;
    }
    if !strict.time_spacing {
        all.time_spacing = None;
    }
    if !strict.horizontal {
        all.horizontal = None;
    }
    if !strict.vertical {
        all.vertical = None;
    }
    push(all);

    ladder
}

/// The pair of archive snapshot times surrounding `date` for a layout
/// whose snapshots fall every `spacing_hours` starting `base_minutes`
/// after midnight.
///
/// A date within 15 seconds after a snapshot counts as exactly on it
/// and both ends of the bracket collapse to that snapshot; any other
/// date gets the full bracket, one spacing wide.
pub fn bracket(
    date: NaiveDateTime,
    base_minutes: i64,
    spacing_hours: i64,
) -> (NaiveDateTime, NaiveDateTime) {
    let spacing = spacing_hours.max(1) * 3600;
    let offset = base_minutes * 60;

    let midnight = date.date().and_hms(0, 0, 0);
    let elapsed = (date - midnight).num_seconds() - offset;

    let t1 = midnight + Duration::seconds(offset + elapsed.div_euclid(spacing) * spacing);
    let t2 = t1 + Duration::seconds(spacing);

    if (date - t1).num_seconds().abs() <= TICK_EPSILON_SECS {
        (t1, t1)
    } else {
        (t1, t2)
    }
}

/// Linear time-interpolation weight of `date` inside a bracket;
/// 0 at `t1`, 1 at `t2`, and 0 for a collapsed bracket.
pub fn bracket_weight(date: NaiveDateTime, t1: NaiveDateTime, t2: NaiveDateTime) -> Float {
    if t2 <= t1 {
        return 0.0;
    }

    (date - t1).num_seconds() as Float / (t2 - t1).num_seconds() as Float
}
