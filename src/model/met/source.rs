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

//! Data-source facade.
//!
//! [`MetSource`] is the single entry point for gridded met data. A
//! fetch of a raw quantity resolves its archive layout (with grid
//! fallback), consults the on-disk cache, and only then reads from the
//! archive; a fetch of a derived quantity recursively fetches its
//! dependencies through a plain clone of the facade and runs the
//! matching calculator, reconciling dependency grids when the archive
//! publishes them at different resolutions.

use crate::errors::MetError;
use crate::model::met::archive::{ArchiveMatch, MetArchive};
use crate::model::met::calc::{palt, palt_dot, pressure, theta, theta_dot};
use crate::model::met::gridfield::{reconcile, GridField3D, GridFieldSfc};
use crate::model::met::lookup::{self, GridPreference, Lookup, Strictness};
use crate::model::met::registry;
use chrono::NaiveDateTime;
use log::{debug, info, warn};
use rand::Rng;
use std::fs;
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};
use std::sync::Arc;

#[derive(Clone)]
pub struct MetSource {
    archive: Arc<dyn MetArchive>,
    lookup: Lookup,
    pref: GridPreference,
    strict: Strictness,
    cache_dir: Option<PathBuf>,
    cache_lifetime: Option<chrono::Duration>,
    vertical: String,
    thin_skip: usize,
    thin_offset: usize,
    workers: usize,
    time_base_override: Option<i32>,
    time_spacing_override: Option<i32>,
}

impl MetSource {
    pub fn new(archive: Arc<dyn MetArchive>) -> Self {
        MetSource {
            archive,
            lookup: Lookup::new(),
            pref: GridPreference::default(),
            strict: Strictness::default(),
            cache_dir: None,
            cache_lifetime: None,
            vertical: registry::PRESSURE.to_owned(),
            thin_skip: 1,
            thin_offset: 0,
            workers: 1,
            time_base_override: None,
            time_spacing_override: None,
        }
    }

    pub fn set_preference(&mut self, pref: GridPreference) {
        self.pref = pref;
    }

    pub fn set_strictness(&mut self, strict: Strictness) {
        self.strict = strict;
    }

    pub fn set_cache_dir<P: Into<PathBuf>>(&mut self, dir: P) {
        self.cache_dir = Some(dir.into());
    }

    /// How long freshly read snapshots stay valid on disk; `None`
    /// means they never go stale.
    pub fn set_cache_lifetime(&mut self, hours: Option<i64>) {
        self.cache_lifetime = hours.map(chrono::Duration::hours);
    }

    /// Selects the vertical coordinate system fields are served on.
    ///
    /// The name is checked here, before any fetch; the supported
    /// archives publish their 3D products on pressure levels only.
    pub fn set_vertical(&mut self, name: &str) -> Result<(), MetError> {
        if !registry::same(name, registry::PRESSURE) {
            return Err(MetError::BadVerticalCoord(name.to_owned()));
        }

        self.vertical = registry::PRESSURE.to_owned();
        Ok(())
    }

    pub fn set_thinning(&mut self, skip: usize, offset: usize) {
        self.thin_skip = skip;
        self.thin_offset = offset;
    }

    /// Number of concurrent workers sharing the archive; more than
    /// three triggers a randomized access delay.
    pub fn set_workers(&mut self, workers: usize) {
        self.workers = workers;
    }

    /// Overrides the catalog's snapshot time base (minutes after
    /// midnight) and spacing (hours) for bracketing.
    pub fn set_time_overrides(&mut self, base_minutes: Option<i32>, spacing_hours: Option<i32>) {
        self.time_base_override = base_minutes;
        self.time_spacing_override = spacing_hours;
    }

    /// A copy of this facade with default grid preferences, used for
    /// recursive dependency fetches so a caller's layout preference
    /// does not constrain what the recipes read.
    pub fn plain_clone(&self) -> Self {
        let mut plain = self.clone();
        plain.pref = GridPreference::default();
        plain.strict = Strictness::default();
        plain
    }

    /// The archive snapshot times surrounding `date` for the layout
    /// `quantity` would be read from. Derived quantities bracket by
    /// proxy, through the first quantity of their availability probe
    /// set.
    pub fn bracket(
        &mut self,
        quantity: &str,
        date: NaiveDateTime,
    ) -> Result<(NaiveDateTime, NaiveDateTime), MetError> {
        let probes = registry::test_names(quantity);
        let probe = registry::native(probes[0]);

        let layout =
            self.lookup
                .resolve(self.archive.as_ref(), probe, date, &self.pref, &self.strict)?;

        let base = self.time_base_override.unwrap_or(layout.time_base) as i64;
        let spacing = self.time_spacing_override.unwrap_or(layout.time_spacing) as i64;

        Ok(lookup::bracket(date, base, spacing))
    }

    /// All archive snapshot times for `quantity` inside the inclusive
    /// `[start, end]` period, on the same layout [`bracket`] uses.
    ///
    /// [`bracket`]: MetSource::bracket
    pub fn snapshot_times(
        &mut self,
        quantity: &str,
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> Result<Vec<NaiveDateTime>, MetError> {
        let probes = registry::test_names(quantity);
        let probe = registry::native(probes[0]);

        let layout = self.lookup.resolve(
            self.archive.as_ref(),
            probe,
            start,
            &self.pref,
            &self.strict,
        )?;

        let base = self.time_base_override.unwrap_or(layout.time_base) as i64;
        let spacing = (self.time_spacing_override.unwrap_or(layout.time_spacing) as i64).max(1);

        let (t1, t2) = lookup::bracket(start, base, spacing);
        // a bracket collapsed onto the start time may sit up to the
        // tick epsilon before it; that snapshot still counts
        let first = if t1 >= start || t1 == t2 { t1 } else { t2 };
        let step = chrono::Duration::hours(spacing);

        let mut ticks = Vec::new();
        let mut tick = first;
        while tick <= end {
            ticks.push(tick);
            tick += step;
        }

        Ok(ticks)
    }

    /// Fetches a 3D field, deriving it on the fly when the archive
    /// does not carry it directly.
    pub fn fetch_3d(
        &mut self,
        quantity: &str,
        date: NaiveDateTime,
    ) -> Result<GridField3D, MetError> {
        match registry::native(quantity) {
            registry::NO_DATA_LOAD => Err(MetError::DataLoadFailed),
            registry::THETA => {
                let t = self.plain_clone().fetch_3d(registry::TEMPERATURE, date)?;
                let p = pressure::calc_single(&t, None)?;
                theta::calc(&t, &p)
            }
            registry::PRESSURE => {
                let t = self.plain_clone().fetch_3d(registry::TEMPERATURE, date)?;
                pressure::calc_single(&t, None)
            }
            registry::PALT => {
                let t = self.plain_clone().fetch_3d(registry::TEMPERATURE, date)?;
                palt::calc_single(&t)
            }
            registry::W => {
                let omega = self.plain_clone().fetch_3d(registry::OMEGA, date)?;
                palt_dot::calc_single(&omega)
            }
            registry::THETA_DOT => {
                let mut inner = self.plain_clone();
                let th = inner.fetch_3d(registry::THETA, date)?;
                let mut dtdt = inner.fetch_3d(registry::T_TENDENCY, date)?;

                if !dtdt.compatible(&th) {
                    debug!(
                        "regridding {} onto the {} grid for the heating rate",
                        dtdt.quantity, th.quantity
                    );
                    dtdt = reconcile(&dtdt, &th)?;
                }

                theta_dot::calc2(&dtdt, &th)
            }
            native => self.fetch_raw_3d(native, date),
        }
    }

    /// Fetches a 2D field on a named surface. The quantity may carry
    /// the surface as a `@`-suffix (e.g. `PS@sfc`); only the `sfc`
    /// surface is supported.
    pub fn fetch_sfc(
        &mut self,
        quantity: &str,
        date: NaiveDateTime,
    ) -> Result<GridFieldSfc, MetError> {
        let (name, surface) = split_surface(quantity)?;

        match registry::native(name) {
            registry::NO_DATA_LOAD => Err(MetError::DataLoadFailed),
            registry::PALT => {
                let ps = self
                    .plain_clone()
                    .fetch_raw_sfc(registry::SURFACE_PRESSURE, surface, date)?;
                palt::calc_sfc(&ps)
            }
            registry::THETA => {
                let mut inner = self.plain_clone();
                let t = inner.fetch_raw_sfc(registry::TEMPERATURE, surface, date)?;
                let p = inner.fetch_raw_sfc(registry::SURFACE_PRESSURE, surface, date)?;
                theta::calc_sfc(&t, &p)
            }
            native => self.fetch_raw_sfc(native, surface, date),
        }
    }

    fn fetch_raw_3d(
        &mut self,
        quantity: &str,
        date: NaiveDateTime,
    ) -> Result<GridField3D, MetError> {
        let layout =
            self.lookup
                .resolve(self.archive.as_ref(), quantity, date, &self.pref, &self.strict)?;

        if !self.pref.admits(&layout) {
            info!(
                "{} at {} served from fallback layout {}",
                quantity, date, layout.locator
            );
        }

        let path = self.cachefile(quantity, date, &format!("3D_{}", vertical_name(&layout)));

        if let Some(p) = &path {
            if let Some(cached) = read_cache_3d(p)? {
                debug!("cache hit for {} at {}", quantity, date);
                return Ok(cached);
            }
        }

        self.delay();
        let mut field = self
            .archive
            .read_3d(quantity, date, &layout)?
            .thin(self.thin_skip, self.thin_offset);
        field.expires = self.expiry();

        if let Some(p) = &path {
            if let Err(e) = write_cache(p, &field) {
                warn!("could not write cache file {}: {}", p.display(), e);
            }
        }

        Ok(field)
    }

    fn fetch_raw_sfc(
        &mut self,
        quantity: &str,
        surface: &str,
        date: NaiveDateTime,
    ) -> Result<GridFieldSfc, MetError> {
        // a quantity published both in 3D and as a surface product
        // (e.g. temperature) must resolve to the 2D layout here
        let mut want = self.pref;
        want.vertical = Some(crate::model::met::archive::VGRID_SURFACE);

        let layout =
            self.lookup
                .resolve(self.archive.as_ref(), quantity, date, &want, &self.strict)?;

        let path = self.cachefile(quantity, date, &format!("Sfc{}", surface));

        if let Some(p) = &path {
            if let Some(cached) = read_cache_sfc(p)? {
                debug!("cache hit for {}@{} at {}", quantity, surface, date);
                return Ok(cached);
            }
        }

        self.delay();
        let mut field = self
            .archive
            .read_sfc(quantity, surface, date, &layout)?
            .thin(self.thin_skip, self.thin_offset);
        field.expires = self.expiry();

        if let Some(p) = &path {
            if let Err(e) = write_cache(p, &field) {
                warn!("could not write cache file {}: {}", p.display(), e);
            }
        }

        Ok(field)
    }

    /// Cache-file path for one snapshot, or `None` when caching is
    /// off. Files sit under `Y<year>/M<month>/D<day>` subdirectories
    /// and carry the archive tag, the quantity, the ISO timestamp, the
    /// read flags (`B`, with `R:skip[:offset]` appended when
    /// thinning), and the grid kind.
    fn cachefile(&self, quantity: &str, date: NaiveDateTime, kind: &str) -> Option<PathBuf> {
        let dir = self.cache_dir.as_ref()?;

        let mut flags = String::from("B");
        if self.thin_skip > 1 {
            flags.push_str(&format!("R:{}", self.thin_skip));
            if self.thin_offset > 0 {
                flags.push_str(&format!(":{}", self.thin_offset));
            }
        }

        Some(
            dir.join(format!("Y{}", date.format("%Y")))
                .join(format!("M{}", date.format("%m")))
                .join(format!("D{}", date.format("%d")))
                .join(format!(
                    "{}_{}_{}_{}_{}.cache",
                    self.archive.tag(),
                    quantity,
                    date.format("%Y-%m-%dT%H:%M"),
                    flags,
                    kind
                )),
        )
    }

    fn expiry(&self) -> Option<NaiveDateTime> {
        self.cache_lifetime
            .map(|lifetime| chrono::Utc::now().naive_utc() + lifetime)
    }

    /// Spreads concurrent archive access out in time. Remote portals
    /// throttle bursts of simultaneous opens, so with more than three
    /// workers each read first sleeps a random interval proportional
    /// to the worker count.
    fn delay(&self) {
        if self.workers <= 3 {
            return;
        }

        let max_secs = self.workers / 3 * 6;
        let secs = rand::thread_rng().gen_range(0..=max_secs);
        if secs > 0 {
            debug!("delaying archive access by {} s", secs);
            std::thread::sleep(std::time::Duration::from_secs(secs as u64));
        }
    }
}

fn vertical_name(layout: &ArchiveMatch) -> &'static str {
    // vertical grid code 2 is pressure levels; nothing else is
    // published by the supported archives
    match layout.vertical {
        2 => "P",
        _ => "L",
    }
}

fn split_surface(quantity: &str) -> Result<(&str, &str), MetError> {
    match quantity.split_once('@') {
        None => Ok((quantity, "sfc")),
        Some((name, "sfc")) => Ok((name, "sfc")),
        Some((_, other)) => Err(MetError::BadSurface(other.to_owned())),
    }
}

fn read_cache_3d(path: &Path) -> Result<Option<GridField3D>, MetError> {
    if !path.exists() {
        return Ok(None);
    }

    let file = fs::File::open(path)?;
    let field: GridField3D = serde_json::from_reader(BufReader::new(file))?;

    if let Some(expiry) = field.expires {
        if expiry <= chrono::Utc::now().naive_utc() {
            debug!("cache file {} has expired", path.display());
            return Ok(None);
        }
    }

    Ok(Some(field))
}

fn read_cache_sfc(path: &Path) -> Result<Option<GridFieldSfc>, MetError> {
    if !path.exists() {
        return Ok(None);
    }

    let file = fs::File::open(path)?;
    let field: GridFieldSfc = serde_json::from_reader(BufReader::new(file))?;

    if let Some(expiry) = field.expires {
        if expiry <= chrono::Utc::now().naive_utc() {
            debug!("cache file {} has expired", path.display());
            return Ok(None);
        }
    }

    Ok(Some(field))
}

fn write_cache<T: serde::Serialize>(path: &Path, field: &T) -> Result<(), MetError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    let file = fs::File::create(path)?;
    serde_json::to_writer(BufWriter::new(file), field)?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::met::archive::MerraArchive;
    use crate::model::met::calc::theta::poisson;
    use crate::Float;
    use chrono::NaiveDate;
    use float_cmp::approx_eq;

    fn source() -> MetSource {
        MetSource::new(Arc::new(MerraArchive::new()))
    }

    fn d(h: u32, m: u32) -> NaiveDateTime {
        NaiveDate::from_ymd(2021, 7, 15).and_hms(h, m, 0)
    }

    #[test]
    fn raw_fetch_reads_from_the_archive() {
        let mut src = source();

        let t = src.fetch_3d("T", d(12, 0)).unwrap();

        assert_eq!(t.quantity, "T");
        assert_eq!(t.vertical, "P");
        assert!(t.data[[0, 45, 10]] > 200.0);
    }

    #[test]
    fn theta_is_derived_from_temperature_and_levels() {
        let mut src = source();

        let t = src.fetch_3d("T", d(12, 0)).unwrap();
        let th = src.fetch_3d("Theta", d(12, 0)).unwrap();

        assert_eq!(th.quantity, "air_potential_temperature");

        let k = 16; // 500 hPa
        let expect = poisson(t.data[[k, 45, 10]], t.levels()[k] * 100.0);
        assert!(approx_eq!(Float, th.data[[k, 45, 10]], expect, ulps = 4));
    }

    #[test]
    fn pressure_and_pressure_altitude_come_from_the_level_axis() {
        let mut src = source();

        let p = src.fetch_3d("P", d(12, 0)).unwrap();
        let z = src.fetch_3d("PAlt", d(12, 0)).unwrap();

        assert!(approx_eq!(Float, p.data[[0, 0, 0]], 1000.0, ulps = 2));
        assert!(approx_eq!(Float, p.mks_scale, 100.0, ulps = 2));
        // 100 hPa sits near 16 km in the standard atmosphere
        assert!((z.data[[24, 45, 10]] - 16.0).abs() < 0.5);
    }

    #[test]
    fn heating_rate_reconciles_the_coarse_tendency_grid() {
        let mut src = source();

        let th = src.fetch_3d("Theta", d(12, 0)).unwrap();
        let td = src.fetch_3d("ThetaDot", d(12, 0)).unwrap();

        assert_eq!(td.quantity, "tendency_of_air_potential_temperature");
        assert!(td.compatible(&th));

        // interior points are derived, not fill
        let v = td.data[[10, 45, 72]];
        assert_ne!(v, td.fillval);
        // heating rates are small numbers in K/s
        assert!(v.abs() < 1.0e-3);

        // the easternmost fine column lies past the coarse grid's
        // last longitude; the seam wrap still derives it
        let east = td.data[[10, 45, th.lons().len() - 1]];
        assert_ne!(east, td.fillval);
        assert!(east.abs() < 1.0e-3);
    }

    #[test]
    fn vertical_velocity_is_derived_from_omega() {
        let mut src = source();

        let w = src.fetch_3d("W", d(12, 0)).unwrap();

        assert_eq!(w.quantity, "upward_air_velocity");
        assert_eq!(w.units, "m/s");
    }

    #[test]
    fn the_nodataload_quantity_always_fails() {
        let mut src = source();

        assert!(matches!(
            src.fetch_3d("nodataload", d(12, 0)),
            Err(MetError::DataLoadFailed)
        ));
        assert!(matches!(
            src.fetch_sfc("nodataload@sfc", d(12, 0)),
            Err(MetError::DataLoadFailed)
        ));
    }

    #[test]
    fn unknown_quantities_are_reported_by_name() {
        let mut src = source();

        match src.fetch_3d("no_such_thing", d(12, 0)) {
            Err(MetError::QuantityNotFound(q)) => assert_eq!(q, "no_such_thing"),
            other => panic!("unexpected result: {:?}", other.map(|f| f.quantity)),
        }
    }

    #[test]
    fn surface_fetches_parse_the_surface_suffix() {
        let mut src = source();

        let ps = src.fetch_sfc("PS@sfc", d(12, 0)).unwrap();
        assert_eq!(ps.surface, "sfc");

        let z = src.fetch_sfc("PAlt@sfc", d(12, 0)).unwrap();
        // surface pressure altitudes sit near sea level
        assert!(z.data[[45, 10]].abs() < 1.0);

        assert!(matches!(
            src.fetch_sfc("T@trop", d(12, 0)),
            Err(MetError::BadSurface(s)) if s == "trop"
        ));
    }

    #[test]
    fn surface_theta_derives_from_2d_products() {
        let mut src = source();
        let date = d(12, 0);

        let t = src.fetch_sfc("T", date).unwrap();
        let ps = src.fetch_sfc("PS", date).unwrap();
        let th = src.fetch_sfc("Theta", date).unwrap();

        assert_eq!(th.quantity, "air_potential_temperature");
        assert!(approx_eq!(
            Float,
            th.data[[45, 10]],
            poisson(t.data[[45, 10]], ps.data[[45, 10]]),
            epsilon = 1.0e-9
        ));
    }

    #[test]
    fn thinning_subsamples_raw_reads() {
        let mut full = source();
        let mut thinned = source();
        thinned.set_thinning(3, 0);

        let a = full.fetch_3d("T", d(12, 0)).unwrap();
        let b = thinned.fetch_3d("T", d(12, 0)).unwrap();

        assert!(b.lats().len() < a.lats().len());
        assert_eq!(b.data[[0, 1, 0]], a.data[[0, 3, 0]]);
    }

    #[test]
    fn bracketing_follows_the_probe_quantity_layout() {
        let mut src = source();

        // temperature snapshots fall every 3 hours on the hour
        let (t1, t2) = src.bracket("Theta", d(10, 15)).unwrap();
        assert_eq!((t1, t2), (d(9, 0), d(12, 0)));

        let (t1, t2) = src.bracket("T", d(12, 0)).unwrap();
        assert_eq!((t1, t2), (d(12, 0), d(12, 0)));
    }

    #[test]
    fn snapshot_times_cover_the_period() {
        let mut src = source();

        let ticks = src.snapshot_times("T", d(0, 0), d(12, 0)).unwrap();
        assert_eq!(ticks, vec![d(0, 0), d(3, 0), d(6, 0), d(9, 0), d(12, 0)]);

        // a start between snapshots begins at the next one
        let ticks = src.snapshot_times("T", d(1, 0), d(7, 0)).unwrap();
        assert_eq!(ticks, vec![d(3, 0), d(6, 0)]);
    }

    #[test]
    fn bracketing_honors_time_overrides() {
        let mut src = source();
        src.set_time_overrides(Some(90), Some(6));

        let (t1, t2) = src.bracket("T", d(10, 15)).unwrap();
        assert_eq!((t1, t2), (d(7, 30), d(13, 30)));
    }

    #[test]
    fn only_pressure_vertical_coordinates_are_accepted() {
        let mut src = source();

        assert!(src.set_vertical("P").is_ok());
        assert!(src.set_vertical("air_pressure").is_ok());

        assert!(matches!(
            src.set_vertical("Theta"),
            Err(MetError::BadVerticalCoord(v)) if v == "Theta"
        ));
        assert!(matches!(
            src.set_vertical(registry::MODEL_LEVELS),
            Err(MetError::BadVerticalCoord(_))
        ));
    }

    #[test]
    fn cache_lifetime_tags_fresh_fields() {
        let mut src = source();

        let untagged = src.fetch_3d("T", d(12, 0)).unwrap();
        assert!(untagged.expires.is_none());

        src.set_cache_lifetime(Some(24));
        let tagged = src.fetch_3d("T", d(15, 0)).unwrap();

        let horizon = tagged.expires.unwrap();
        assert!(horizon > chrono::Utc::now().naive_utc());
    }

    #[test]
    fn cache_round_trip() {
        let dir = std::env::temp_dir().join(format!(
            "gridtraj-cache-test-{}-{:?}",
            std::process::id(),
            std::thread::current().id()
        ));

        let mut src = source();
        src.set_cache_dir(&dir);

        let a = src.fetch_3d("T", d(12, 0)).unwrap();

        let expected = dir
            .join("Y2021")
            .join("M07")
            .join("D15")
            .join("merra_T_2021-07-15T12:00_B_3D_P.cache");
        assert!(expected.is_file());

        // a fresh facade must serve the same data from disk
        let mut again = source();
        again.set_cache_dir(&dir);
        let b = again.fetch_3d("T", d(12, 0)).unwrap();

        assert!(a.compatible(&b));
        assert_eq!(a.data, b.data);

        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn cache_names_follow_the_archive_convention() {
        let mut src = source();
        src.set_cache_dir("/cache");

        let plain = src.cachefile("T", d(6, 0), "3D_P").unwrap();
        assert_eq!(
            plain,
            PathBuf::from("/cache/Y2021/M07/D15/merra_T_2021-07-15T06:00_B_3D_P.cache")
        );

        // thinning flags concatenate directly after the B marker
        src.set_thinning(3, 1);
        let thinned = src.cachefile("PS", d(6, 0), "Sfcsfc").unwrap();
        assert_eq!(
            thinned,
            PathBuf::from("/cache/Y2021/M07/D15/merra_PS_2021-07-15T06:00_BR:3:1_Sfcsfc.cache")
        );
    }

    #[test]
    fn expired_cache_entries_are_refetched() {
        let dir = std::env::temp_dir().join(format!(
            "gridtraj-expiry-test-{}-{:?}",
            std::process::id(),
            std::thread::current().id()
        ));

        let mut src = source();
        src.set_cache_dir(&dir);

        let mut stale = src.fetch_3d("T", d(12, 0)).unwrap();
        stale.expires = Some(NaiveDate::from_ymd(2000, 1, 1).and_hms(0, 0, 0));
        stale.data.fill(0.0);

        let path = dir
            .join("Y2021")
            .join("M07")
            .join("D15")
            .join("merra_T_2021-07-15T12:00_B_3D_P.cache");
        write_cache(&path, &stale).unwrap();

        let fresh = src.fetch_3d("T", d(12, 0)).unwrap();

        assert_ne!(fresh.data[[0, 45, 10]], 0.0);

        fs::remove_dir_all(&dir).unwrap();
    }
}
