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

//! Module containing the cache-filler core.
//!
//! The filler walks the configured time period, one job per quantity
//! and snapshot time, and fetches every snapshot through the met
//! facade so the on-disk cache ends up populated for later trajectory
//! runs. Jobs run on a thread pool; each worker drives its own clone
//! of the facade.

mod configuration;
pub mod met;


use crate::{
    errors::{MetError, ModelError},
    model::{configuration::Config, met::MerraArchive, met::MetSource},
    ALLOCATOR,
};
use chrono::NaiveDateTime;
use indicatif::{ProgressBar, ProgressStyle};
use log::{debug, error, info};
use met::GridPreference;
use rayon::{ThreadPool, ThreadPoolBuilder};
use serde::Serialize;
use std::{
    fs,
    io::Error,
    path::Path,
    sync::{mpsc, Arc},
};

/// Main filler function, responsible for all steps of a run.
///
/// It reads the provided configuration, enumerates the snapshots to
/// fetch, deploys the fetch jobs onto the threadpool and checks for
/// errors.
pub fn main() -> Result<(), ModelError> {
    info!("Preparing the filler core");

    // prepare all prerequisites for running the filler
    prepare_output_dir()?;

    let filler_core = Core::new()?;

    let jobs = prepare_jobs_list(&filler_core)?;
    let jobs_count = jobs.len();

    let mut reports: Vec<SnapshotReport> = Vec::with_capacity(jobs_count);

    let source = filler_core.source;

    info!("Deploying {} snapshot fetches", jobs_count);

    // set progress bar for fetched snapshots
    let jobs_bar = ProgressBar::new(jobs_count as u64);
    jobs_bar.set_style(
        ProgressStyle::default_bar()
            .template("{prefix} [{elapsed_precise}] [{wide_bar:.cyan/blue}] {pos}/{len} {msg}")
            .progress_chars("#>-"),
    );
    jobs_bar.set_prefix("Fetched snapshots");

    // deploy fetch jobs on to the threadpool
    let (tx, rx) = mpsc::channel();

    for (quantity, date) in jobs {
        let tx = tx.clone();
        let mut source = source.clone();

        filler_core.threadpool.spawn(move || {
            tx.send(fill_snapshot(&mut source, &quantity, date))
                .unwrap();
        });
    }

    // receive snapshot reports and collect them for the manifest
    for _ in 0..jobs_count {
        let job_result = rx.recv().expect("Receiving snapshot result failed");

        match job_result {
            Ok(report) => {
                reports.push(report);
            }
            Err(err) => {
                error!("Snapshot fetch failed, check the details and rerun the filler: {}", err);
                // this is neccessary to make sure that all error messages
                // are fully written to stdout before the progress bar updates
                println!();
            }
        }
        jobs_bar.inc(1);
    }

    jobs_bar.finish_with_message("All snapshots finished");
    info!("Writing manifest");

    // write the manifest of fetched snapshots to file
    save_manifest(reports)?;

    Ok(())
}

/// Structure containing filler parameters.
///
/// To run, the filler needs the checked configuration, a thread pool
/// sized from it, and a met facade configured from it; they are
/// gathered in this structure.
pub struct Core {
    pub config: Config,
    pub threadpool: ThreadPool,
    pub source: MetSource,
}

impl Core {
    /// Filler [`Core`] constructor.
    ///
    /// Before any fetching can start (and to run it safely), the
    /// configuration provided by the user must be loaded and checked.
    pub fn new() -> Result<Self, ModelError> {
        debug!("Reading configuration from config.yaml");
        let config = Config::new_from_file(Path::new("config.yaml"))?;

        debug!("Setting memory limit");
        ALLOCATOR
            .set_limit(config.resources.memory * 1024 * 1024)
            .unwrap();

        debug!("Setting up ThreadPool");
        let threadpool = ThreadPoolBuilder::new()
            .num_threads(config.resources.threads as usize)
            .stack_size(2 * 1024 * 1024)
            .build()?;

        debug!("Setting up the met facade");
        let source = prepare_source(&config)?;

        Ok(Core {
            config,
            threadpool,
            source,
        })
    }
}

/// Builds the met facade the workers will clone, applying every
/// met-related configuration setting. An unsupported vertical
/// coordinate is detected here, before any fetching starts.
fn prepare_source(config: &Config) -> Result<MetSource, MetError> {
    let mut source = MetSource::new(Arc::new(MerraArchive::new()));

    source.set_vertical(&config.met.vertical)?;
    source.set_cache_dir(&config.met.cache_dir);
    source.set_cache_lifetime(config.met.cache_lifetime);
    source.set_strictness(config.met.strictness);
    source.set_preference(GridPreference {
        vertical: config.met.preference.vertical,
        horizontal: config.met.preference.horizontal,
        time_spacing: config.met.preference.time_spacing,
        time_averaging: config.met.preference.time_averaging,
    });
    source.set_thinning(config.met.thin, config.met.thin_offset);
    source.set_workers(config.resources.threads as usize);
    source.set_time_overrides(config.met.time_base, config.met.time_spacing);

    Ok(source)
}

/// Enumerates the (quantity, snapshot time) pairs to fetch, walking
/// each quantity's own snapshot timing over the configured period.
fn prepare_jobs_list(filler_core: &Core) -> Result<Vec<(String, NaiveDateTime)>, ModelError> {
    let mut source = filler_core.source.clone();
    let mut jobs = Vec::new();

    for quantity in &filler_core.config.met.quantities {
        let ticks = source.snapshot_times(
            quantity,
            filler_core.config.datetime.start,
            filler_core.config.datetime.end,
        )?;

        if met::registry::is_derived(quantity) {
            debug!(
                "{}: {} snapshots to derive (raw dependencies will be cached)",
                quantity,
                ticks.len()
            );
        } else {
            debug!("{}: {} snapshots to fetch", quantity, ticks.len());
        }

        for tick in ticks {
            jobs.push((quantity.clone(), tick));
        }
    }

    Ok(jobs)
}

/// One line of the output manifest, describing a fetched snapshot.
#[derive(Debug, Serialize)]
struct SnapshotReport {
    quantity: String,
    date: NaiveDateTime,
    units: String,
    levels: usize,
    lats: usize,
    lons: usize,
}

/// Fetches one snapshot through the facade (filling the disk cache as
/// a side effect) and summarizes it for the manifest.
fn fill_snapshot(
    source: &mut MetSource,
    quantity: &str,
    date: NaiveDateTime,
) -> Result<SnapshotReport, ModelError> {
    if quantity.contains('@') {
        let field = source.fetch_sfc(quantity, date)?;

        Ok(SnapshotReport {
            quantity: quantity.to_owned(),
            date,
            units: field.units.clone(),
            levels: 1,
            lats: field.lats().len(),
            lons: field.lons().len(),
        })
    } else {
        let field = source.fetch_3d(quantity, date)?;

        Ok(SnapshotReport {
            quantity: quantity.to_owned(),
            date,
            units: field.units.clone(),
            levels: field.levels().len(),
            lats: field.lats().len(),
            lons: field.lons().len(),
        })
    }
}

/// Checks that the output directory is usable before any work starts.
///
/// An already-populated directory is refused so that manifests of
/// separate runs cannot silently overwrite each other.
fn prepare_output_dir() -> Result<(), ModelError> {
    debug!("Checking and setting output directory");

    let out_path = Path::new("./output/");

    if out_path.is_dir() {
        if out_path.read_dir()?.next().is_none() {
            debug!("Output directory exists but is empty so continuing");
        } else {
            return Err(ModelError::FaultyOutput(
                "Output directory exists and is not empty",
            ));
        }
    } else {
        debug!("Output directory does not exist so creating a new one");
        fs::create_dir(out_path)?;
    }

    Ok(())
}

/// Writes the manifest of everything fetched in this run.
fn save_manifest(reports: Vec<SnapshotReport>) -> Result<(), Error> {
    let out_path = Path::new("./output/cache_manifest.csv");

    let mut out_file = csv::Writer::from_path(out_path)?;

    for report in reports {
        out_file.serialize(report)?;
    }

    out_file.flush()?;

    Ok(())
}
