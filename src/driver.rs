use std::fs::{File, OpenOptions};
use std::path::Path;

use tracing::{debug, info, warn};

use crate::config::SortConfig;
use crate::error::Result;
use crate::iter::MinSortIter;
use crate::metrics::Metrics;
use crate::page::{OutputWriter, Pages};
use crate::region::RegionIndex;

/// Result of a successful sort: the metrics accumulated and the offset
/// within the output file of the first output record. The offset is
/// always `0` — the output file begins with the sorted run, there is no
/// separate header region before it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SortReport {
    pub metrics: Metrics,
    pub result_file_ptr: u64,
}

/// Drives a sort end to end: opens the input and output files, builds the
/// region index, runs the iterator until exhaustion, and flushes the
/// trailing output page.
pub fn sort_file(input_path: &Path, output_path: &Path, config: &SortConfig) -> Result<SortReport> {
    config.validate()?;

    let input = File::open(input_path)?;
    let output = OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(true)
        .open(output_path)?;

    sort(input, output, config)
}

/// Same as [`sort_file`] but takes already-open file handles, for callers
/// that manage the output file's lifecycle themselves.
pub fn sort(input: File, output: File, config: &SortConfig) -> Result<SortReport> {
    config.validate()?;

    let mut metrics = Metrics::new();
    info!(
        page_size = config.page_size,
        num_pages = config.num_pages,
        num_records = config.num_records,
        num_regions = config.num_regions(),
        blocks_per_region = config.blocks_per_region(),
        "starting flash minsort"
    );

    let mut pages = Pages::open(input, config);
    let regions = match RegionIndex::init(config, &mut pages, &mut metrics) {
        Ok(regions) => regions,
        Err(err) => {
            warn!(error = %err, "region index initialization failed");
            return Err(err);
        }
    };
    debug!(num_reads = metrics.num_reads, "region index initialized");

    let mut iter = MinSortIter::new(pages, regions);
    let mut writer = OutputWriter::create(output, config);
    let mut tuple = vec![0u8; config.record_size];

    loop {
        match iter.next(&mut tuple, &mut metrics) {
            Ok(true) => writer.push(&tuple, &mut metrics)?,
            Ok(false) => break,
            Err(err) => {
                warn!(error = %err, "sort failed");
                return Err(err);
            }
        }
    }

    writer.finish(&mut metrics)?;
    info!(
        num_reads = metrics.num_reads,
        num_writes = metrics.num_writes,
        num_compar = metrics.num_compar,
        num_memcpys = metrics.num_memcpys,
        "flash minsort complete"
    );

    Ok(SortReport {
        metrics,
        result_file_ptr: 0,
    })
}
