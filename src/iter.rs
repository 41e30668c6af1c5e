use tracing::trace;

use crate::error::{Error, Result};
use crate::metrics::Metrics;
use crate::page::Pages;
use crate::region::RegionIndex;

/// Result of scanning forward within a region for a record equal to the
/// active key. Shared by Phase B (must find a match) and Phase C (may or
/// may not find a second one).
enum ScanOutcome {
    /// Found at region-local block offset `block` (0-based within the
    /// region), record slot `slot`.
    Found { block: usize, slot: usize },
    NotFound,
}

/// The two-phase "locate-then-advance" iterator over ascending key order.
///
/// Each `next()` call either selects a fresh active region (Phase A, only
/// when no resume hint is pending), locates a record equal to the active
/// key (Phase B), and advances the resume hint while refining the region's
/// next-highest key (Phase C).
///
/// The key contract is hard-coded (`i32` at record offset 0) rather than
/// driven by a runtime comparator callback.
pub struct MinSortIter {
    pages: Pages,
    regions: RegionIndex,
    records_per_page: usize,
    /// The key currently being drained from `region_idx`, once selected.
    current: Option<i32>,
    /// Smallest key observed so far that is strictly greater than `current`.
    next: Option<i32>,
    /// Region-local linear resume position; `0` means "scan region from the start".
    next_idx: usize,
    region_idx: Option<usize>,
    done: bool,
}

impl MinSortIter {
    pub fn new(pages: Pages, regions: RegionIndex) -> Self {
        let records_per_page = pages.records_per_page();
        Self {
            pages,
            regions,
            records_per_page,
            current: None,
            next: None,
            next_idx: 0,
            region_idx: None,
            done: false,
        }
    }

    /// Returns the next record in ascending key order, writing its bytes
    /// into `tuple`, or `Ok(false)` at end of stream. `tuple.len()` must
    /// equal the configured `record_size`.
    pub fn next(&mut self, tuple: &mut [u8], metrics: &mut Metrics) -> Result<bool> {
        if self.done {
            return Ok(false);
        }

        if self.next_idx == 0 {
            match self.regions.select_min(metrics) {
                Some((region, key)) => {
                    trace!(region, key, "selected active region");
                    self.region_idx = Some(region);
                    self.current = Some(key);
                    self.next = None;
                }
                None => {
                    self.done = true;
                    return Ok(false);
                }
            }
        }

        let region_idx = self.region_idx.expect("region selected before Phase B");
        let current = self.current.expect("current selected before Phase B");

        // Phase B: locate a record equal to `current`, resuming from the hint.
        let start_block = self.next_idx / self.records_per_page;
        let start_slot = self.next_idx % self.records_per_page;
        let found = self.scan_for_current(region_idx, current, start_block, start_slot, metrics)?;

        let (block, slot) = match found {
            ScanOutcome::Found { block, slot } => (block, slot),
            ScanOutcome::NotFound => {
                return Err(Error::InvariantViolation {
                    region: region_idx,
                    expected: current,
                });
            }
        };

        tuple.copy_from_slice(self.pages.record_at(slot));
        metrics.num_memcpys += 1;
        trace!(region = region_idx, key = current, "emitted record");

        // Phase C: advance the resume hint, refining `next` over the remainder.
        let resume_slot = slot + 1;
        let (resume_block, resume_slot) = if resume_slot == self.records_per_page {
            (block + 1, 0)
        } else {
            (block, resume_slot)
        };

        match self.scan_for_current(region_idx, current, resume_block, resume_slot, metrics)? {
            ScanOutcome::Found {
                block: next_block,
                slot: next_slot,
            } => {
                self.next_idx = next_block * self.records_per_page + next_slot;
            }
            ScanOutcome::NotFound => {
                self.next_idx = 0;
                self.regions.set(region_idx, self.next);
                trace!(region = region_idx, next = ?self.next, "region minimum updated");
            }
        }

        Ok(true)
    }

    /// Scans forward from `(start_block, start_slot)` — both region-local —
    /// to the end of the region, looking for the first record equal to
    /// `current`. Refines `self.next` for every key strictly greater than
    /// `current` encountered along the way, exactly as Phase B and Phase C
    /// both require.
    ///
    /// Charges one comparison for the equality test, and — only when it
    /// misses — one more for the "smaller than `next`" refinement test.
    fn scan_for_current(
        &mut self,
        region_idx: usize,
        current: i32,
        start_block: usize,
        start_slot: usize,
        metrics: &mut Metrics,
    ) -> Result<ScanOutcome> {
        let blocks_per_region = self.regions.blocks_per_region();
        let base_block = region_idx * blocks_per_region;
        let num_pages = self.pages.num_pages();
        let num_records = self.pages.num_records();
        let records_per_page = self.records_per_page;

        let mut block = start_block;
        let mut slot = start_slot;

        while block < blocks_per_region {
            let page = base_block + block;
            if page >= num_pages {
                return Ok(ScanOutcome::NotFound);
            }
            self.pages.read_page_if_needed(page, metrics)?;

            while slot < records_per_page {
                if page * records_per_page + slot >= num_records {
                    return Ok(ScanOutcome::NotFound);
                }

                let value = self.pages.key_at(slot);
                metrics.num_compar += 1;
                if value == current {
                    return Ok(ScanOutcome::Found { block, slot });
                }
                metrics.num_compar += 1;
                if value > current {
                    let improves = match self.next {
                        Some(next) => value < next,
                        None => true,
                    };
                    if improves {
                        self.next = Some(value);
                    }
                }
                slot += 1;
            }

            block += 1;
            slot = 0;
        }

        Ok(ScanOutcome::NotFound)
    }

    /// Consumes the iterator, releasing the input page buffer.
    pub fn close(self) -> Pages {
        self.pages
    }
}
