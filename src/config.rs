use crate::error::{Error, Result};

/// Width in bytes of the fixed-width signed integer key. The engine hard-codes
/// an `i32` key at offset 0 of every record rather than honoring a generic
/// comparison callback — see [`crate::iter::MinSortIter`].
pub const KEY_SIZE: usize = 4;

/// Byte offset within an output page header of the 16-bit record count.
/// The 32-bit block index always occupies bytes `[0..4)`.
pub const BLOCK_COUNT_OFFSET: usize = 4;

/// Caller-supplied description of the sort: page geometry, record count,
/// and the RAM budget available to the region index.
#[derive(Debug, Clone, Copy)]
pub struct SortConfig {
    /// Size in bytes of one input/output page (flash block).
    pub page_size: usize,
    /// Size in bytes of the page header preceding the packed records.
    pub header_size: usize,
    /// Size in bytes of one record, key included.
    pub record_size: usize,
    /// Total number of pages `P` in the input file.
    pub num_pages: usize,
    /// Total number of valid records `N` in the input file (`N <= num_pages * records_per_page`).
    pub num_records: usize,
    /// RAM budget `M`, in bytes, available for the region index (`min[0..G)`).
    /// Distinct from the `2 * page_size` scratch buffer held across
    /// [`crate::page::Pages`] and [`crate::page::OutputWriter`].
    pub ram_budget_bytes: usize,
    /// When `true`, the region index is meant to live inside the scratch
    /// buffer rather than as a separate heap allocation. Only the
    /// config-validation side of this knob is implemented; the allocation
    /// itself always uses a dedicated `Vec<Option<i32>>` (see DESIGN.md).
    pub region_index_in_scratch: bool,
}

impl SortConfig {
    /// Number of records that fit in one page.
    pub fn records_per_page(&self) -> usize {
        (self.page_size - self.header_size) / self.record_size
    }

    /// `G_max = floor(M / K)`: the most regions the RAM budget can summarize.
    fn max_regions(&self) -> usize {
        self.ram_budget_bytes / KEY_SIZE
    }

    /// `B = ceil(P / G_max)`: pages per region.
    pub fn blocks_per_region(&self) -> usize {
        self.num_pages.div_ceil(self.max_regions())
    }

    /// `G = ceil(P / B)`: number of regions.
    pub fn num_regions(&self) -> usize {
        if self.num_pages == 0 {
            return 0;
        }
        self.num_pages.div_ceil(self.blocks_per_region())
    }

    /// Validates the configuration eagerly, rather than letting a bad
    /// geometry surface as confusing behavior partway through a sort.
    pub fn validate(&self) -> Result<()> {
        if self.ram_budget_bytes < KEY_SIZE {
            return Err(Error::Config(format!(
                "ram_budget_bytes ({}) is smaller than one key ({KEY_SIZE} bytes)",
                self.ram_budget_bytes
            )));
        }
        if self.page_size < self.header_size + self.record_size {
            return Err(Error::Config(format!(
                "page_size ({}) must hold at least one record plus the header \
                 (header_size {} + record_size {})",
                self.page_size, self.header_size, self.record_size
            )));
        }
        if self.records_per_page() < 1 {
            return Err(Error::Config(
                "page_size/header_size/record_size combination yields zero records per page"
                    .into(),
            ));
        }
        if self.header_size < BLOCK_COUNT_OFFSET + 2 {
            return Err(Error::Config(format!(
                "header_size ({}) is too small to hold the block index and record count \
                 (needs at least {} bytes)",
                self.header_size,
                BLOCK_COUNT_OFFSET + 2
            )));
        }
        if self.record_size < KEY_SIZE {
            return Err(Error::Config(format!(
                "record_size ({}) is smaller than the key width ({KEY_SIZE} bytes)",
                self.record_size
            )));
        }
        if self.num_records > self.num_pages * self.records_per_page() {
            return Err(Error::Config(format!(
                "num_records ({}) exceeds capacity of num_pages * records_per_page ({})",
                self.num_records,
                self.num_pages * self.records_per_page()
            )));
        }
        if self.region_index_in_scratch {
            let scratch_len = 2 * self.page_size;
            let region_index_len = self.num_regions() * KEY_SIZE;
            if scratch_len < region_index_len {
                return Err(Error::Config(format!(
                    "region_index_in_scratch requires the scratch buffer ({scratch_len} bytes) \
                     to also hold the region index ({region_index_len} bytes)"
                )));
            }
        }
        Ok(())
    }
}
