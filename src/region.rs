use crate::config::SortConfig;
use crate::error::Result;
use crate::metrics::Metrics;
use crate::page::Pages;

/// Per-region minimum-key summary, the only RAM structure whose size scales
/// with the input (`G` entries of `K` bytes).
///
/// `None` represents the "drained" sentinel (`+∞`). Using `i32::MAX` for
/// this would risk colliding with a legitimate maximum-valued key, so an
/// explicit `Option` is used instead.
#[derive(Debug, Clone)]
pub struct RegionIndex {
    min: Vec<Option<i32>>,
    blocks_per_region: usize,
}

impl RegionIndex {
    /// Builds the region index with a single full pass over the input: one
    /// read of every page, updating the owning region's minimum for every
    /// valid record encountered.
    pub fn init(config: &SortConfig, pages: &mut Pages, metrics: &mut Metrics) -> Result<Self> {
        let blocks_per_region = config.blocks_per_region();
        let mut min = vec![None; config.num_regions()];
        let records_per_page = pages.records_per_page();
        let num_records = pages.num_records();

        for page in 0..pages.num_pages() {
            pages.read_page(page, metrics)?;
            let region = page / blocks_per_region;

            for slot in 0..records_per_page {
                if page * records_per_page + slot >= num_records {
                    break;
                }
                let key = pages.key_at(slot);
                metrics.num_compar += 1;
                let entry = &mut min[region];
                let improves = match *entry {
                    Some(cur) => key < cur,
                    None => true,
                };
                if improves {
                    *entry = Some(key);
                }
            }
        }

        Ok(Self {
            min,
            blocks_per_region,
        })
    }

    #[inline]
    pub fn blocks_per_region(&self) -> usize {
        self.blocks_per_region
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.min.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.min.is_empty()
    }

    #[inline]
    pub fn get(&self, region: usize) -> Option<i32> {
        self.min[region]
    }

    #[inline]
    pub fn set(&mut self, region: usize, value: Option<i32>) {
        self.min[region] = value;
    }

    /// Phase A: scans `min[0..G)` for the smallest value, breaking ties by
    /// lowest index (a natural consequence of only replacing on strict
    /// improvement while scanning left to right). Returns `None` when every
    /// region is drained.
    pub fn select_min(&self, metrics: &mut Metrics) -> Option<(usize, i32)> {
        let mut best: Option<(usize, i32)> = None;
        for (idx, entry) in self.min.iter().enumerate() {
            metrics.num_compar += 1;
            if let Some(value) = entry {
                let improves = match best {
                    Some((_, b)) => *value < b,
                    None => true,
                };
                if improves {
                    best = Some((idx, *value));
                }
            }
        }
        best
    }
}
