//! Flash MinSort: an external sorting engine for record sequences stored on
//! block-addressable flash storage, designed to run under a fixed, small
//! RAM budget independent of input size.
//!
//! The engine reads an unordered input file of fixed-size pages and
//! produces a key-ordered output file of the same page format while
//! performing zero intermediate writes — only the final sorted run is
//! written. Correctness rests on the region index (see [`RegionIndex`]): a
//! compact in-RAM summary of per-region minimum keys that the iterator
//! (see [`MinSortIter`]) keeps accurate for each region's still-unreturned
//! records as it drains them.
//!
//! Most callers want [`sort_file`] or [`sort`]. The lower-level
//! [`Pages`], [`RegionIndex`], and [`MinSortIter`] types are exposed for
//! callers that want to drive the state machine by hand.

mod config;
mod driver;
mod error;
mod iter;
mod metrics;
mod page;
mod region;

pub use crate::config::{SortConfig, BLOCK_COUNT_OFFSET, KEY_SIZE};
pub use crate::driver::{sort, sort_file, SortReport};
pub use crate::error::{Error, Result};
pub use crate::iter::MinSortIter;
pub use crate::metrics::Metrics;
pub use crate::page::{OutputWriter, Pages};
pub use crate::region::RegionIndex;
