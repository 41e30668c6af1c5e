//! Page-level I/O: one resident input page ([`Pages`]) and one accumulating
//! output page ([`OutputWriter`]), together the two page-sized slots of the
//! fixed `2 * page_size` scratch buffer the engine runs under.

use std::fs::File;
use std::io::{Read, Seek, SeekFrom, Write};

use byteorder::{ByteOrder, LittleEndian};

use crate::config::{SortConfig, BLOCK_COUNT_OFFSET, KEY_SIZE};
use crate::error::{Error, Result};
use crate::metrics::Metrics;

/// Seeks the input file and fills a single page-sized buffer, keeping it
/// resident across calls so sequential within-a-page access costs no
/// further I/O.
///
/// Owns one of the scratch buffer's two page slots; the other belongs to
/// [`OutputWriter`].
pub struct Pages {
    file: File,
    buf: Box<[u8]>,
    last_resident: Option<usize>,
    page_size: usize,
    header_size: usize,
    record_size: usize,
    records_per_page: usize,
    num_pages: usize,
    num_records: usize,
}

impl Pages {
    pub fn open(file: File, config: &SortConfig) -> Self {
        Self {
            file,
            buf: vec![0u8; config.page_size].into_boxed_slice(),
            last_resident: None,
            page_size: config.page_size,
            header_size: config.header_size,
            record_size: config.record_size,
            records_per_page: config.records_per_page(),
            num_pages: config.num_pages,
            num_records: config.num_records,
        }
    }

    #[inline]
    pub fn records_per_page(&self) -> usize {
        self.records_per_page
    }

    #[inline]
    pub fn num_pages(&self) -> usize {
        self.num_pages
    }

    #[inline]
    pub fn num_records(&self) -> usize {
        self.num_records
    }

    #[inline]
    pub fn last_resident(&self) -> Option<usize> {
        self.last_resident
    }

    /// Seeks to page `page` and fills the resident page buffer, unless it is
    /// already resident. Bumps `metrics.num_reads` only on an actual read,
    /// so repeated access to the same resident page is free.
    pub fn read_page_if_needed(&mut self, page: usize, metrics: &mut Metrics) -> Result<()> {
        if self.last_resident == Some(page) {
            return Ok(());
        }
        self.read_page(page, metrics)
    }

    /// Unconditionally seeks and reads page `page`, even if already resident.
    pub fn read_page(&mut self, page: usize, metrics: &mut Metrics) -> Result<()> {
        let offset = page as u64 * self.page_size as u64;
        self.file.seek(SeekFrom::Start(offset))?;

        self.file
            .read_exact(&mut self.buf)
            .map_err(|_| Error::ShortRead {
                page,
                expected: self.page_size,
            })?;

        metrics.num_reads += 1;
        self.last_resident = Some(page);
        Ok(())
    }

    /// Reads the key at a page-local record slot. Caller guarantees the
    /// right page is resident and `slot < records_per_page`.
    #[inline]
    pub fn key_at(&self, slot: usize) -> i32 {
        let start = self.header_size + slot * self.record_size;
        LittleEndian::read_i32(&self.buf[start..start + KEY_SIZE])
    }

    /// Returns the full record bytes at a page-local slot.
    #[inline]
    pub fn record_at(&self, slot: usize) -> &[u8] {
        let start = self.header_size + slot * self.record_size;
        &self.buf[start..start + self.record_size]
    }
}

/// Accumulates yielded records into output pages, stamping and flushing each
/// page once full.
///
/// Owns the scratch buffer's second page slot.
pub struct OutputWriter {
    file: File,
    buf: Box<[u8]>,
    header_size: usize,
    record_size: usize,
    records_per_page: usize,
    count: u16,
    block_index: u32,
}

impl OutputWriter {
    pub fn create(file: File, config: &SortConfig) -> Self {
        Self {
            file,
            buf: vec![0u8; config.page_size].into_boxed_slice(),
            header_size: config.header_size,
            record_size: config.record_size,
            records_per_page: config.records_per_page(),
            count: 0,
            block_index: 0,
        }
    }

    /// Appends one record, flushing the page first if it is already full.
    pub fn push(&mut self, record: &[u8], metrics: &mut Metrics) -> Result<()> {
        debug_assert_eq!(record.len(), self.record_size);

        if self.count as usize == self.records_per_page {
            self.flush_page(metrics)?;
        }

        let start = self.header_size + self.count as usize * self.record_size;
        self.buf[start..start + self.record_size].copy_from_slice(record);
        self.count += 1;
        Ok(())
    }

    /// Flushes a trailing short page, if any records are pending.
    pub fn finish(mut self, metrics: &mut Metrics) -> Result<()> {
        if self.count > 0 {
            self.flush_page(metrics)?;
        }
        Ok(())
    }

    fn flush_page(&mut self, metrics: &mut Metrics) -> Result<()> {
        LittleEndian::write_u32(&mut self.buf[0..4], self.block_index);
        LittleEndian::write_u16(
            &mut self.buf[BLOCK_COUNT_OFFSET..BLOCK_COUNT_OFFSET + 2],
            self.count,
        );

        self.file
            .write_all(&self.buf)
            .map_err(|_| Error::ShortWrite {
                block_index: self.block_index,
            })?;

        metrics.num_writes += 1;
        self.block_index += 1;
        self.count = 0;
        self.buf.fill(0);
        Ok(())
    }
}
