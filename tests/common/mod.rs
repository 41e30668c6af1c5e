use std::fs::{File, OpenOptions};
use std::io::{Read, Write};
use std::path::Path;

use byteorder::{ByteOrder, LittleEndian};

/// Writes an input file from a list of pages, each a list of `i32` keys.
/// A page with fewer keys than `records_per_page` leaves the remaining
/// slots zeroed but they are not counted toward the returned record total
/// unless `full_pages` padding is requested by the caller via `num_records`.
pub fn write_input_pages(
    path: &Path,
    page_size: usize,
    header_size: usize,
    record_size: usize,
    pages: &[Vec<i32>],
) {
    let mut file: File = OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(true)
        .open(path)
        .unwrap();

    for page_keys in pages {
        let mut buf = vec![0u8; page_size];
        for (slot, key) in page_keys.iter().enumerate() {
            let start = header_size + slot * record_size;
            LittleEndian::write_i32(&mut buf[start..start + 4], *key);
        }
        file.write_all(&buf).unwrap();
    }
}

/// Reads the output file back as `(block_index, count, keys)` per page, in
/// on-disk page order.
pub fn read_output_pages(
    path: &Path,
    page_size: usize,
    header_size: usize,
    record_size: usize,
) -> Vec<(u32, u16, Vec<i32>)> {
    let mut file = File::open(path).unwrap();
    let mut bytes = Vec::new();
    file.read_to_end(&mut bytes).unwrap();
    assert_eq!(bytes.len() % page_size, 0, "output not a whole number of pages");

    let records_per_page = (page_size - header_size) / record_size;
    let mut pages = Vec::new();
    for chunk in bytes.chunks(page_size) {
        let block_index = LittleEndian::read_u32(&chunk[0..4]);
        let count = LittleEndian::read_u16(&chunk[4..6]);
        let mut keys = Vec::new();
        for slot in 0..(count as usize).min(records_per_page) {
            let start = header_size + slot * record_size;
            keys.push(LittleEndian::read_i32(&chunk[start..start + 4]));
        }
        pages.push((block_index, count, keys));
    }
    pages
}

/// Flattens the per-page output into one ascending key sequence.
pub fn output_key_sequence(
    path: &Path,
    page_size: usize,
    header_size: usize,
    record_size: usize,
) -> Vec<i32> {
    read_output_pages(path, page_size, header_size, record_size)
        .into_iter()
        .flat_map(|(_, _, keys)| keys)
        .collect()
}
