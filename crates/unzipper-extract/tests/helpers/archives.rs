use std::io::{Cursor, Write};

use zip::write::{FileOptions, ZipWriter};

/// One entry of a test archive
pub enum Entry<'a> {
    File(&'a str, Vec<u8>),
    Dir(&'a str),
}

pub fn file(name: &str, data: impl Into<Vec<u8>>) -> Entry<'_> {
    Entry::File(name, data.into())
}

pub fn dir(name: &str) -> Entry<'_> {
    Entry::Dir(name)
}

/// Build an in-memory zip archive from `entries`, in order
pub fn build_zip(entries: Vec<Entry<'_>>) -> Vec<u8> {
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    let options = FileOptions::default();

    for entry in entries {
        match entry {
            Entry::File(name, data) => {
                writer.start_file(name, options).expect("start file");
                writer.write_all(&data).expect("write entry");
            }
            Entry::Dir(name) => {
                writer.add_directory(name, options).expect("add directory");
            }
        }
    }

    writer.finish().expect("finish archive").into_inner()
}

/// A chain of `levels` archives: level `i` holds `f{i}.txt` and, except for the
/// innermost, `n{i+1}.zip`.
pub fn nested_chain(levels: usize) -> Vec<u8> {
    let mut inner: Option<Vec<u8>> = None;
    for level in (0..levels).rev() {
        let text_name = format!("f{}.txt", level);
        let nested_name = format!("n{}.zip", level + 1);
        let mut entries = vec![file(&text_name, format!("level {}", level))];
        if let Some(child) = inner.take() {
            entries.push(file(&nested_name, child));
        }
        inner = Some(build_zip(entries));
    }
    inner.unwrap_or_else(|| build_zip(Vec::new()))
}

const END_OF_CENTRAL_DIRECTORY: &[u8] = b"PK\x05\x06";
const CENTRAL_HEADER_LEN: usize = 46;

fn read_u16(bytes: &[u8], at: usize) -> usize {
    u16::from_le_bytes([bytes[at], bytes[at + 1]]) as usize
}

fn read_u32(bytes: &[u8], at: usize) -> usize {
    u32::from_le_bytes([bytes[at], bytes[at + 1], bytes[at + 2], bytes[at + 3]]) as usize
}

/// Rewrite the central-directory record of `name` so that it is a Unix
/// `S_IFDIR` entry. The name itself is left alone, so only the mode bits say
/// "directory".
pub fn mark_unix_directory(archive: &mut [u8], name: &str) {
    let eocd = archive
        .windows(END_OF_CENTRAL_DIRECTORY.len())
        .rposition(|window| window == END_OF_CENTRAL_DIRECTORY)
        .expect("end of central directory");
    let entries = read_u16(archive, eocd + 10);
    let mut offset = read_u32(archive, eocd + 16);

    for _ in 0..entries {
        let name_len = read_u16(archive, offset + 28);
        let record_len =
            CENTRAL_HEADER_LEN + name_len + read_u16(archive, offset + 30) + read_u16(archive, offset + 32);
        let name_start = offset + CENTRAL_HEADER_LEN;

        if &archive[name_start..name_start + name_len] == name.as_bytes() {
            // Made-by host 3 is Unix; the mode lives in the high half of external_attr.
            archive[offset + 5] = 3;
            let external_attr = 0o040755u32 << 16;
            archive[offset + 38..offset + 42].copy_from_slice(&external_attr.to_le_bytes());
            return;
        }
        offset += record_len;
    }
    panic!("no central directory record for {}", name);
}
