use std::collections::HashMap;
use std::fs;
use std::mem;
use std::path::Path;
use log::{debug, trace};

use crate::cursor::ByteCursor;
use crate::error::{Error, Result};


/*
    agg file raw structures
 */
#[derive(Debug, Copy, Clone)]
#[repr(C, packed)]
struct AggIndexRecord {
    crc: u32,       // never checked
    offset: u32,
    size: u32,
}

const INDEX_RECORD_SIZE: usize = mem::size_of::<AggIndexRecord>();

// 13 bytes of name and 2 bytes of unknown purpose
const NAME_RECORD_SIZE: usize = 15;


/// One named sub-file of the archive
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveRecord {
    pub name: String,
    pub offset: usize,
    pub size: usize,
}


/// Archive keeps the whole container in memory and maps names to byte ranges inside it.
///
/// Layout: `u16 count`, `count` index records right after it,
/// and the name table of `count * 15` bytes at the very end of the file.
pub struct Archive {
    data: Vec<u8>,
    records: Vec<ArchiveRecord>,
    by_name: HashMap<String, usize>,
}


impl Archive {
    pub fn open(path: &Path) -> Result<Self> {
        trace!("Archive::open {path:?}");
        Self::from_bytes(fs::read(path)?)
    }

    pub fn from_bytes(data: Vec<u8>) -> Result<Self> {
        let file_size = data.len();
        let records = {
            let f = &mut ByteCursor::new(&data);
            let count = f.read_u16()? as usize;

            if count * (INDEX_RECORD_SIZE + NAME_RECORD_SIZE) >= file_size {
                return Err(Error::MalformedArchive { records: count, file_size });
            }

            let mut index = Vec::with_capacity(count);
            for _ in 0..count {
                index.push(AggIndexRecord {
                    crc: f.read_u32()?,
                    offset: f.read_u32()?,
                    size: f.read_u32()?,
                });
            }

            // names live at the tail, in the same order as the index records
            let name_table_size = count * NAME_RECORD_SIZE;
            f.seek(file_size - name_table_size)?;

            let mut records = Vec::with_capacity(count);
            for idx in index {
                let name = record_name(f.read(NAME_RECORD_SIZE)?);
                let offset = idx.offset as usize;
                let size = idx.size as usize;

                if offset.checked_add(size).map_or(true, |end| end > file_size) {
                    return Err(Error::MalformedArchive { records: count, file_size });
                }

                records.push(ArchiveRecord { name, offset, size });
            }
            records
        };

        let by_name = records.iter()
            .enumerate()
            .map(|(i, record)| (record.name.to_ascii_uppercase(), i))
            .collect();

        debug!("archive opened: {} records, {file_size} bytes", records.len());

        Ok(Self { data, records, by_name })
    }

    pub fn number_of_records(&self) -> usize {
        self.records.len()
    }

    pub fn records(&self) -> &[ArchiveRecord] {
        &self.records
    }

    pub fn record(&self, name: &str) -> Option<&ArchiveRecord> {
        self.by_name.get(&name.to_ascii_uppercase()).map(|&i| &self.records[i])
    }

    pub fn contains(&self, name: &str) -> bool {
        self.record(name).is_some()
    }

    /// returns the content of a named sub-file, exactly `size` bytes
    pub fn read(&self, name: &str) -> Result<&[u8]> {
        let record = self.record(name).ok_or_else(|| Error::NoSuchFile(name.to_string()))?;

        let f = &mut ByteCursor::new(&self.data);
        f.seek(record.offset)?;
        f.read(record.size)
    }
}


// names are zero padded ascii, anything after the first zero or non-printable byte is garbage
fn record_name(raw: &[u8]) -> String {
    raw.iter()
        .take_while(|&&b| b.is_ascii_graphic() || b == b' ')
        .map(|&b| b as char)
        .collect::<String>()
        .trim_end()
        .to_string()
}


#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// builds a container with the given entries, payloads are stored back to back
    pub(crate) fn build_archive(entries: &[(&str, &[u8])]) -> Vec<u8> {
        let count = entries.len();
        let payload_start = 2 + count * INDEX_RECORD_SIZE;

        let mut out = Vec::new();
        out.extend_from_slice(&(count as u16).to_le_bytes());

        let mut offset = payload_start;
        for (_, payload) in entries {
            out.extend_from_slice(&0xDEAD_BEEFu32.to_le_bytes());
            out.extend_from_slice(&(offset as u32).to_le_bytes());
            out.extend_from_slice(&(payload.len() as u32).to_le_bytes());
            offset += payload.len();
        }
        for (_, payload) in entries {
            out.extend_from_slice(payload);
        }
        for (name, _) in entries {
            let mut field = [0u8; NAME_RECORD_SIZE];
            field[..name.len()].copy_from_slice(name.as_bytes());
            // the two trailing bytes are not part of the name
            field[13] = 0x01;
            field[14] = 0x7F;
            out.extend_from_slice(&field);
        }
        out
    }

    #[test]
    fn index_record_is_12_bytes() {
        assert_eq!(INDEX_RECORD_SIZE, 12);
    }

    #[test]
    fn reads_named_entries() {
        let data = build_archive(&[
            ("KB.PAL", &[1, 2, 3][..]),
            ("OBJNTWRD.ICN", &[9; 40][..]),
            ("EMPTY.BIN", &[0u8; 0][..]),
        ]);
        let archive = Archive::from_bytes(data).unwrap();

        assert_eq!(archive.number_of_records(), 3);
        assert_eq!(archive.read("KB.PAL").unwrap(), &[1, 2, 3]);
        assert_eq!(archive.read("objntwrd.icn").unwrap().len(), 40);
        assert!(archive.read("EMPTY.BIN").unwrap().is_empty());

        for record in archive.records() {
            assert_eq!(archive.read(&record.name).unwrap().len(), record.size);
        }
    }

    #[test]
    fn missing_entry() {
        let archive = Archive::from_bytes(build_archive(&[("A.BIN", &[0; 30][..])])).unwrap();
        match archive.read("B.BIN") {
            Err(Error::NoSuchFile(name)) => assert_eq!(name, "B.BIN"),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn rejects_too_many_records() {
        let mut data = vec![0u8; 64];
        data[0] = 10;
        assert!(matches!(Archive::from_bytes(data), Err(Error::MalformedArchive { records: 10, .. })));
    }

    #[test]
    fn rejects_records_past_the_end() {
        let mut data = build_archive(&[("A.BIN", &[0; 30][..])]);
        // size field of the first record
        data[10..14].copy_from_slice(&1000u32.to_le_bytes());
        assert!(matches!(Archive::from_bytes(data), Err(Error::MalformedArchive { .. })));
    }

    #[test]
    fn names_stop_at_non_printable() {
        assert_eq!(record_name(b"HEROES.ICN\0\0\0\x01\x7F"), "HEROES.ICN");
        assert_eq!(record_name(b"ABCDEFGH.ICN\x02\x00\x00"), "ABCDEFGH.ICN");
    }
}
