//! Aircraft metadata archive — a ZIP of per-shard CSV files keyed by the
//! last two hex digits of the ICAO address (SPEC_FULL.md §6).
//!
//! Each shard is sorted lexicographically by ICAO address, so lookup is a
//! linear scan that stops as soon as the scanned key would sort after the
//! sought address — the archive is never loaded into memory wholesale.

use std::io::{Read, Seek};

use zip::read::ZipArchive;

use crate::types::{
    AdsbError, AircraftMetadata, Description, IcaoAddress, Registration, Result, TypeDesignator,
    WakeCategory,
};

/// A lazily-queried handle onto the metadata archive.
pub struct MetadataStore<R> {
    archive: ZipArchive<R>,
}

impl<R: Read + Seek> MetadataStore<R> {
    pub fn open(reader: R) -> Result<Self> {
        let archive = ZipArchive::new(reader).map_err(|e| AdsbError::Archive(e.to_string()))?;
        Ok(MetadataStore { archive })
    }

    /// Look up metadata for `icao`. `None` if its shard is absent from the
    /// archive, or the address is not present in that shard.
    pub fn lookup(&mut self, icao: IcaoAddress) -> Option<AircraftMetadata> {
        let shard_name = format!("{}.csv", icao.last_two_hex());
        let mut entry = self.archive.by_name(&shard_name).ok()?;
        let mut contents = String::new();
        entry.read_to_string(&mut contents).ok()?;
        drop(entry);

        let key = icao.to_string();
        for line in contents.lines() {
            let mut fields = line.splitn(6, ',');
            let line_icao = fields.next()?;
            if line_icao > key.as_str() {
                // Sorted shard: nothing past this point can match.
                return None;
            }
            if line_icao != key {
                continue;
            }
            return parse_record(&mut fields);
        }
        None
    }
}

fn parse_record<'a>(fields: &mut impl Iterator<Item = &'a str>) -> Option<AircraftMetadata> {
    let registration = Registration::parse(fields.next().unwrap_or("")).ok()?;
    let type_designator = TypeDesignator::parse(fields.next().unwrap_or("")).ok()?;
    let model = fields.next().unwrap_or("").to_string();
    let description = Description::parse(fields.next().unwrap_or("")).ok()?;
    let wake_category = WakeCategory::from(fields.next().unwrap_or(""));
    Some(AircraftMetadata {
        registration,
        type_designator,
        model,
        description,
        wake_category,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;
    use std::io::Write;

    fn build_archive(shards: &[(&str, &str)]) -> Vec<u8> {
        let buf = Cursor::new(Vec::new());
        let mut writer = zip::ZipWriter::new(buf);
        let options: zip::write::FileOptions<()> = zip::write::FileOptions::default();
        for (name, content) in shards {
            writer.start_file(*name, options).unwrap();
            writer.write_all(content.as_bytes()).unwrap();
        }
        writer.finish().unwrap().into_inner()
    }

    #[test]
    fn looks_up_present_address() {
        let archive = build_archive(&[(
            "D6.csv",
            "4840D6,N12345,B738,Boeing 737-800,L2J,M\n4840D7,N67890,A320,Airbus A320,L2J,M\n",
        )]);
        let mut store = MetadataStore::open(Cursor::new(archive)).unwrap();
        let icao = IcaoAddress::parse("4840D6").unwrap();
        let meta = store.lookup(icao).unwrap();
        assert_eq!(meta.registration.as_str(), "N12345");
        assert_eq!(meta.type_designator.as_str(), "B738");
        assert_eq!(meta.model, "Boeing 737-800");
        assert_eq!(meta.wake_category, WakeCategory::Medium);
    }

    #[test]
    fn early_terminates_past_sorted_key() {
        let archive = build_archive(&[("D6.csv", "000000,N1,A1,A,L1J,L\n")]);
        let mut store = MetadataStore::open(Cursor::new(archive)).unwrap();
        let icao = IcaoAddress::parse("4840D6").unwrap();
        assert!(store.lookup(icao).is_none());
    }

    #[test]
    fn missing_shard_returns_none() {
        let archive = build_archive(&[("00.csv", "000000,N1,A1,A,L1J,L\n")]);
        let mut store = MetadataStore::open(Cursor::new(archive)).unwrap();
        let icao = IcaoAddress::parse("4840D6").unwrap();
        assert!(store.lookup(icao).is_none());
    }

    #[test]
    fn opens_from_a_real_archive_file_on_disk() {
        let archive = build_archive(&[(
            "D6.csv",
            "4840D6,N12345,B738,Boeing 737-800,L2J,M\n",
        )]);
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("aircraft.zip");
        std::fs::write(&path, archive).unwrap();

        let file = std::fs::File::open(&path).unwrap();
        let mut store = MetadataStore::open(file).unwrap();
        let icao = IcaoAddress::parse("4840D6").unwrap();
        assert_eq!(store.lookup(icao).unwrap().registration.as_str(), "N12345");
    }
}
