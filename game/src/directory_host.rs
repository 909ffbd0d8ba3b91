//! Filesystem-backed resource loading: reads the resource directory and
//! bank files out of a game data directory, the same on-disk layout the
//! original release used (`MEMLIST.BIN` alongside sibling `BANKxx` files).
//! Grounded on `machines::rom_loader::RomSet::from_directory`'s "read a
//! directory of loose files, key by name" shape, generalized here from a
//! preloaded in-memory map to on-demand per-bank reads, since resource
//! banks can run to tens of megabytes and the directory's descriptor list
//! already tells us exactly which bytes of which bank a resource needs.
//! `.zip`-packaged game directories are resolved the way
//! `frontend::rom_path::load_rom_set` resolves a ROM zip: read once into
//! memory at open time, keyed by archive entry name.

use std::collections::HashMap;
use std::fs;
use std::io::{BufReader, Read as _};
use std::path::{Path, PathBuf};

use ootw_core::error::ResourceError;
use ootw_core::host::{Host, InputState};
use ootw_core::res::descriptor::{self, Descriptor};

const RESOURCE_LIST_FILE: &str = "MEMLIST.BIN";

enum Source {
    Disk(PathBuf),
    Archive(HashMap<String, Vec<u8>>),
}

/// Reads bank files and the resource directory either straight off disk or
/// out of a `.zip` archive read into memory at open time. Input,
/// presentation, and audio are no-ops, so this `Host` is only suitable for
/// headless tic-driving (smoke tests, scripted playthroughs, `runner::run`);
/// the `frontend` crate wraps one of these to add real video/audio/input.
pub struct DirectoryHost {
    source: Source,
}

impl DirectoryHost {
    /// Opens `path` as a game data directory, or as a `.zip` archive of
    /// one. A `.zip` is read fully into memory immediately; a directory's
    /// `MEMLIST.BIN`/bank files are read lazily by
    /// `load_resource_descriptors`/`load_bank`.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, ResourceError> {
        let path = path.into();
        if path.extension().is_some_and(|ext| ext.eq_ignore_ascii_case("zip")) {
            return Self::open_zip(&path);
        }
        if !path.is_dir() {
            return Err(ResourceError::BankIO(format!(
                "{} is not a directory or a .zip archive",
                path.display()
            )));
        }
        Ok(Self { source: Source::Disk(path) })
    }

    fn open_zip(path: &Path) -> Result<Self, ResourceError> {
        let file = fs::File::open(path)
            .map_err(|e| ResourceError::BankIO(format!("{}: {e}", path.display())))?;
        let reader = BufReader::new(file);
        let mut archive = zip::ZipArchive::new(reader)
            .map_err(|e| ResourceError::BankIO(format!("invalid zip {}: {e}", path.display())))?;

        let mut entries = HashMap::with_capacity(archive.len());
        for i in 0..archive.len() {
            let mut entry = archive
                .by_index(i)
                .map_err(|e| ResourceError::BankIO(format!("zip entry error: {e}")))?;
            if entry.is_dir() {
                continue;
            }
            let name = entry.name().to_string();
            let mut data = Vec::with_capacity(entry.size() as usize);
            entry
                .read_to_end(&mut data)
                .map_err(|e| ResourceError::BankIO(format!("zip entry {name}: {e}")))?;
            entries.insert(name, data);
        }
        Ok(Self { source: Source::Archive(entries) })
    }

    fn bank_name(bank_number: u8) -> String {
        format!("BANK{bank_number:02X}")
    }

    fn read(&self, name: &str) -> Result<Vec<u8>, ResourceError> {
        match &self.source {
            Source::Disk(root) => {
                let path = root.join(name);
                fs::read(&path).map_err(|e| ResourceError::BankIO(format!("{}: {e}", path.display())))
            }
            Source::Archive(entries) => entries
                .get(name)
                .cloned()
                .ok_or_else(|| ResourceError::BankIO(format!("{name} not found in archive"))),
        }
    }
}

impl Host for DirectoryHost {
    fn poll_input(&mut self) -> InputState {
        InputState::default()
    }

    fn present_surface(&mut self, _buffer_rgba: &[u8; 320 * 200 * 4], _delay_ms: u32) {}

    fn load_bank(&mut self, bank_number: u8) -> Result<Vec<u8>, ResourceError> {
        self.read(&Self::bank_name(bank_number))
    }

    fn load_resource_descriptors(&mut self) -> Result<Vec<Descriptor>, ResourceError> {
        let data = self.read(RESOURCE_LIST_FILE)?;
        descriptor::parse(&data)
    }

    fn play_sound(&mut self, _sample: &[u8], _channel: u8, _volume: u8, _frequency_hz: u32) {}
    fn stop_channel(&mut self, _channel: u8) {}
    fn play_music(&mut self, _sample: &[u8], _delay_ms: u32, _offset: u8) {}
    fn stop_music(&mut self) {}
    fn set_music_delay(&mut self, _delay_ms: u32) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write as _;

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("ootw_game_directory_host_{name}"));
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn open_rejects_a_missing_path() {
        let dir = scratch_dir("missing");
        let missing = dir.join("does_not_exist");
        assert!(DirectoryHost::open(missing).is_err());
        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn load_bank_reads_the_named_bank_file() {
        let dir = scratch_dir("bank");
        fs::write(dir.join("BANK0A"), [0x11, 0x22, 0x33]).unwrap();
        let mut host = DirectoryHost::open(&dir).unwrap();
        assert_eq!(host.load_bank(0x0A).unwrap(), vec![0x11, 0x22, 0x33]);
        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn load_bank_reports_bank_io_on_a_missing_file() {
        let dir = scratch_dir("missing_bank");
        let mut host = DirectoryHost::open(&dir).unwrap();
        assert!(matches!(host.load_bank(1), Err(ResourceError::BankIO(_))));
        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn load_resource_descriptors_parses_memlist() {
        let dir = scratch_dir("memlist");
        let mut record = vec![0u8, 3, 0, 0]; // kind=Bytecode, bank_number=3
        record.extend_from_slice(&0x100u32.to_be_bytes()); // bank_offset
        record.extend_from_slice(&50u32.to_be_bytes()); // packed_size
        record.extend_from_slice(&50u32.to_be_bytes()); // unpacked_size
        record.extend_from_slice(&[0, 0]);
        let mut sentinel = vec![0xFFu8, 0, 0, 0];
        sentinel.extend_from_slice(&[0; 16]);
        let mut data = record;
        data.extend(sentinel);
        fs::write(dir.join(RESOURCE_LIST_FILE), &data).unwrap();

        let mut host = DirectoryHost::open(&dir).unwrap();
        let descriptors = host.load_resource_descriptors().unwrap();
        assert_eq!(descriptors.len(), 1);
        assert_eq!(descriptors[0].bank_number, 3);
        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn load_bank_reads_from_a_zip_archive() {
        let dir = scratch_dir("zip");
        let zip_path = dir.join("game.zip");
        let file = fs::File::create(&zip_path).unwrap();
        let mut zip = zip::ZipWriter::new(file);
        let options =
            zip::write::SimpleFileOptions::default().compression_method(zip::CompressionMethod::Stored);
        zip.start_file("BANK01", options).unwrap();
        zip.write_all(&[0xAA, 0xBB]).unwrap();
        zip.finish().unwrap();

        let mut host = DirectoryHost::open(&zip_path).unwrap();
        assert_eq!(host.load_bank(1).unwrap(), vec![0xAA, 0xBB]);
        fs::remove_dir_all(&dir).unwrap();
    }
}
