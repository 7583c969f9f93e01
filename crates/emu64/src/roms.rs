//! ROM image loading.
//!
//! Three binary images make a machine: kernal (8 KiB at $E000), BASIC
//! (8 KiB at $A000) and the character generator (4 KiB at $D000). Both
//! `.rom` and `.bin` extensions are accepted, `.rom` first.
//!
//! Search order:
//! 1. `$C64_ROM_DIR`
//! 2. `./roms/`
//! 3. `./`

use std::env;
use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Why a ROM set could not be loaded. All variants are fatal at init.
#[derive(Debug)]
pub enum RomError {
    /// The file could not be read.
    Io {
        name: &'static str,
        path: PathBuf,
        source: io::Error,
    },
    /// The file exists but has the wrong length.
    WrongSize {
        name: &'static str,
        expected: usize,
        actual: usize,
    },
    /// No candidate directory contained a complete ROM set.
    NotFound { searched: Vec<PathBuf> },
}

impl fmt::Display for RomError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RomError::Io { name, path, source } => {
                write!(f, "cannot read {name} ROM at {}: {source}", path.display())
            }
            RomError::WrongSize {
                name,
                expected,
                actual,
            } => write!(f, "{name} ROM is {actual} bytes, expected {expected}"),
            RomError::NotFound { searched } => {
                writeln!(f, "C64 ROM files not found. Searched:")?;
                for dir in searched {
                    writeln!(f, "  {}", dir.display())?;
                }
                write!(
                    f,
                    "Place kernal (8192 B), basic (8192 B) and chargen (4096 B) \
                     images (.rom or .bin) in one of those directories, or set \
                     the C64_ROM_DIR environment variable."
                )
            }
        }
    }
}

impl std::error::Error for RomError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            RomError::Io { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// Validate a ROM image's size.
pub fn check_size(name: &'static str, data: &[u8], expected: usize) -> Result<(), RomError> {
    if data.len() == expected {
        Ok(())
    } else {
        Err(RomError::WrongSize {
            name,
            expected,
            actual: data.len(),
        })
    }
}

/// The three system ROM images.
#[derive(Debug)]
pub struct RomSet {
    pub kernal: Vec<u8>,
    pub basic: Vec<u8>,
    pub chargen: Vec<u8>,
}

impl RomSet {
    /// Search the standard paths and load all three images.
    pub fn load() -> Result<Self, RomError> {
        let mut searched = Vec::new();

        if let Ok(dir) = env::var("C64_ROM_DIR") {
            searched.push(PathBuf::from(dir));
        }
        if let Ok(cwd) = env::current_dir() {
            searched.push(cwd.join("roms"));
            searched.push(cwd);
        }

        for dir in &searched {
            if has_rom_set(dir) {
                return Self::load_from(dir);
            }
        }

        Err(RomError::NotFound { searched })
    }

    /// Load all three images from an explicit directory.
    pub fn load_from<P: AsRef<Path>>(dir: P) -> Result<Self, RomError> {
        let dir = dir.as_ref();
        Ok(Self {
            kernal: load_rom(dir, "kernal", "Kernal", 8192)?,
            basic: load_rom(dir, "basic", "BASIC", 8192)?,
            chargen: load_rom(dir, "chargen", "Character", 4096)?,
        })
    }
}

fn rom_path(dir: &Path, stem: &str) -> PathBuf {
    let rom = dir.join(format!("{stem}.rom"));
    if rom.is_file() {
        rom
    } else {
        dir.join(format!("{stem}.bin"))
    }
}

fn has_rom_set(dir: &Path) -> bool {
    ["kernal", "basic", "chargen"]
        .iter()
        .all(|stem| rom_path(dir, stem).is_file())
}

fn load_rom(dir: &Path, stem: &str, name: &'static str, expected: usize) -> Result<Vec<u8>, RomError> {
    let path = rom_path(dir, stem);
    let data = fs::read(&path).map_err(|source| RomError::Io {
        name,
        path: path.clone(),
        source,
    })?;
    check_size(name, &data, expected)?;
    Ok(data)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn size_check() {
        assert!(check_size("Kernal", &[0; 8192], 8192).is_ok());
        let err = check_size("Kernal", &[0; 100], 8192).unwrap_err();
        assert!(matches!(err, RomError::WrongSize { actual: 100, .. }));
        assert!(err.to_string().contains("8192"));
    }

    #[test]
    fn load_from_directory() {
        let dir = std::env::temp_dir().join("emu64-rom-test");
        fs::create_dir_all(&dir).expect("temp dir");
        fs::write(dir.join("kernal.rom"), vec![0xEE; 8192]).expect("write");
        fs::write(dir.join("basic.bin"), vec![0xBB; 8192]).expect("write");
        fs::write(dir.join("chargen.rom"), vec![0xCC; 4096]).expect("write");

        let set = RomSet::load_from(&dir).expect("loads");
        assert_eq!(set.kernal[0], 0xEE);
        assert_eq!(set.basic[0], 0xBB);
        assert_eq!(set.chargen.len(), 4096);

        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn missing_set_reports_searched_paths() {
        let err = RomSet::load_from(std::env::temp_dir().join("emu64-no-such-dir")).unwrap_err();
        assert!(matches!(err, RomError::Io { .. }));
    }
}
