//! Host platform traits that change how binaries are named, launched and how
//! toolchain output is decoded.

use std::path::{Path, PathBuf};

use target_lexicon::{OperatingSystem, Triple};

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum OsFamily {
    Windows,
    MacOs,
    Unix,
}

/// Computed once at startup and passed to whoever needs it.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Platform {
    pub os: OsFamily,
}

impl Platform {
    pub fn new(os: OsFamily) -> Self {
        Self { os }
    }

    pub fn host() -> Self {
        Self::from_triple(&Triple::host())
    }

    pub fn from_triple(triple: &Triple) -> Self {
        let os = match triple.operating_system {
            OperatingSystem::Windows => OsFamily::Windows,
            OperatingSystem::Darwin(_) | OperatingSystem::MacOSX(_) => OsFamily::MacOs,
            _ => OsFamily::Unix,
        };
        Self { os }
    }

    /// Suffix appended to a linked program, if any
    pub fn exe_suffix(&self) -> Option<&'static str> {
        match self.os {
            OsFamily::Windows => Some("exe"),
            OsFamily::MacOs => Some("app"),
            OsFamily::Unix => None,
        }
    }

    /// Path used to launch a freshly built program from the working directory.
    pub fn run_path(&self, dest: &Path) -> PathBuf {
        if self.os == OsFamily::Windows || dest.is_absolute() {
            dest.to_path_buf()
        } else {
            Path::new(".").join(dest)
        }
    }

    /// Decode captured child output. Windows toolchains emit UTF-16.
    pub fn decode(&self, bytes: &[u8]) -> String {
        match self.os {
            OsFamily::Windows => {
                let units: Vec<u16> = bytes
                    .chunks_exact(2)
                    .map(|pair| u16::from_le_bytes([pair[0], pair[1]]))
                    .collect();
                String::from_utf16_lossy(&units)
            }
            _ => String::from_utf8_lossy(bytes).into_owned(),
        }
    }
}

impl Default for Platform {
    fn default() -> Self {
        Self::host()
    }
}
