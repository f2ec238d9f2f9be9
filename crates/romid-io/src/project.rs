use std::fs;
use std::path::{Path, PathBuf};

use romid_core::RomSpec;

use crate::error::RomIdError;

/// Top-level RTL module carrying the ID parameters.
pub const RTL_TOP: &str = "panamax";

/// File layout of a Panamax project directory.
#[derive(Debug, Clone)]
pub struct ProjectPaths {
    root: PathBuf,
}

impl ProjectPaths {
    /// Open a project rooted at `root`, which must be a readable directory.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self, RomIdError> {
        let root = root.into();
        if !root.is_dir() {
            return Err(RomIdError::ProjectNotFound(root));
        }
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn info_yaml(&self) -> PathBuf {
        self.root.join("info.yaml")
    }

    pub fn mag_dir(&self) -> PathBuf {
        self.root.join("mag")
    }

    pub fn verilog_dir(&self) -> PathBuf {
        self.root.join("verilog")
    }

    pub fn rtl_top(&self) -> PathBuf {
        self.verilog_dir().join("rtl").join(format!("{RTL_TOP}.v"))
    }

    pub fn netlist(&self, rom: &RomSpec) -> PathBuf {
        self.verilog_dir().join("gl").join(format!("{}.v", rom.cell))
    }

    pub fn layout(&self, rom: &RomSpec) -> PathBuf {
        self.mag_dir().join(format!("{}.mag", rom.cell))
    }

    /// Preserved zero-state copy of the ROM layout.
    pub fn layout_backup(&self, rom: &RomSpec) -> PathBuf {
        self.mag_dir().join(format!("{}_zero.mag", rom.cell))
    }

    pub fn text_block(&self, cell: &str) -> PathBuf {
        self.mag_dir().join(format!("{cell}.mag"))
    }

    /// Both source trees must exist before anything is patched.
    pub fn check_source_dirs(&self) -> Result<(), RomIdError> {
        for (path, what) in [
            (self.verilog_dir(), "verilog"),
            (self.mag_dir(), "magic databases"),
        ] {
            if !path.is_dir() {
                return Err(RomIdError::MissingDirectory { path, what });
            }
        }
        Ok(())
    }
}

/// Look up `key` in a line-oriented `key: value` metadata file.
///
/// Each line is split at its first colon; key and value are trimmed and
/// the value loses any surrounding quote characters. The first matching
/// line wins.
pub fn read_info_value(path: &Path, key: &str) -> Result<Option<String>, RomIdError> {
    let text = fs::read_to_string(path).map_err(|e| RomIdError::io(path, e))?;
    Ok(find_info_value(&text, key))
}

pub(crate) fn find_info_value(text: &str, key: &str) -> Option<String> {
    text.lines()
        .filter_map(|line| line.split_once(':'))
        .find(|(k, _)| k.trim() == key)
        .map(|(_, v)| v.trim().trim_matches(|c: char| c == '"' || c == '\'').to_string())
}

/// Read a whole text file, mapping a missing file to [`RomIdError::MissingFile`].
pub(crate) fn read_text(path: &Path) -> Result<String, RomIdError> {
    log::debug!("reading {}", path.display());
    fs::read_to_string(path).map_err(|e| RomIdError::io(path, e))
}

pub(crate) fn write_text(path: &Path, content: &str) -> Result<(), RomIdError> {
    log::debug!("writing {} ({} bytes)", path.display(), content.len());
    fs::write(path, content).map_err(|e| RomIdError::io(path, e))
}
