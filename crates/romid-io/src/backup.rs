use std::fs;
use std::path::{Path, PathBuf};

use romid_core::RomSpec;

use crate::error::RomIdError;
use crate::project::{read_text, write_text, ProjectPaths};

/// The ROM layout together with its preserved zero-state copy.
///
/// Programming always starts from the zero state: once the backup exists
/// it is the only file ever read, so the result does not depend on what
/// earlier runs wrote into the live layout.
#[derive(Debug, Clone)]
pub struct LayoutFiles {
    pub layout: PathBuf,
    pub backup: PathBuf,
}

impl LayoutFiles {
    pub fn new(paths: &ProjectPaths, rom: &RomSpec) -> Self {
        Self {
            layout: paths.layout(rom),
            backup: paths.layout_backup(rom),
        }
    }

    pub fn has_backup(&self) -> bool {
        self.backup.is_file()
    }

    /// The file holding the zero-state layout.
    pub fn pristine_path(&self) -> &Path {
        if self.has_backup() {
            &self.backup
        } else {
            &self.layout
        }
    }

    pub fn read_pristine(&self) -> Result<String, RomIdError> {
        read_text(self.pristine_path())
    }

    /// Move the live layout aside as the zero-state backup unless a backup
    /// already exists. Returns whether a backup was created.
    pub fn ensure_backup(&self) -> Result<bool, RomIdError> {
        if self.has_backup() {
            return Ok(false);
        }
        fs::rename(&self.layout, &self.backup).map_err(|e| RomIdError::io(&self.layout, e))?;
        log::info!(
            "zero-state layout preserved as {}",
            self.backup.display()
        );
        Ok(true)
    }

    /// Write a programmed layout, preserving the zero state first.
    pub fn write_programmed(&self, content: &str) -> Result<(), RomIdError> {
        self.ensure_backup()?;
        write_text(&self.layout, content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use romid_core::PRODUCT_ID_ROM;
    use tempfile::TempDir;

    fn project() -> (TempDir, LayoutFiles) {
        let temp = TempDir::new().unwrap();
        fs::create_dir(temp.path().join("mag")).unwrap();
        let paths = ProjectPaths::open(temp.path()).unwrap();
        let files = LayoutFiles::new(&paths, &PRODUCT_ID_ROM);
        fs::write(&files.layout, "zero\n").unwrap();
        (temp, files)
    }

    #[test]
    fn test_reads_live_layout_until_backed_up() {
        let (_temp, files) = project();
        assert_eq!(files.pristine_path(), files.layout.as_path());
        assert_eq!(files.read_pristine().unwrap(), "zero\n");
    }

    #[test]
    fn test_ensure_backup_is_idempotent() {
        let (_temp, files) = project();
        assert!(files.ensure_backup().unwrap());
        assert!(!files.layout.exists());
        assert!(!files.ensure_backup().unwrap());
        assert_eq!(fs::read_to_string(&files.backup).unwrap(), "zero\n");
    }

    #[test]
    fn test_second_write_keeps_original_backup() {
        let (_temp, files) = project();
        files.write_programmed("first\n").unwrap();
        files.write_programmed("second\n").unwrap();
        assert_eq!(fs::read_to_string(&files.layout).unwrap(), "second\n");
        assert_eq!(files.read_pristine().unwrap(), "zero\n");
    }

    #[test]
    fn test_missing_layout() {
        let (_temp, files) = project();
        fs::remove_file(&files.layout).unwrap();
        assert!(matches!(
            files.read_pristine(),
            Err(RomIdError::MissingFile(_))
        ));
    }
}
