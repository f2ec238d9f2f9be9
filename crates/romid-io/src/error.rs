use std::io;
use std::path::PathBuf;

use thiserror::Error;

use romid_core::{PatchError, ValueError};

#[derive(Error, Debug)]
pub enum RomIdError {
    #[error("Project path \"{}\" does not exist or is not readable.", .0.display())]
    ProjectNotFound(PathBuf),

    #[error("No directory {} found (path to {what}).", .path.display())]
    MissingDirectory { path: PathBuf, what: &'static str },

    #[error("Cannot find {}.", .0.display())]
    MissingFile(PathBuf),

    #[error("No info.yaml file and no {label} argument given.")]
    NoMetadata { label: &'static str },

    #[error("No {key} key:value pair found in project info.yaml.")]
    MissingKey { key: &'static str },

    #[error("{0}")]
    Value(#[from] ValueError),

    #[error("Value zero is an invalid {label}.")]
    ZeroValue { label: &'static str },

    #[error("I/O error on {}: {source}", .path.display())]
    Io { path: PathBuf, source: io::Error },

    #[error("{source} ({})", .path.display())]
    Patch { path: PathBuf, source: PatchError },
}

impl RomIdError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        let path = path.into();
        if source.kind() == io::ErrorKind::NotFound {
            RomIdError::MissingFile(path)
        } else {
            RomIdError::Io { path, source }
        }
    }

    pub(crate) fn patch(path: impl Into<PathBuf>, source: PatchError) -> Self {
        RomIdError::Patch {
            path: path.into(),
            source,
        }
    }
}
