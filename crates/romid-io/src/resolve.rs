//! Working out which project to patch and which value to program.

use std::ffi::{OsStr, OsString};
use std::path::{Path, PathBuf};

use serde::Serialize;

use romid_core::rtl;
use romid_core::{IdValue, RomSpec, ValueError};

use crate::error::RomIdError;
use crate::project::{read_info_value, read_text, ProjectPaths};

/// Project directory and explicit value taken from the positional
/// arguments `[<hex_value>] [<project_path>]`.
#[derive(Debug, Clone, PartialEq)]
pub struct Target {
    pub root: PathBuf,
    pub explicit: Option<IdValue>,
}

impl Target {
    /// Interpret up to two positional arguments.
    ///
    /// A single argument that is not hex names the project directory
    /// instead of the value. Missing pieces default to `cwd` and no value.
    pub fn from_args(args: &[OsString], rom: &RomSpec, cwd: &Path) -> Result<Self, RomIdError> {
        match args {
            [] => Ok(Self {
                root: cwd.to_path_buf(),
                explicit: None,
            }),
            [only] => match parse_arg(only, rom) {
                Ok(value) => Ok(Self {
                    root: cwd.to_path_buf(),
                    explicit: Some(value),
                }),
                Err(ValueError::NotHex { .. }) => Ok(Self {
                    root: PathBuf::from(only),
                    explicit: None,
                }),
                Err(e) => Err(e.into()),
            },
            [value, path, ..] => Ok(Self {
                root: PathBuf::from(path),
                explicit: Some(parse_arg(value, rom)?),
            }),
        }
    }
}

fn parse_arg(text: &OsStr, rom: &RomSpec) -> Result<IdValue, ValueError> {
    match text.to_str() {
        Some(text) => IdValue::parse_hex(text, rom.width),
        None => Err(ValueError::NotHex {
            text: text.to_string_lossy().into_owned(),
            digits: rom.width.hex_digits(),
        }),
    }
}

/// Where a resolved value came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IdSource {
    Argument,
    InfoYaml,
    Rtl,
    /// Report mode found nothing; the value is zero.
    Unset,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Resolved {
    pub value: IdValue,
    pub source: IdSource,
}

impl Resolved {
    /// Reject the unprogrammed value; zero never goes into a ROM.
    pub fn require_nonzero(&self, rom: &RomSpec) -> Result<IdValue, RomIdError> {
        if self.value.is_zero() {
            return Err(RomIdError::ZeroValue { label: rom.label });
        }
        Ok(self.value)
    }
}

/// Resolve the identifier from, in order: the explicit argument, the
/// `info.yaml` entry named after the ROM signal, and (report mode only)
/// the parameter already present in the top-level RTL.
pub fn resolve_value(
    paths: &ProjectPaths,
    rom: &RomSpec,
    explicit: Option<IdValue>,
    report: bool,
) -> Result<Resolved, RomIdError> {
    if let Some(value) = explicit {
        return Ok(Resolved {
            value,
            source: IdSource::Argument,
        });
    }

    let info = paths.info_yaml();
    if info.is_file() {
        let text = read_info_value(&info, rom.signal)?
            .filter(|v| !v.is_empty())
            .ok_or(RomIdError::MissingKey { key: rom.signal })?;
        let value = IdValue::parse_hex(&text, rom.width)?;
        log::info!("{} {} read from {}", rom.label, value, info.display());
        return Ok(Resolved {
            value,
            source: IdSource::InfoYaml,
        });
    }

    if !report {
        return Err(RomIdError::NoMetadata { label: rom.label });
    }

    let unset = Resolved {
        value: IdValue::zero(rom.width),
        source: IdSource::Unset,
    };
    let rtl_top = paths.rtl_top();
    if !rtl_top.is_file() {
        log::warn!(
            "Cannot find top-level RTL {}. Is this being run in the project directory?",
            rtl_top.display()
        );
        return Ok(unset);
    }
    let found = rtl::find_parameter(&read_text(&rtl_top)?, rom)
        .map_err(|e| RomIdError::patch(&rtl_top, e))?;
    Ok(found
        .map(|value| Resolved {
            value,
            source: IdSource::Rtl,
        })
        .unwrap_or(unset))
}

#[cfg(test)]
mod tests {
    use super::*;
    use romid_core::{BitWidth, PRODUCT_ID_ROM, PROJECT_ID_ROM};
    use std::fs;
    use tempfile::TempDir;

    fn args(list: &[&str]) -> Vec<OsString> {
        list.iter().map(OsString::from).collect()
    }

    #[test]
    fn test_target_defaults_to_cwd() {
        let cwd = Path::new("/work");
        let t = Target::from_args(&[], &PRODUCT_ID_ROM, cwd).unwrap();
        assert_eq!(t.root, cwd);
        assert_eq!(t.explicit, None);

        let t = Target::from_args(&args(&["3"]), &PRODUCT_ID_ROM, cwd).unwrap();
        assert_eq!(t.root, cwd);
        assert_eq!(t.explicit.unwrap().value(), 3);
    }

    #[test]
    fn test_target_single_path_argument() {
        let t = Target::from_args(&args(&["../chip"]), &PRODUCT_ID_ROM, Path::new("/work")).unwrap();
        assert_eq!(t.root, PathBuf::from("../chip"));
        assert_eq!(t.explicit, None);
    }

    #[test]
    fn test_target_value_and_path() {
        let t = Target::from_args(&args(&["0xBEEF", "/chip"]), &PROJECT_ID_ROM, Path::new("/work"))
            .unwrap();
        assert_eq!(t.root, PathBuf::from("/chip"));
        assert_eq!(t.explicit.unwrap().to_hex(), "0000BEEF");

        assert!(matches!(
            Target::from_args(&args(&["chip", "/chip"]), &PROJECT_ID_ROM, Path::new("/work")),
            Err(RomIdError::Value(ValueError::NotHex { .. }))
        ));
    }

    #[cfg(unix)]
    #[test]
    fn test_target_non_utf8_arguments() {
        use std::os::unix::ffi::OsStrExt;

        let raw = OsStr::from_bytes(b"proj\xff").to_os_string();
        let t = Target::from_args(&[raw.clone()], &PRODUCT_ID_ROM, Path::new("/work")).unwrap();
        assert_eq!(t.root, PathBuf::from(&raw));
        assert_eq!(t.explicit, None);

        let t = Target::from_args(&[OsString::from("A5"), raw.clone()], &PRODUCT_ID_ROM, Path::new("/work"))
            .unwrap();
        assert_eq!(t.root, PathBuf::from(&raw));
        assert_eq!(t.explicit.unwrap().value(), 0xA5);

        assert!(matches!(
            Target::from_args(&[raw, OsString::from("/chip")], &PRODUCT_ID_ROM, Path::new("/work")),
            Err(RomIdError::Value(ValueError::NotHex { digits: 2, .. }))
        ));
    }

    #[test]
    fn test_target_too_wide_is_not_a_path() {
        assert!(matches!(
            Target::from_args(&args(&["1FF"]), &PRODUCT_ID_ROM, Path::new("/work")),
            Err(RomIdError::Value(ValueError::TooWide { .. }))
        ));
    }

    #[test]
    fn test_argument_and_info_yaml_agree() {
        let temp = TempDir::new().unwrap();
        let paths = ProjectPaths::open(temp.path()).unwrap();
        for text in ["01", "7F", "a5", "FF"] {
            fs::write(paths.info_yaml(), format!("project:\n  product_id: \"{text}\"\n")).unwrap();
            let from_yaml = resolve_value(&paths, &PRODUCT_ID_ROM, None, false).unwrap();
            let explicit = IdValue::parse_hex(text, BitWidth::Bits8).unwrap();
            let from_arg = resolve_value(&paths, &PRODUCT_ID_ROM, Some(explicit), false).unwrap();
            assert_eq!(from_yaml.value, from_arg.value);
            assert_eq!(from_yaml.source, IdSource::InfoYaml);
            assert_eq!(from_arg.source, IdSource::Argument);
        }
    }

    #[test]
    fn test_info_yaml_errors() {
        let temp = TempDir::new().unwrap();
        let paths = ProjectPaths::open(temp.path()).unwrap();

        fs::write(paths.info_yaml(), "project_id: 00000001\n").unwrap();
        assert!(matches!(
            resolve_value(&paths, &PRODUCT_ID_ROM, None, false),
            Err(RomIdError::MissingKey { key: "product_id" })
        ));

        fs::write(paths.info_yaml(), "product_id: zz\n").unwrap();
        assert!(matches!(
            resolve_value(&paths, &PRODUCT_ID_ROM, None, true),
            Err(RomIdError::Value(ValueError::NotHex { .. }))
        ));
    }

    #[test]
    fn test_no_metadata_outside_report_mode() {
        let temp = TempDir::new().unwrap();
        let paths = ProjectPaths::open(temp.path()).unwrap();
        assert!(matches!(
            resolve_value(&paths, &PROJECT_ID_ROM, None, false),
            Err(RomIdError::NoMetadata { .. })
        ));
    }

    #[test]
    fn test_report_reads_rtl_parameter() {
        let temp = TempDir::new().unwrap();
        let paths = ProjectPaths::open(temp.path()).unwrap();

        let r = resolve_value(&paths, &PROJECT_ID_ROM, None, true).unwrap();
        assert_eq!(r.source, IdSource::Unset);
        assert!(r.value.is_zero());

        fs::create_dir_all(temp.path().join("verilog/rtl")).unwrap();
        fs::write(paths.rtl_top(), "module panamax;\nendmodule\n").unwrap();
        let r = resolve_value(&paths, &PROJECT_ID_ROM, None, true).unwrap();
        assert_eq!(r.source, IdSource::Unset);

        fs::write(
            paths.rtl_top(),
            "module panamax;\n  parameter PROJECT_ID = 32'h0000BEEF;\n  parameter PROJECT_ID = 32'h00000001;\nendmodule\n",
        )
        .unwrap();
        let r = resolve_value(&paths, &PROJECT_ID_ROM, None, true).unwrap();
        assert_eq!(r.source, IdSource::Rtl);
        assert_eq!(r.value.value(), 0xBEEF);
    }

    #[test]
    fn test_zero_rejected() {
        let zero = Resolved {
            value: IdValue::zero(BitWidth::Bits8),
            source: IdSource::Argument,
        };
        assert!(matches!(
            zero.require_nonzero(&PRODUCT_ID_ROM),
            Err(RomIdError::ZeroValue { label: "product ID" })
        ));
    }
}
