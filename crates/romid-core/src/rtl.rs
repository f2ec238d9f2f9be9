//! The `parameter <NAME> = N'h<HEX>;` line in the top-level RTL.

use regex::Regex;

use crate::error::PatchError;
use crate::rom::RomSpec;
use crate::value::IdValue;

/// Regex matching the declaration line, hex digits captured in group 1.
pub fn parameter_regex(rom: &RomSpec) -> Result<Regex, PatchError> {
    let pattern = format!(
        r"parameter {} = {}([0-9A-F]+);",
        regex::escape(rom.parameter),
        regex::escape(&rom.width.verilog_prefix()),
    );
    Ok(Regex::new(&pattern)?)
}

/// Render the declaration for `value`.
pub fn parameter_line(rom: &RomSpec, value: &IdValue) -> String {
    format!(
        "parameter {} = {}{};",
        rom.parameter,
        rom.width.verilog_prefix(),
        value.to_hex()
    )
}

/// Rewrite every declaration of the ROM parameter to carry `value`.
///
/// Lines are rewritten one at a time and written back newline-terminated.
/// Fails when no line changed, including when the file already holds
/// exactly this value.
pub fn set_parameter(content: &str, rom: &RomSpec, value: &IdValue) -> Result<String, PatchError> {
    let re = parameter_regex(rom)?;
    let replacement = parameter_line(rom, value);
    let mut changed = 0usize;
    let mut out = String::with_capacity(content.len() + 16);

    for line in content.lines() {
        let new_line = re.replace_all(line, regex::NoExpand(&replacement));
        if new_line != line {
            changed += 1;
        }
        out.push_str(&new_line);
        out.push('\n');
    }

    if changed == 0 {
        return Err(PatchError::NoSubstitutions(format!(
            "{} parameter",
            rom.parameter
        )));
    }
    log::info!("{}: {} line(s) rewritten", rom.parameter, changed);
    Ok(out)
}

/// Value of the first declaration in `content`, if any.
pub fn find_parameter(content: &str, rom: &RomSpec) -> Result<Option<IdValue>, PatchError> {
    let re = parameter_regex(rom)?;
    for line in content.lines() {
        if let Some(caps) = re.captures(line) {
            match IdValue::parse_hex(&caps[1], rom.width) {
                Ok(value) => return Ok(Some(value)),
                Err(e) => {
                    log::warn!("{}: {}", rom.parameter, e);
                    return Ok(None);
                }
            }
        }
    }
    Ok(None)
}
