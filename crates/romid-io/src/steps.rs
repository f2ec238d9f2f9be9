use romid_core::{layout, netlist, rtl, textblock};
use romid_core::{IdValue, PatchError, RomSpec};

use crate::backup::LayoutFiles;
use crate::error::RomIdError;
use crate::project::{read_text, write_text, ProjectPaths};

/// Everything a step needs to know about the run.
#[derive(Debug, Clone, Copy)]
pub struct PatchContext<'a> {
    pub paths: &'a ProjectPaths,
    pub rom: &'a RomSpec,
    pub value: IdValue,
}

/// How a step that did not fail ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepOutcome {
    Done,
    /// Reported but not fatal; the run continues.
    Incomplete(String),
}

/// One file rewrite in the programming sequence.
pub trait PatchStep: std::fmt::Debug {
    /// Human-readable description printed before the step runs.
    fn description(&self) -> String;
    /// Rewrite the step's file. Nothing is written when this fails.
    fn apply(&mut self, ctx: &PatchContext<'_>) -> Result<StepOutcome, RomIdError>;
}

// ══════════════════════════════════════════════════════════════════════
// Concrete Steps
// ══════════════════════════════════════════════════════════════════════

/// Move the vias of the set bits in the ROM layout.
#[derive(Debug)]
pub struct LayoutStep {
    cell: &'static str,
}

impl LayoutStep {
    pub fn new(rom: &RomSpec) -> Self {
        Self { cell: rom.cell }
    }
}

impl PatchStep for LayoutStep {
    fn description(&self) -> String {
        format!("Modify layout of the {} subcell", self.cell)
    }

    fn apply(&mut self, ctx: &PatchContext<'_>) -> Result<StepOutcome, RomIdError> {
        let files = LayoutFiles::new(ctx.paths, ctx.rom);
        let source = files.pristine_path().to_path_buf();
        let zero = read_text(&source)?;
        let patch = layout::program_vias(&zero, ctx.rom, &ctx.value)
            .map_err(|e| RomIdError::patch(&source, e))?;
        files.write_programmed(&patch.content)?;
        Ok(StepOutcome::Done)
    }
}

/// Set the ID parameter in the top-level RTL.
#[derive(Debug)]
pub struct RtlStep {
    label: &'static str,
}

impl RtlStep {
    pub fn new(rom: &RomSpec) -> Self {
        Self { label: rom.label }
    }
}

impl PatchStep for RtlStep {
    fn description(&self) -> String {
        format!("Add {} parameter to source verilog.", self.label)
    }

    fn apply(&mut self, ctx: &PatchContext<'_>) -> Result<StepOutcome, RomIdError> {
        let path = ctx.paths.rtl_top();
        let text = read_text(&path)?;
        let patched =
            rtl::set_parameter(&text, ctx.rom, &ctx.value).map_err(|e| RomIdError::patch(&path, e))?;
        write_text(&path, &patched)?;
        Ok(StepOutcome::Done)
    }
}

/// Flip the tie-cell polarity of the set bits in the gate-level netlist.
#[derive(Debug)]
pub struct NetlistStep {
    label: &'static str,
}

impl NetlistStep {
    pub fn new(rom: &RomSpec) -> Self {
        Self { label: rom.label }
    }
}

impl PatchStep for NetlistStep {
    fn description(&self) -> String {
        format!("Add {} parameter to gate-level verilog.", self.label)
    }

    fn apply(&mut self, ctx: &PatchContext<'_>) -> Result<StepOutcome, RomIdError> {
        let path = ctx.paths.netlist(ctx.rom);
        let text = read_text(&path)?;
        let patch = netlist::flip_polarity(&text, ctx.rom, &ctx.value)
            .map_err(|e| RomIdError::patch(&path, e))?;
        write_text(&path, &patch.content)?;
        Ok(StepOutcome::Done)
    }
}

/// Render the value's hex digits into the text block layout.
///
/// A short or missing digit count is reported, never fatal.
#[derive(Debug)]
pub struct TextBlockStep {
    label: &'static str,
    cell: &'static str,
}

impl TextBlockStep {
    pub fn new(rom: &RomSpec, cell: &'static str) -> Self {
        Self {
            label: rom.label,
            cell,
        }
    }
}

impl PatchStep for TextBlockStep {
    fn description(&self) -> String {
        format!("Add {} text to top level layout.", self.label)
    }

    fn apply(&mut self, ctx: &PatchContext<'_>) -> Result<StepOutcome, RomIdError> {
        let path = ctx.paths.text_block(self.cell);
        let text = read_text(&path)?;
        let patch = match textblock::render_digits(&text, &ctx.value) {
            Ok(patch) => patch,
            Err(PatchError::NoDigits) => {
                return Ok(StepOutcome::Incomplete(PatchError::NoDigits.to_string()))
            }
            Err(e) => return Err(RomIdError::patch(&path, e)),
        };
        write_text(&path, &patch.content)?;

        if patch.is_complete(&ctx.value) {
            Ok(StepOutcome::Done)
        } else if patch.found > patch.digits {
            Ok(StepOutcome::Incomplete(format!(
                "Found {} digit lines in the layout; only the first {} were replaced.",
                patch.found, patch.digits
            )))
        } else {
            Ok(StepOutcome::Incomplete(format!(
                "Only {} digits were replaced in the layout.",
                patch.digits
            )))
        }
    }
}

/// Events reported while a plan runs.
#[derive(Debug)]
pub enum StepEvent<'a> {
    Started { index: usize, description: String },
    Finished { index: usize, outcome: &'a StepOutcome },
}

/// The ordered steps that program one ROM.
///
/// Steps commit independently: a failure stops the plan but leaves files
/// written by earlier steps in place.
#[derive(Debug, Default)]
pub struct PatchPlan {
    steps: Vec<Box<dyn PatchStep>>,
}

impl PatchPlan {
    pub fn new() -> Self {
        Self { steps: Vec::new() }
    }

    /// Layout, RTL, netlist, and the text block when the ROM has one.
    pub fn for_rom(rom: &RomSpec) -> Self {
        let mut plan = Self::new();
        plan.push(Box::new(LayoutStep::new(rom)));
        plan.push(Box::new(RtlStep::new(rom)));
        plan.push(Box::new(NetlistStep::new(rom)));
        if let Some(cell) = rom.text_block {
            plan.push(Box::new(TextBlockStep::new(rom, cell)));
        }
        plan
    }

    pub fn push(&mut self, step: Box<dyn PatchStep>) {
        self.steps.push(step);
    }

    /// Run every step in order, stopping at the first error.
    pub fn run(
        &mut self,
        ctx: &PatchContext<'_>,
        mut on_event: impl FnMut(StepEvent<'_>),
    ) -> Result<Vec<StepOutcome>, RomIdError> {
        let mut outcomes = Vec::with_capacity(self.steps.len());
        for (index, step) in self.steps.iter_mut().enumerate() {
            on_event(StepEvent::Started {
                index,
                description: step.description(),
            });
            let outcome = step.apply(ctx)?;
            log::debug!("step {} finished: {:?}", index + 1, outcome);
            on_event(StepEvent::Finished {
                index,
                outcome: &outcome,
            });
            outcomes.push(outcome);
        }
        Ok(outcomes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use romid_core::{BitWidth, PRODUCT_ID_ROM, PROJECT_ID_ROM};
    use std::fs;
    use tempfile::TempDir;

    fn project(rom: &RomSpec) -> (TempDir, ProjectPaths) {
        let temp = TempDir::new().unwrap();
        for dir in ["mag", "verilog/rtl", "verilog/gl"] {
            fs::create_dir_all(temp.path().join(dir)).unwrap();
        }
        let paths = ProjectPaths::open(temp.path()).unwrap();
        let mut mag = String::from("magic\n<< viali >>\n");
        for (_, p) in rom.placements() {
            mag.push_str(&format!("{}\n", p.zero));
        }
        fs::write(paths.layout(rom), mag).unwrap();
        fs::write(
            paths.rtl_top(),
            "module panamax;\nparameter PRODUCT_ID = 8'h00;\nparameter PROJECT_ID = 32'h00000000;\nendmodule\n",
        )
        .unwrap();
        let mut gl = String::new();
        for bit in 0..rom.bit_count() {
            gl.push_str(&format!(
                "conb t{bit} (.HI(high[{bit}]), .LO(low[{bit}]));\nbuf b{bit} (.A(LO({}[{bit}])));\n",
                rom.signal
            ));
        }
        gl.push_str(&format!("conb z (.HI({} ));\n", rom.low_marker));
        fs::write(paths.netlist(rom), gl).unwrap();
        (temp, paths)
    }

    fn descriptions(plan: &PatchPlan) -> Vec<String> {
        plan.steps.iter().map(|s| s.description()).collect()
    }

    #[test]
    fn test_plan_order() {
        let plan = PatchPlan::for_rom(&PRODUCT_ID_ROM);
        assert_eq!(
            descriptions(&plan),
            vec![
                "Modify layout of the product_id_rom_8bit subcell",
                "Add product ID parameter to source verilog.",
                "Add product ID parameter to gate-level verilog.",
            ]
        );
        assert_eq!(PatchPlan::for_rom(&PROJECT_ID_ROM).steps.len(), 4);
    }

    #[test]
    fn test_run_product_plan() {
        let (_temp, paths) = project(&PRODUCT_ID_ROM);
        let value = IdValue::parse_hex("3", BitWidth::Bits8).unwrap();
        let ctx = PatchContext {
            paths: &paths,
            rom: &PRODUCT_ID_ROM,
            value,
        };
        let mut started = Vec::new();
        let mut finished = Vec::new();
        let mut plan = PatchPlan::for_rom(&PRODUCT_ID_ROM);
        let outcomes = plan
            .run(&ctx, |event| match event {
                StepEvent::Started { index, .. } => started.push(index),
                StepEvent::Finished { index, .. } => finished.push(index),
            })
            .unwrap();

        assert_eq!(started, vec![0, 1, 2]);
        assert_eq!(finished, vec![0, 1, 2]);
        assert!(outcomes.iter().all(|o| *o == StepOutcome::Done));
        assert!(paths.layout_backup(&PRODUCT_ID_ROM).is_file());
        let rtl = fs::read_to_string(paths.rtl_top()).unwrap();
        assert!(rtl.contains("parameter PRODUCT_ID = 8'h03;"));
        let gl = fs::read_to_string(paths.netlist(&PRODUCT_ID_ROM)).unwrap();
        assert!(gl.contains("(.HI(low[1]), .LO(high[1]))"));
        assert!(gl.contains("LO(\\prod_id_low )"));
    }

    #[test]
    fn test_failed_step_stops_plan() {
        let (_temp, paths) = project(&PRODUCT_ID_ROM);
        fs::write(paths.rtl_top(), "module panamax;\nendmodule\n").unwrap();
        let value = IdValue::parse_hex("80", BitWidth::Bits8).unwrap();
        let ctx = PatchContext {
            paths: &paths,
            rom: &PRODUCT_ID_ROM,
            value,
        };
        let mut finished = Vec::new();
        let mut plan = PatchPlan::for_rom(&PRODUCT_ID_ROM);
        let err = plan
            .run(&ctx, |event| {
                if let StepEvent::Finished { index, .. } = event {
                    finished.push(index);
                }
            })
            .unwrap_err();

        assert!(matches!(
            err,
            RomIdError::Patch {
                source: PatchError::NoSubstitutions(_),
                ..
            }
        ));
        // The layout step already committed.
        assert_eq!(finished, vec![0]);
        let gl = fs::read_to_string(paths.netlist(&PRODUCT_ID_ROM)).unwrap();
        assert!(gl.contains("(.HI(high[7]), .LO(low[7]))"));
    }

    #[test]
    fn test_text_block_partial_is_not_fatal() {
        let (_temp, paths) = project(&PROJECT_ID_ROM);
        fs::write(
            paths.text_block("project_id_textblock"),
            "use alpha_0 alphaX_0\nuse alpha_0 alphaX_1\n",
        )
        .unwrap();
        let value = IdValue::parse_hex("000000A1", BitWidth::Bits32).unwrap();
        let ctx = PatchContext {
            paths: &paths,
            rom: &PROJECT_ID_ROM,
            value,
        };
        let mut step = TextBlockStep::new(&PROJECT_ID_ROM, "project_id_textblock");
        let outcome = step.apply(&ctx).unwrap();
        assert_eq!(
            outcome,
            StepOutcome::Incomplete("Only 2 digits were replaced in the layout.".into())
        );
        let mag = fs::read_to_string(paths.text_block("project_id_textblock")).unwrap();
        assert_eq!(mag, "use alpha_1 alphaX_0 hexdigits\nuse alpha_A alphaX_1 hexdigits\n");
    }
}
