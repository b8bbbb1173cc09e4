//! tyshape_compiler: Session orchestration.
//!
//! A `Session` holds the options and the programs to check. Every program
//! is checked in its own pass with its own type arena, so units never share
//! state and can be checked in parallel.

use rayon::prelude::*;
use tracing::{debug, info_span};
use tyshape_ast::Program;
use tyshape_checker::{check_program, CheckResult};
use tyshape_diagnostics::DiagnosticCollection;
use tyshape_options::{parse_options, parse_options_file, CheckerOptions, OptionsError};

mod logging;

pub use logging::init_tracing;

/// One named program to check.
#[derive(Debug, Clone)]
pub struct CheckUnit {
    pub name: String,
    pub program: Program,
}

/// The outcome of checking one unit.
#[derive(Debug)]
pub struct UnitResult {
    pub name: String,
    pub result: CheckResult,
}

/// A set of units checked under one set of options.
#[derive(Debug, Default)]
pub struct Session {
    options: CheckerOptions,
    units: Vec<CheckUnit>,
}

impl Session {
    pub fn new(options: CheckerOptions) -> Self {
        Self {
            options,
            units: Vec::new(),
        }
    }

    /// Create a session from a JSON options object.
    pub fn from_options_json(content: &str) -> Result<Self, OptionsError> {
        Ok(Self::new(parse_options(content)?))
    }

    /// Create a session from an options file on disk.
    pub fn from_options_file(path: &std::path::Path) -> Result<Self, OptionsError> {
        Ok(Self::new(parse_options_file(path)?))
    }

    pub fn options(&self) -> &CheckerOptions {
        &self.options
    }

    /// Add a program to the session.
    pub fn add_unit(&mut self, name: impl Into<String>, program: Program) {
        self.units.push(CheckUnit {
            name: name.into(),
            program,
        });
    }

    pub fn units(&self) -> &[CheckUnit] {
        &self.units
    }

    /// Check every unit in order on the current thread.
    pub fn check_all(&self) -> Vec<UnitResult> {
        let _span = info_span!("check_all", units = self.units.len()).entered();
        self.units.iter().map(|unit| self.check_unit(unit)).collect()
    }

    /// Check every unit on the rayon pool. Results come back in unit order.
    pub fn check_all_parallel(&self) -> Vec<UnitResult> {
        let _span = info_span!("check_all_parallel", units = self.units.len()).entered();
        self.units
            .par_iter()
            .map(|unit| self.check_unit(unit))
            .collect()
    }

    fn check_unit(&self, unit: &CheckUnit) -> UnitResult {
        let result = check_program(&unit.program, &self.options);
        debug!(
            unit = %unit.name,
            diagnostics = result.diagnostics.len(),
            "unit checked"
        );
        UnitResult {
            name: unit.name.clone(),
            result,
        }
    }
}

/// Merge the diagnostics of every unit, in unit order.
pub fn collect_diagnostics(results: Vec<UnitResult>) -> DiagnosticCollection {
    let mut all = DiagnosticCollection::new();
    for unit in results {
        all.extend(unit.result.diagnostics);
    }
    all
}

/// Render results one diagnostic per line, each prefixed with its unit name.
pub fn render_results(results: &[UnitResult]) -> String {
    let mut out = String::new();
    for unit in results {
        for diagnostic in unit.result.diagnostics.diagnostics() {
            out.push_str(&unit.name);
            out.push_str(": ");
            out.push_str(&diagnostic.to_string());
            out.push('\n');
        }
    }
    out
}
