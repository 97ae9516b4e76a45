//! The harness: instantiate once, then make every planned call in order.

use std::io::Write;

use bon::Builder;
use eyre::{Result, WrapErr};

use crate::{
	engine::{ModuleEngine, ModuleInstance},
	plan::CallPlan,
	source::{ExportKind, ModuleSource},
	value::Output,
};

/// Runs a call plan against a module, printing one line per call.
#[derive(Builder)]
pub struct Runner<E: ModuleEngine> {
	engine: E,
	#[builder(default)]
	plan: CallPlan,
}

impl<E: ModuleEngine> Runner<E> {
	pub fn plan(&self) -> &CallPlan {
		&self.plan
	}

	/// Instantiates `source` and makes each call of the plan, writing each result to `out` as soon as it
	/// is produced. Stops at the first failure; lines already written stay written.
	///
	/// Returns the number of lines written.
	pub fn run(&self, source: &ModuleSource, out: &mut impl Write) -> Result<usize> {
		self.warn_missing_exports(source);

		let mut instance = self.engine.compile_and_instantiate(source)?;
		for call in &self.plan.calls {
			log::debug!("Calling {call}");
			let results = instance
				.call(&call.export, &call.args)
				.wrap_err_with(|| format!("calling {call}"))?;
			let line = Output(results);
			log::debug!("{call} -> {line}");
			writeln!(out, "{line}").wrap_err("writing output")?;
			out.flush().wrap_err("writing output")?;
		}
		Ok(self.plan.calls.len())
	}

	/// Looks ahead at the module's exports so a missing name is flagged before anything runs.
	fn warn_missing_exports(&self, source: &ModuleSource) {
		let exports = match source.exports() {
			Ok(e) => e,
			Err(err) => {
				log::debug!("Could not list exports of {}: {err:#}", source.path.display());
				return;
			}
		};
		for name in self.plan.exports() {
			let found = exports
				.iter()
				.any(|e| e.name == name && e.kind == ExportKind::Func);
			if !found {
				log::warn!(
					"{} has no exported function `{name}`; the run will stop there",
					source.path.display()
				);
			}
		}
	}
}
