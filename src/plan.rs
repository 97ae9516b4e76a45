use std::{fmt, fs, path::Path};

use eyre::{Result, WrapErr};
use serde::Deserialize;

use crate::value::Arg;

/// One export invocation with literal arguments.
#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct Call {
	pub export: String,
	#[serde(default)]
	pub args: Vec<Arg>,
}

impl Call {
	pub fn new(export: &str, args: impl IntoIterator<Item = Arg>) -> Self {
		Call {
			export: export.to_string(),
			args: args.into_iter().collect(),
		}
	}
}

impl fmt::Display for Call {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}(", self.export)?;
		for (i, arg) in self.args.iter().enumerate() {
			if i > 0 {
				f.write_str(", ")?;
			}
			write!(f, "{arg}")?;
		}
		f.write_str(")")
	}
}

/// The ordered list of calls made against an instance. Can be loaded from a TOML file.
#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct CallPlan {
	#[serde(rename = "call", default)]
	pub calls: Vec<Call>,
}

impl CallPlan {
	pub fn load(path: impl AsRef<Path>) -> Result<Self> {
		let path = path.as_ref();
		let contents =
			fs::read_to_string(path).wrap_err_with(|| format!("reading plan {}", path.display()))?;
		let plan: CallPlan = toml::from_str(&contents)
			.wrap_err_with(|| format!("parsing plan {}", path.display()))?;
		log::debug!("Loaded {} calls from {}", plan.calls.len(), path.display());
		Ok(plan)
	}

	/// Names of every export the plan touches, first-use order, no repeats.
	pub fn exports(&self) -> Vec<&str> {
		let mut out: Vec<&str> = Vec::new();
		for call in &self.calls {
			if !out.contains(&call.export.as_str()) {
				out.push(&call.export);
			}
		}
		out
	}
}

impl Default for CallPlan {
	/// duplicate, three temperature conversions, three quadratics
	fn default() -> Self {
		use Arg::{Float, Int};
		CallPlan {
			calls: vec![
				Call::new("duplicate", [Int(21)]),
				Call::new("f2c", [Float(212.0)]),
				Call::new("f2c", [Float(32.0)]),
				Call::new("f2c", [Float(-40.0)]),
				Call::new("root", [Float(2.0), Float(4.0), Float(2.0)]),
				Call::new("root", [Float(1.0), Float(1.0), Float(0.0)]),
				Call::new("root", [Float(4.0), Float(5.0), Float(1.0)]),
			],
		}
	}
}
