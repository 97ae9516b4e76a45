//! The boundary between the runner and whatever engine compiles and executes modules.

use derive_more::derive::Display;
use eyre::Result;

use crate::{source::ModuleSource, value::Arg, value::Value};

/// Compilation strategy used to turn a module into executable code.
#[derive(clap::ValueEnum, Display, Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum Backend {
	/// Let the engine pick its default compiler
	#[default]
	#[display("auto")]
	Auto,
	/// Optimizing Cranelift code generator
	#[display("cranelift")]
	Cranelift,
}

/// Something that can translate, compile and instantiate a module from its source.
/// The backend is fixed when the engine is constructed.
pub trait ModuleEngine {
	type Instance: ModuleInstance;

	/// Produces a live instance from the given source. Fails if the source does not translate, validate,
	/// compile, or instantiate.
	fn compile_and_instantiate(&self, source: &ModuleSource) -> Result<Self::Instance>;
}

/// A runnable module instance exposing exports by name.
pub trait ModuleInstance {
	/// Calls the named export, coercing `args` to its parameter types, and returns its results in order.
	fn call(&mut self, name: &str, args: &[Arg]) -> Result<Vec<Value>>;
}

impl<E: ModuleEngine> ModuleEngine for &E {
	type Instance = E::Instance;

	fn compile_and_instantiate(&self, source: &ModuleSource) -> Result<Self::Instance> {
		(**self).compile_and_instantiate(source)
	}
}
