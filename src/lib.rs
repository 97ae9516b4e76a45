//! Loads a WebAssembly text module, instantiates it, and prints the results of a fixed sequence of export calls.

pub mod engine;
pub mod plan;
pub mod runner;
pub mod source;
pub mod value;
pub mod wasm;

pub mod prelude {
	pub use crate::engine::{Backend, ModuleEngine, ModuleInstance};
	pub use crate::plan::{Call, CallPlan};
	pub use crate::runner::Runner;
	pub use crate::source::ModuleSource;
	pub use crate::value::{Arg, Output, Value};
	pub use crate::wasm::WasmtimeEngine;
}
