//! wasmtime-backed engine.

use eyre::{eyre, Result, WrapErr};
use wasmtime::{Config, Engine, Func, Instance, Linker, Module, Store, Strategy, Val, ValType};

use crate::{
	engine::{Backend, ModuleEngine, ModuleInstance},
	source::ModuleSource,
	value::{coerce_args, Arg, CallError, Value, ValueType},
};

/// Renders a wasmtime error, cause chain included, as a report.
fn report(err: wasmtime::Error) -> eyre::Report {
	eyre!("{err:#}")
}

/// Compiles modules with wasmtime, using one backend for its whole lifetime.
#[derive(Clone)]
pub struct WasmtimeEngine {
	engine: Engine,
	backend: Backend,
}

impl WasmtimeEngine {
	pub fn new(backend: Backend) -> Result<Self> {
		let mut config = Config::new();
		config.strategy(match backend {
			Backend::Auto => Strategy::Auto,
			Backend::Cranelift => Strategy::Cranelift,
		});
		let engine = Engine::new(&config)
			.map_err(report)
			.wrap_err_with(|| format!("configuring engine for backend {backend}"))?;
		Ok(WasmtimeEngine { engine, backend })
	}

	pub fn backend(&self) -> Backend {
		self.backend
	}
}

impl ModuleEngine for WasmtimeEngine {
	type Instance = WasmtimeInstance;

	fn compile_and_instantiate(&self, source: &ModuleSource) -> Result<WasmtimeInstance> {
		let binary = source.to_binary()?;
		let module = Module::from_binary(&self.engine, binary)
			.map_err(report)
			.wrap_err_with(|| format!("compiling {}", source.path.display()))?;
		log::info!(
			"Compiled {} ({} bytes) with backend {}",
			source.path.display(),
			binary.len(),
			self.backend
		);

		let linker = Linker::new(&self.engine);
		let mut store = Store::new(&self.engine, ());
		let instance = linker
			.instantiate(&mut store, &module)
			.map_err(report)
			.wrap_err_with(|| format!("instantiating {}", source.path.display()))?;
		log::info!("Instantiated {}", source.path.display());

		Ok(WasmtimeInstance { store, instance })
	}
}

/// A live wasmtime instance together with the store that owns its state.
pub struct WasmtimeInstance {
	store: Store<()>,
	instance: Instance,
}

impl WasmtimeInstance {
	fn func(&mut self, name: &str) -> Result<Func, CallError> {
		let export = self
			.instance
			.get_export(&mut self.store, name)
			.ok_or_else(|| CallError::MissingExport {
				name: name.to_string(),
			})?;
		export.into_func().ok_or_else(|| CallError::NotAFunction {
			name: name.to_string(),
		})
	}
}

fn value_type(name: &str, ty: ValType) -> Result<ValueType, CallError> {
	match ty {
		ValType::I32 => Ok(ValueType::I32),
		ValType::I64 => Ok(ValueType::I64),
		ValType::F32 => Ok(ValueType::F32),
		ValType::F64 => Ok(ValueType::F64),
		other => Err(CallError::UnsupportedType {
			name: name.to_string(),
			ty: other.to_string(),
		}),
	}
}

fn to_val(value: Value) -> Val {
	match value {
		Value::I32(i) => Val::I32(i),
		Value::I64(i) => Val::I64(i),
		Value::F32(x) => Val::F32(x.to_bits()),
		Value::F64(x) => Val::F64(x.to_bits()),
	}
}

fn from_val(name: &str, val: &Val) -> Result<Value, CallError> {
	match val {
		Val::I32(i) => Ok(Value::I32(*i)),
		Val::I64(i) => Ok(Value::I64(*i)),
		Val::F32(bits) => Ok(Value::F32(f32::from_bits(*bits))),
		Val::F64(bits) => Ok(Value::F64(f64::from_bits(*bits))),
		other => Err(CallError::UnsupportedType {
			name: name.to_string(),
			ty: format!("{other:?}"),
		}),
	}
}

impl ModuleInstance for WasmtimeInstance {
	fn call(&mut self, name: &str, args: &[Arg]) -> Result<Vec<Value>> {
		let func = self.func(name)?;
		let ty = func.ty(&self.store);
		let params = ty
			.params()
			.map(|p| value_type(name, p))
			.collect::<Result<Vec<_>, _>>()?;
		let results = ty
			.results()
			.map(|r| value_type(name, r))
			.collect::<Result<Vec<_>, _>>()?;

		let args: Vec<Val> = coerce_args(name, args, &params)?
			.into_iter()
			.map(to_val)
			.collect();
		let mut out = vec![Val::I32(0); results.len()];
		func.call(&mut self.store, &args, &mut out)
			.map_err(report)
			.wrap_err_with(|| format!("`{name}` trapped"))?;

		out.iter()
			.map(|v| from_val(name, v).map_err(eyre::Report::from))
			.collect()
	}
}
