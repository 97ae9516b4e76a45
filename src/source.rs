//! Module source: reading it, translating it, and peeking at its exports.

use std::{
	cell::OnceCell,
	fs,
	path::{Path, PathBuf},
};

use derive_more::derive::Display;
use eyre::{Result, WrapErr};
use wasmparser::{ExternalKind, Parser, Payload};

/// The literal contents of a module file, along with where it came from. Usually Wat text, though a
/// binary module is accepted as-is.
#[derive(Debug, Clone)]
pub struct ModuleSource {
	pub path: PathBuf,
	pub bytes: Vec<u8>,
	binary: OnceCell<Vec<u8>>, // translated once, shared by inspection and compilation
}

impl ModuleSource {
	/// Reads the full file. The handle is closed before this returns.
	pub fn read(path: impl AsRef<Path>) -> Result<Self> {
		let path = path.as_ref();
		let bytes = fs::read(path).wrap_err_with(|| format!("reading {}", path.display()))?;
		log::debug!("Read {} bytes from {}", bytes.len(), path.display());
		Ok(ModuleSource::from_bytes(path, bytes))
	}

	/// Wraps contents that did not come from a file. `name` only shows up in diagnostics.
	pub fn from_text(name: &str, text: impl Into<String>) -> Self {
		ModuleSource::from_bytes(name, text.into().into_bytes())
	}

	pub fn from_bytes(path: impl AsRef<Path>, bytes: Vec<u8>) -> Self {
		ModuleSource {
			path: path.as_ref().to_path_buf(),
			bytes,
			binary: OnceCell::new(),
		}
	}

	/// Translates the text format into a binary module. Input that already is a binary module passes
	/// through. The result is cached, so later calls do not translate again.
	pub fn to_binary(&self) -> Result<&[u8]> {
		if let Some(binary) = self.binary.get() {
			return Ok(binary);
		}
		let translated = wat::parse_bytes(&self.bytes)
			.wrap_err_with(|| format!("translating {}", self.path.display()))?
			.into_owned();
		Ok(self.binary.get_or_init(|| translated))
	}

	/// Lists the exports declared by the module, in declaration order.
	pub fn exports(&self) -> Result<Vec<ExportInfo>> {
		let binary = self.to_binary()?;
		let mut out = Vec::new();
		for payload in Parser::new(0).parse_all(binary) {
			if let Payload::ExportSection(reader) = payload.wrap_err("parsing module")? {
				for export in reader {
					let export = export.wrap_err("parsing export section")?;
					out.push(ExportInfo {
						name: export.name.to_string(),
						kind: ExportKind::from(export.kind),
					});
				}
			}
		}
		Ok(out)
	}
}

/// What kind of item an export refers to.
#[derive(Display, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportKind {
	#[display("func")]
	Func,
	#[display("table")]
	Table,
	#[display("memory")]
	Memory,
	#[display("global")]
	Global,
	#[display("tag")]
	Tag,
}

impl From<ExternalKind> for ExportKind {
	fn from(kind: ExternalKind) -> Self {
		match kind {
			ExternalKind::Func => ExportKind::Func,
			ExternalKind::Table => ExportKind::Table,
			ExternalKind::Memory => ExportKind::Memory,
			ExternalKind::Global => ExportKind::Global,
			ExternalKind::Tag => ExportKind::Tag,
		}
	}
}

#[derive(Display, Debug, Clone, PartialEq, Eq)]
#[display("{name}: {kind}")]
pub struct ExportInfo {
	pub name: String,
	pub kind: ExportKind,
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn lists_exports_in_order() -> Result<()> {
		let src = ModuleSource::from_text(
			"inline",
			r#"(module
				(memory (export "mem") 1)
				(func (export "b") (result i32) i32.const 1)
				(func (export "a") (result i32) i32.const 2))"#,
		);
		let names: Vec<String> = src.exports()?.iter().map(ToString::to_string).collect();
		assert_eq!(names, ["mem: memory", "b: func", "a: func"]);
		Ok(())
	}

	#[test]
	fn malformed_text_names_the_file() {
		let src = ModuleSource::from_text("broken.wat", "(module (func (export \"x\")");
		let err = src.to_binary().unwrap_err();
		assert!(err.to_string().contains("broken.wat"), "{err}");
	}

	#[test]
	fn translates_once() -> Result<()> {
		let src = ModuleSource::from_text("once.wat", "(module (func (export \"f\")))");
		let first = src.to_binary()?;
		let second = src.to_binary()?;
		assert!(std::ptr::eq(first, second));
		assert_eq!(src.exports()?.len(), 1);
		assert!(std::ptr::eq(src.to_binary()?, first));
		Ok(())
	}

	#[test]
	fn bad_utf8_text_is_a_translation_error() {
		let src = ModuleSource::from_bytes("latin1.wat", b"(module) ;; caf\xe9".to_vec());
		let err = src.to_binary().unwrap_err();
		assert!(err.to_string().starts_with("translating latin1.wat"), "{err}");
	}

	#[test]
	fn missing_file_fails_to_read() {
		let err = ModuleSource::read("definitely/not/here.wat").unwrap_err();
		assert!(err.to_string().starts_with("reading "), "{err}");
	}
}
