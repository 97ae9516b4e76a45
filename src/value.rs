//! Call arguments, typed Wasm values, and how results are printed.

use std::fmt;

use derive_more::derive::{Display, Error};
use serde::Deserialize;

/// An untyped numeric literal passed to an export. Coerced against the export's signature at call time.
#[derive(Deserialize, Debug, Clone, Copy, PartialEq)]
#[serde(untagged)]
pub enum Arg {
	Int(i64),
	Float(f64),
}

impl fmt::Display for Arg {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Arg::Int(i) => write!(f, "{i}"),
			Arg::Float(x) => write_float(f, *x),
		}
	}
}

/// The numeric value types an export may take or return.
#[derive(Display, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueType {
	#[display("i32")]
	I32,
	#[display("i64")]
	I64,
	#[display("f32")]
	F32,
	#[display("f64")]
	F64,
}

/// A typed Wasm value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Value {
	I32(i32),
	I64(i64),
	F32(f32),
	F64(f64),
}

impl fmt::Display for Value {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Value::I32(i) => write!(f, "{i}"),
			Value::I64(i) => write!(f, "{i}"),
			Value::F32(x) => write_float(f, f64::from(*x)), // widened, like every other float we print
			Value::F64(x) => write_float(f, *x),
		}
	}
}

fn write_float(f: &mut fmt::Formatter<'_>, x: f64) -> fmt::Result {
	if x.is_nan() {
		f.write_str("nan")
	} else if x.is_infinite() {
		f.write_str(if x > 0.0 { "inf" } else { "-inf" })
	} else {
		// Debug keeps the trailing `.0` on integral floats
		write!(f, "{x:?}")
	}
}

/// Why a call could not be made against an export.
#[derive(Display, Error, Debug, Clone, PartialEq)]
pub enum CallError {
	#[display("module does not export `{name}`")]
	MissingExport { name: String },

	#[display("export `{name}` is not a function")]
	NotAFunction { name: String },

	#[display("`{name}` expects {expected} argument(s), got {given}")]
	Arity {
		name: String,
		expected: usize,
		given: usize,
	},

	#[display("argument {index} of `{name}`: cannot pass {arg} as {expected}")]
	ArgType {
		name: String,
		index: usize,
		arg: Arg,
		expected: ValueType,
	},

	#[display("`{name}` uses unsupported value type {ty}")]
	UnsupportedType { name: String, ty: String },
}

impl Arg {
	/// Converts this literal into a value of the given type. Integers fill any numeric slot they fit in;
	/// floats only fill float slots.
	pub fn coerce(self, ty: ValueType) -> Option<Value> {
		match (self, ty) {
			(Arg::Int(i), ValueType::I32) => i32::try_from(i).ok().map(Value::I32),
			(Arg::Int(i), ValueType::I64) => Some(Value::I64(i)),
			(Arg::Int(i), ValueType::F32) => Some(Value::F32(i as f32)),
			(Arg::Int(i), ValueType::F64) => Some(Value::F64(i as f64)),
			(Arg::Float(x), ValueType::F32) => Some(Value::F32(x as f32)),
			(Arg::Float(x), ValueType::F64) => Some(Value::F64(x)),
			(Arg::Float(_), ValueType::I32 | ValueType::I64) => None,
		}
	}
}

/// Coerces a full argument list against an export's parameter types.
pub fn coerce_args(name: &str, args: &[Arg], params: &[ValueType]) -> Result<Vec<Value>, CallError> {
	if args.len() != params.len() {
		return Err(CallError::Arity {
			name: name.to_string(),
			expected: params.len(),
			given: args.len(),
		});
	}
	args.iter()
		.zip(params)
		.enumerate()
		.map(|(index, (&arg, &expected))| {
			arg.coerce(expected).ok_or_else(|| CallError::ArgType {
				name: name.to_string(),
				index,
				arg,
				expected,
			})
		})
		.collect()
}

/// The results of one call, as printed on one output line.
#[derive(Debug, Clone, PartialEq)]
pub struct Output(pub Vec<Value>);

impl fmt::Display for Output {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self.0.as_slice() {
			[single] => write!(f, "{single}"),
			values => {
				f.write_str("[")?;
				for (i, v) in values.iter().enumerate() {
					if i > 0 {
						f.write_str(", ")?;
					}
					write!(f, "{v}")?;
				}
				f.write_str("]")
			}
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn ints_fill_any_numeric_slot() {
		assert_eq!(Arg::Int(21).coerce(ValueType::I32), Some(Value::I32(21)));
		assert_eq!(Arg::Int(21).coerce(ValueType::I64), Some(Value::I64(21)));
		assert_eq!(Arg::Int(3).coerce(ValueType::F64), Some(Value::F64(3.0)));
		assert_eq!(Arg::Int(3).coerce(ValueType::F32), Some(Value::F32(3.0)));
	}

	#[test]
	fn oversized_int_does_not_fit_i32() {
		assert_eq!(Arg::Int(i64::from(i32::MAX) + 1).coerce(ValueType::I32), None);
		assert_eq!(Arg::Int(-1).coerce(ValueType::I32), Some(Value::I32(-1)));
	}

	#[test]
	fn floats_only_fill_float_slots() {
		assert_eq!(Arg::Float(212.0).coerce(ValueType::F64), Some(Value::F64(212.0)));
		assert_eq!(Arg::Float(0.5).coerce(ValueType::F32), Some(Value::F32(0.5)));
		assert_eq!(Arg::Float(1.0).coerce(ValueType::I32), None);
		assert_eq!(Arg::Float(1.0).coerce(ValueType::I64), None);
	}

	#[test]
	fn arity_is_checked_before_types() {
		let err = coerce_args("root", &[Arg::Float(1.0)], &[ValueType::F64; 3]).unwrap_err();
		assert_eq!(
			err,
			CallError::Arity {
				name: "root".into(),
				expected: 3,
				given: 1
			}
		);
		assert_eq!(err.to_string(), "`root` expects 3 argument(s), got 1");
	}

	#[test]
	fn type_mismatch_names_the_argument() {
		let err = coerce_args("duplicate", &[Arg::Float(2.5)], &[ValueType::I32]).unwrap_err();
		assert_eq!(
			err.to_string(),
			"argument 0 of `duplicate`: cannot pass 2.5 as i32"
		);
	}

	#[test]
	fn floats_print_with_fraction() {
		assert_eq!(Value::F64(100.0).to_string(), "100.0");
		assert_eq!(Value::F64(-0.25).to_string(), "-0.25");
		assert_eq!(Value::F64(f64::NAN).to_string(), "nan");
		assert_eq!(Value::F64(f64::NEG_INFINITY).to_string(), "-inf");
		assert_eq!(Value::I32(42).to_string(), "42");
	}

	#[test]
	fn f32_prints_widened() {
		assert_eq!(Value::F32(0.5).to_string(), "0.5");
		assert_eq!(Value::F32(0.1).to_string(), "0.10000000149011612");
	}

	#[test]
	fn output_shapes() {
		assert_eq!(Output(vec![Value::I32(42)]).to_string(), "42");
		assert_eq!(
			Output(vec![Value::F64(-1.0), Value::F64(-1.0)]).to_string(),
			"[-1.0, -1.0]"
		);
		assert_eq!(Output(vec![]).to_string(), "[]");
	}

	#[test]
	fn args_display_like_literals() {
		assert_eq!(Arg::Int(21).to_string(), "21");
		assert_eq!(Arg::Float(-40.0).to_string(), "-40.0");
	}
}
