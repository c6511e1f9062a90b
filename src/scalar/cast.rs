use super::{ArgType, DataType, Feature, Scalar, Signature, Symbol, Value};
use crate::error::{AclError, AclResult};

/// `Cast` fails on an unconvertible value; `TryCast` yields NULL instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CastMode { Cast, TryCast }

pub struct Cast {
    mode: CastMode,
    signature: Signature,
}

impl Cast {
    pub fn new(mode: CastMode, target: DataType) -> Self {
        let name = match mode { CastMode::Cast => "cast", CastMode::TryCast => "try_cast" };
        let signature = Signature { name, arg_types: vec![ArgType::Any], return_type: target, features: vec![Feature::Nullable] };
        Self { mode, signature }
    }

    pub fn mode(&self) -> CastMode { self.mode }
    pub fn target(&self) -> DataType { self.signature.return_type }

    fn on_failure(&self, err: AclError) -> AclResult<Value> {
        match self.mode {
            CastMode::Cast => Err(err),
            CastMode::TryCast => Ok(Value::Null),
        }
    }
}

fn conversion_error(v: &Value, target: DataType) -> AclError {
    AclError::Conversion { value: v.to_string(), target: target.to_string() }
}

fn parse_bool(s: &str) -> Option<bool> {
    match s.trim().to_ascii_lowercase().as_str() {
        "t" | "true" | "yes" | "on" | "1" => Some(true),
        "f" | "false" | "no" | "off" | "0" => Some(false),
        _ => None,
    }
}

/// Convert `v` to `target`. NULL converts to NULL.
pub fn convert(v: &Value, target: DataType) -> AclResult<Value> {
    let out = match (target, v) {
        (_, Value::Null) => Some(Value::Null),
        (DataType::Text, other) => Some(Value::Text(other.to_string())),
        (DataType::Boolean, Value::Bool(b)) => Some(Value::Bool(*b)),
        (DataType::Boolean, Value::Int(0)) => Some(Value::Bool(false)),
        (DataType::Boolean, Value::Int(1)) => Some(Value::Bool(true)),
        (DataType::Boolean, Value::Text(s)) => parse_bool(s).map(Value::Bool),
        (DataType::Integer, Value::Int(i)) => Some(Value::Int(*i)),
        (DataType::Integer, Value::Bool(b)) => Some(Value::Int(*b as i64)),
        (DataType::Integer, Value::Text(s)) => s.trim().parse::<i64>().ok().map(Value::Int),
        _ => None,
    };
    out.ok_or_else(|| conversion_error(v, target))
}

impl Scalar for Cast {
    fn signature(&self) -> &Signature { &self.signature }

    fn evaluate(&self, args: &[Value]) -> AclResult<Value> {
        self.signature.check_arity(args.len())?;
        convert(&args[0], self.target()).or_else(|e| self.on_failure(e))
    }

    fn normalize(&self, mut args: Vec<Symbol>) -> AclResult<Symbol> {
        self.signature.check_arity(args.len())?;
        match args.pop() {
            Some(Symbol::Column { name, data_type }) if data_type == self.target() => Ok(Symbol::Column { name, data_type }),
            Some(Symbol::Literal(v)) => Ok(Symbol::Literal(self.evaluate(&[v])?)),
            Some(other) => Ok(Symbol::Call { name: self.signature.name, args: vec![other] }),
            None => Err(AclError::Arity { function: self.signature.name, expected: 1, actual: 0 }),
        }
    }
}
