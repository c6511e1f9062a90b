//! Scalar-function contract consumed by the surrounding engine.
//! Units are stateless: `evaluate` maps argument values to a value, `normalize` folds
//! constant call sites at plan time. Nullability features are part of the contract:
//! `Nullable` units return NULL for NULL input, `NonNullable` units never return NULL.

mod cast;
mod concat;
mod initcap;

use std::fmt;

use tracing::debug;

use crate::error::{AclError, AclResult};

pub use cast::{Cast, CastMode};
pub use concat::Concat;
pub use initcap::initcap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DataType { Boolean, Integer, Text }

impl DataType {
    pub const ALL: [DataType; 3] = [DataType::Boolean, DataType::Integer, DataType::Text];
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self { DataType::Boolean => "boolean", DataType::Integer => "integer", DataType::Text => "text" })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Text(String),
}

impl Value {
    pub fn is_null(&self) -> bool { matches!(self, Value::Null) }

    pub fn data_type(&self) -> Option<DataType> {
        match self {
            Value::Null => None,
            Value::Bool(_) => Some(DataType::Boolean),
            Value::Int(_) => Some(DataType::Integer),
            Value::Text(_) => Some(DataType::Text),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("NULL"),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Int(i) => write!(f, "{}", i),
            Value::Text(s) => f.write_str(s),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArgType { Exact(DataType), Any }

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Feature { Nullable, NonNullable }

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Signature {
    pub name: &'static str,
    pub arg_types: Vec<ArgType>,
    pub return_type: DataType,
    pub features: Vec<Feature>,
}

impl Signature {
    pub fn has_feature(&self, f: Feature) -> bool { self.features.contains(&f) }

    pub fn check_arity(&self, args: usize) -> AclResult<()> {
        if args == self.arg_types.len() {
            Ok(())
        } else {
            Err(AclError::Arity { function: self.name, expected: self.arg_types.len(), actual: args })
        }
    }
}

/// Plan-time expression node handed to `normalize`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Symbol {
    Literal(Value),
    Column { name: String, data_type: DataType },
    Call { name: &'static str, args: Vec<Symbol> },
}

pub trait Scalar: Send + Sync {
    fn signature(&self) -> &Signature;

    fn evaluate(&self, args: &[Value]) -> AclResult<Value>;

    /// Fold the call when every argument is a literal; otherwise keep the call.
    fn normalize(&self, args: Vec<Symbol>) -> AclResult<Symbol> {
        let literals: Option<Vec<Value>> =
            args.iter().map(|a| match a { Symbol::Literal(v) => Some(v.clone()), _ => None }).collect();
        match literals {
            Some(values) => Ok(Symbol::Literal(self.evaluate(&values)?)),
            None => Ok(Symbol::Call { name: self.signature().name, args }),
        }
    }
}

/// Text -> text unit whose NULL input short-circuits before `f` runs.
pub struct UnaryScalar {
    signature: Signature,
    f: fn(&str) -> String,
}

impl UnaryScalar {
    pub fn text(name: &'static str, f: fn(&str) -> String) -> Self {
        let signature = Signature {
            name,
            arg_types: vec![ArgType::Exact(DataType::Text)],
            return_type: DataType::Text,
            features: vec![Feature::Nullable],
        };
        Self { signature, f }
    }
}

impl Scalar for UnaryScalar {
    fn signature(&self) -> &Signature { &self.signature }

    fn evaluate(&self, args: &[Value]) -> AclResult<Value> {
        self.signature.check_arity(args.len())?;
        match &args[0] {
            Value::Null => Ok(Value::Null),
            Value::Text(s) => Ok(Value::Text((self.f)(s))),
            other => Err(AclError::Conversion { value: other.to_string(), target: DataType::Text.to_string() }),
        }
    }
}

/// All scalar units known to this build.
pub struct ScalarRegistry {
    units: Vec<Box<dyn Scalar>>,
}

impl ScalarRegistry {
    pub fn builtin() -> Self {
        let mut units: Vec<Box<dyn Scalar>> = vec![
            Box::new(UnaryScalar::text("initcap", initcap)),
            Box::new(Concat::new()),
        ];
        for target in DataType::ALL {
            units.push(Box::new(Cast::new(CastMode::Cast, target)));
            units.push(Box::new(Cast::new(CastMode::TryCast, target)));
        }
        debug!(target: "clarium_acl::scalar", "registered {} scalar units", units.len());
        Self { units }
    }

    pub fn iter(&self) -> impl Iterator<Item = &dyn Scalar> + '_ { self.units.iter().map(|u| u.as_ref()) }

    pub fn len(&self) -> usize { self.units.len() }
    pub fn is_empty(&self) -> bool { self.units.is_empty() }

    /// First unit with `name` and, when given, `return_type`.
    pub fn get(&self, name: &str, return_type: Option<DataType>) -> Option<&dyn Scalar> {
        self.iter().find(|u| {
            let sig = u.signature();
            sig.name == name && return_type.map_or(true, |t| t == sig.return_type)
        })
    }
}
