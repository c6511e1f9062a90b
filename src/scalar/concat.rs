use super::{ArgType, DataType, Feature, Scalar, Signature, Value};
use crate::error::{AclError, AclResult};

/// `concat(text, text)`: NULL arguments count as empty strings, so the result is never NULL.
pub struct Concat {
    signature: Signature,
}

impl Concat {
    pub fn new() -> Self {
        let signature = Signature {
            name: "concat",
            arg_types: vec![ArgType::Exact(DataType::Text), ArgType::Exact(DataType::Text)],
            return_type: DataType::Text,
            features: vec![Feature::NonNullable],
        };
        Self { signature }
    }
}

impl Default for Concat {
    fn default() -> Self { Self::new() }
}

impl Scalar for Concat {
    fn signature(&self) -> &Signature { &self.signature }

    fn evaluate(&self, args: &[Value]) -> AclResult<Value> {
        self.signature.check_arity(args.len())?;
        let mut out = String::new();
        for arg in args {
            match arg {
                Value::Null => {}
                Value::Text(s) => out.push_str(s),
                other => return Err(AclError::Conversion { value: other.to_string(), target: DataType::Text.to_string() }),
            }
        }
        Ok(Value::Text(out))
    }
}
