//! Every registered scalar unit honours the nullability feature it declares.

use anyhow::Result;
use clarium_acl::scalar::{ArgType, DataType, Feature, ScalarRegistry, Symbol, Value};

fn sample(arg: ArgType) -> Value {
    match arg {
        ArgType::Exact(DataType::Boolean) => Value::Bool(true),
        ArgType::Exact(DataType::Integer) => Value::Int(1),
        ArgType::Exact(DataType::Text) | ArgType::Any => Value::Text("1".into()),
    }
}

#[test]
fn nullable_units_return_null_for_null_input() -> Result<()> {
    let reg = ScalarRegistry::builtin();
    let mut checked = 0;
    for unit in reg.iter().filter(|u| u.signature().has_feature(Feature::Nullable)) {
        let sig = unit.signature();
        let nulls = vec![Value::Null; sig.arg_types.len()];
        assert_eq!(unit.evaluate(&nulls)?, Value::Null, "{} -> {}", sig.name, sig.return_type);
        checked += 1;
    }
    assert!(checked > 0);
    Ok(())
}

#[test]
fn non_nullable_units_never_return_null() {
    let reg = ScalarRegistry::builtin();
    let mut checked = 0;
    for unit in reg.iter().filter(|u| u.signature().has_feature(Feature::NonNullable)) {
        let sig = unit.signature();
        let nulls = vec![Value::Null; sig.arg_types.len()];
        let samples: Vec<Value> = sig.arg_types.iter().copied().map(sample).collect();
        for args in [nulls, samples] {
            // An error is acceptable; a NULL result is not.
            if let Ok(v) = unit.evaluate(&args) {
                assert!(!v.is_null(), "{} returned NULL for {:?}", sig.name, args);
            }
        }
        checked += 1;
    }
    assert!(checked > 0);
}

#[test]
fn every_unit_declares_exactly_one_nullability_feature() {
    for unit in ScalarRegistry::builtin().iter() {
        let sig = unit.signature();
        assert!(
            sig.has_feature(Feature::Nullable) ^ sig.has_feature(Feature::NonNullable),
            "{} declares {:?}",
            sig.name,
            sig.features
        );
    }
}

#[test]
fn results_carry_the_declared_type() -> Result<()> {
    for unit in ScalarRegistry::builtin().iter() {
        let sig = unit.signature();
        let args: Vec<Value> = sig.arg_types.iter().copied().map(sample).collect();
        let v = unit.evaluate(&args)?;
        assert_eq!(v.data_type(), Some(sig.return_type), "{}", sig.name);
    }
    Ok(())
}

#[test]
fn normalize_folds_null_literals_consistently() -> Result<()> {
    for unit in ScalarRegistry::builtin().iter() {
        let sig = unit.signature();
        let nulls = vec![Value::Null; sig.arg_types.len()];
        let lits = nulls.iter().cloned().map(Symbol::Literal).collect();
        assert_eq!(unit.normalize(lits)?, Symbol::Literal(unit.evaluate(&nulls)?), "{}", sig.name);
    }
    Ok(())
}
