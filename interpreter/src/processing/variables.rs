use std::collections::HashMap;
use std::fmt::Debug;

use crate::datatype::Value;
use crate::lang::RuntimeMsg;

pub trait VariableStorer: Debug {
    fn get(&self, name: &str) -> Result<&'_ Value, RuntimeMsg> {
        match self.get_opt(name) {
            Some(item) => Ok(item),
            None => Err(RuntimeMsg(format!("Variable '{}' not found", name))),
        }
    }

    fn get_opt(&self, name: &str) -> Option<&'_ Value>;

    fn get_mut_opt(&mut self, name: &str) -> Option<&'_ mut Value>;

    /// Store `value`; the slot keeps the type it was first given.
    fn assign(&mut self, name: &str, value: Value) -> Result<(), RuntimeMsg>;

    fn exists(&self, name: &str) -> bool {
        self.get_opt(name).is_some()
    }
}

#[derive(Default, Debug)]
pub struct VariableStorage {
    storage: HashMap<String, Value>,
}

impl VariableStorer for VariableStorage {
    fn get_opt(&self, key: &str) -> Option<&Value> {
        self.storage.get(key)
    }

    fn get_mut_opt(&mut self, key: &str) -> Option<&mut Value> {
        self.storage.get_mut(key)
    }

    fn assign(&mut self, key: &str, value: Value) -> Result<(), RuntimeMsg> {
        if let Some(old) = self.storage.get(key) {
            if old.value_type() != value.value_type() {
                return Err(RuntimeMsg(format!(
                    "Cannot assign {} to variable '{}' of type {}",
                    value.value_type(),
                    key,
                    old.value_type()
                )));
            }
        }
        self.storage.insert(key.to_string(), value);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::datatype::Number;

    #[test]
    fn type_is_fixed() {
        let mut vars = VariableStorage::default();
        vars.assign("a", Value::Number(Number::Int(1))).unwrap();
        assert!(vars.assign("a", Value::String("x".into())).is_err());
        vars.assign("a", Value::Number(Number::Int(2))).unwrap();
        assert_eq!(vars.get("a").unwrap(), &Value::Number(Number::Int(2)));
        assert!(vars.get("b").is_err());
    }
}
