//! Data types of expression values, as far as the editor needs to know them.

use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DataType {
    Bool,
    Int,
    Float,
    String,
    Timestamp,
    BoolList,
    IntList,
    FloatList,
    StringList,
    Unknown,
}

impl DataType {
    pub fn is_list(self) -> bool {
        matches!(
            self,
            DataType::BoolList | DataType::IntList | DataType::FloatList | DataType::StringList
        )
    }

    pub fn list_of(self) -> DataType {
        match self {
            DataType::Bool => DataType::BoolList,
            DataType::Int => DataType::IntList,
            DataType::Float => DataType::FloatList,
            DataType::String => DataType::StringList,
            other if other.is_list() => other,
            _ => DataType::Unknown,
        }
    }

    /// Infer the type of a literal payload.
    ///
    /// Arrays whose elements all share one type become a list of it. Empty
    /// arrays are string lists; mixed arrays are unknown.
    pub fn of_literal(value: &Value) -> DataType {
        match value {
            Value::Bool(_) => DataType::Bool,
            Value::Number(n) if n.is_i64() || n.is_u64() => DataType::Int,
            Value::Number(_) => DataType::Float,
            Value::String(_) => DataType::String,
            Value::Array(items) => match items.first() {
                None => DataType::StringList,
                Some(first) => {
                    let element = DataType::of_literal(first);
                    if items.iter().all(|v| DataType::of_literal(v) == element) {
                        element.list_of()
                    } else {
                        DataType::Unknown
                    }
                }
            },
            Value::Null | Value::Object(_) => DataType::Unknown,
        }
    }
}
