use serde::Serialize;
use serde_json::{Map, Value};
use crate::system::domain::ErrorType;


/// Copia propia del registro de estado completo.
///
/// Modificarla no afecta al contenedor; los cambios sólo entran por `set_state`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct StateSnapshot {
    pub fields: Map<String, Value>,
    pub last_update: Option<i64>,
}


impl StateSnapshot {
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }
}


/// Error interno registrado en el log del contenedor en lugar de propagarse.
#[derive(Debug, Clone, PartialEq)]
pub struct ErrorLogEntry {
    pub at: i64,
    pub error: ErrorType,
}


pub(crate) fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
