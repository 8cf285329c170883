//! Contenedor de estado por página.
//!
//! Guarda campos con nombre (flags, arrays, mapas anidados) y aplica actualizaciones
//! en bloque con un merge superficial. Lleva dentro su propia caché con TTL.
//!
//! # Contrato de errores
//! `set_state` nunca entra en pánico. Un payload que no es objeto deja el estado intacto,
//! agrega una entrada al log de errores y se devuelve como `Err`; la capa de UI puede
//! ignorar el `Result` sin romperse y quien necesite validación estricta lo revisa.


use std::sync::Arc;
use serde_json::{Map, Value};
use tracing::{debug, warn};
use crate::cache::logic::TtlCache;
use crate::clock::domain::Clock;
use crate::page::domain::Page;
use crate::state::domain::{kind_of, ErrorLogEntry, StateSnapshot};
use crate::system::domain::ErrorType;


#[derive(Debug)]
pub struct StateContainer {
    fields: Map<String, Value>,
    last_update: Option<i64>,
    error_log: Vec<ErrorLogEntry>,
    cache: Arc<TtlCache>,
    clock: Arc<dyn Clock>,
}


impl StateContainer {
    pub fn new(ttl_ms: i64, clock: Arc<dyn Clock>) -> Self {
        Self::with_fields(Map::new(), ttl_ms, clock)
    }

    pub fn with_fields(fields: Map<String, Value>, ttl_ms: i64, clock: Arc<dyn Clock>) -> Self {
        Self {
            fields,
            last_update: None,
            error_log: Vec::new(),
            cache: Arc::new(TtlCache::new(ttl_ms, clock.clone())),
            clock,
        }
    }

    /// Contenedor con el TTL y los campos iniciales de la página.
    pub fn for_page(page: Page, clock: Arc<dyn Clock>) -> Self {
        Self::with_fields(page.initial_fields(), page.default_ttl_ms(), clock)
    }

    /// Valor actual del campo, `None` si no existe.
    pub fn get_state(&self, key: &str) -> Option<Value> {
        self.fields.get(key).cloned()
    }

    /// Copia del estado completo. Nunca devuelve la referencia interna.
    pub fn get_state_all(&self) -> StateSnapshot {
        StateSnapshot {
            fields: self.fields.clone(),
            last_update: self.last_update,
        }
    }

    pub fn last_update(&self) -> Option<i64> {
        self.last_update
    }

    /// Merge superficial de `updates` sobre el estado.
    ///
    /// Cada clave sobrescribe el campo completo: un objeto anidado se reemplaza,
    /// no se parchea.
    ///
    /// # Errores
    /// * `ErrorType::InvalidArgument` si `updates` no es un objeto JSON. El estado no cambia
    ///   y el error queda en `errors()`.
    pub fn set_state(&mut self, updates: Value) -> Result<(), ErrorType> {
        self.merge(updates)
    }

    /// Igual que `set_state`, e invoca `callback(&nuevo, &anterior)` tras el merge.
    ///
    /// El callback no se ejecuta si la actualización es rechazada.
    pub fn set_state_with<F>(&mut self, updates: Value, callback: F) -> Result<(), ErrorType>
    where
        F: FnOnce(&StateSnapshot, &StateSnapshot),
    {
        let previous = self.get_state_all();
        self.merge(updates)?;
        callback(&self.get_state_all(), &previous);
        Ok(())
    }

    /// Reemplaza un campo con el valor calculado a partir de una copia del actual.
    ///
    /// Las colecciones anidadas se cambian así, nunca mutando una referencia viva.
    pub fn replace_with<F>(&mut self, key: &str, f: F) -> Result<(), ErrorType>
    where
        F: FnOnce(Option<Value>) -> Value,
    {
        let next = f(self.get_state(key));
        let mut updates = Map::new();
        updates.insert(key.to_string(), next);
        self.merge(Value::Object(updates))
    }

    pub fn errors(&self) -> &[ErrorLogEntry] {
        &self.error_log
    }

    pub fn clear_errors(&mut self) {
        self.error_log.clear();
    }

    pub fn get_cached_data(&self, key: &str) -> Option<Value> {
        self.cache.get(key)
    }

    pub fn set_cached_data(&self, key: &str, value: Value) {
        self.cache.set(key, value);
    }

    pub fn clear_cache(&self, filter: Option<&str>) -> usize {
        self.cache.clear(filter)
    }

    pub fn cache_hits(&self) -> u64 {
        self.cache.hits()
    }

    pub fn cache(&self) -> &Arc<TtlCache> {
        &self.cache
    }

    fn merge(&mut self, updates: Value) -> Result<(), ErrorType> {
        let updates = match updates {
            Value::Object(updates) => updates,
            other => {
                let error = ErrorType::InvalidArgument(
                    format!("set_state espera un objeto, se recibió {}", kind_of(&other))
                );
                warn!("Warning: actualización de estado rechazada. {error}");
                self.error_log.push(ErrorLogEntry {
                    at: self.clock.now_millis(),
                    error: error.clone(),
                });
                return Err(error);
            }
        };

        debug!("Debug: actualizando {} campos de estado", updates.len());
        for (key, value) in updates {
            self.fields.insert(key, value);
        }
        self.last_update = Some(self.clock.now_millis());
        Ok(())
    }
}
