//! Estructuras de dominio de la caché con TTL.
//!
//! Una entrada guarda el valor y el instante (ms) en que se almacenó. El TTL no vive en la
//! entrada: es una constante del contenedor, igual para todas sus claves.


use serde::Serialize;
use serde_json::Value;
use crate::config::cache::KEY_SEPARATOR;


#[derive(Debug, Clone, PartialEq)]
pub struct CacheEntry {
    pub value: Value,
    pub stored_at: i64,
}


impl CacheEntry {
    pub fn new(value: Value, stored_at: i64) -> Self {
        Self { value, stored_at }
    }

    /// Edad de la entrada en `now`.
    ///
    /// # Retorno
    /// * `None` si la resta desborda (timestamp corrupto).
    pub fn age(&self, now: i64) -> Option<i64> {
        now.checked_sub(self.stored_at)
    }

    /// Una entrada expira cuando `now - stored_at > ttl`. La igualdad sigue siendo válida.
    pub fn is_expired(&self, now: i64, ttl: i64) -> Option<bool> {
        self.age(now).map(|age| age > ttl)
    }
}


/// Contadores de la caché, expuestos para observabilidad.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CacheMetrics {
    pub hits: u64,
    pub misses: u64,
    pub expirations: u64,
    pub inserts: u64,
    pub faults: u64,
}


impl CacheMetrics {
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}


/// Compone una clave con la forma habitual `"<recurso>_<ámbito>_<periodo>"`.
///
/// La caché nunca interpreta la clave; sólo el borrado filtrado busca subcadenas.
pub fn cache_key(resource: &str, scope: &str, period: &str) -> String {
    [resource, scope, period].join(KEY_SEPARATOR)
}
