//! Caché en memoria con expiración perezosa (TTL).
//!
//! Memoriza resultados de fetch externos durante una ventana de tiempo acotada.
//! No es un LRU: no hay límite de tamaño ni política de desalojo, las entradas sólo
//! desaparecen al leerlas expiradas, con `clear` o con el barrido opcional.
//!
//! # Semántica de fallos
//! Ninguna operación devuelve error al llamador. Una clave malformada o un timestamp
//! corrupto se registra con `tracing`, incrementa `faults` y se trata como un *miss*.


use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use dashmap::DashMap;
use serde_json::Value;
use tracing::{debug, warn};
use crate::cache::domain::{CacheEntry, CacheMetrics};
use crate::clock::domain::Clock;
use crate::system::domain::ErrorType;


enum Lookup {
    Fresh(Value),
    Expired,
    Corrupt(i64),
}


#[derive(Debug)]
pub struct TtlCache {
    entries: DashMap<String, CacheEntry>,
    ttl_ms: i64,
    clock: Arc<dyn Clock>,
    hits: AtomicU64,
    misses: AtomicU64,
    expirations: AtomicU64,
    inserts: AtomicU64,
    faults: AtomicU64,
}


impl TtlCache {
    pub fn new(ttl_ms: i64, clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: DashMap::new(),
            ttl_ms,
            clock,
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
            expirations: AtomicU64::new(0),
            inserts: AtomicU64::new(0),
            faults: AtomicU64::new(0),
        }
    }

    pub fn ttl_ms(&self) -> i64 {
        self.ttl_ms
    }

    /// Devuelve el valor si existe y `now - stored_at <= ttl`.
    ///
    /// Una entrada expirada se elimina en la misma lectura. El borrado usa `remove_if`,
    /// que vuelve a evaluar la expiración bajo el lock del shard: si otra tarea sobrescribió
    /// la clave entre medio, la entrada nueva no se toca.
    pub fn get(&self, key: &str) -> Option<Value> {
        if let Err(e) = check_key(key) {
            self.record_fault(&ErrorType::CacheReadFault(e.to_string()));
            return None;
        }

        let now = self.clock.now_millis();
        let ttl = self.ttl_ms;

        let lookup = self.entries.get(key).map(|entry| match entry.is_expired(now, ttl) {
            Some(false) => Lookup::Fresh(entry.value.clone()),
            Some(true) => Lookup::Expired,
            None => Lookup::Corrupt(entry.stored_at),
        });

        match lookup {
            Some(Lookup::Fresh(value)) => {
                self.hits.fetch_add(1, Ordering::Relaxed);
                Some(value)
            }
            Some(Lookup::Expired) => {
                self.remove_stale(key, now);
                self.expirations.fetch_add(1, Ordering::Relaxed);
                self.misses.fetch_add(1, Ordering::Relaxed);
                debug!("Debug: entrada expirada {key}");
                None
            }
            Some(Lookup::Corrupt(stored_at)) => {
                self.remove_stale(key, now);
                self.misses.fetch_add(1, Ordering::Relaxed);
                self.record_fault(&ErrorType::CacheReadFault(
                    format!("timestamp corrupto {stored_at} en la clave {key}")
                ));
                None
            }
            None => {
                self.misses.fetch_add(1, Ordering::Relaxed);
                None
            }
        }
    }

    /// Sobrescribe incondicionalmente la clave con el valor y el instante actual.
    pub fn set(&self, key: &str, value: Value) {
        if let Err(e) = check_key(key) {
            self.record_fault(&e);
            return;
        }

        let now = self.clock.now_millis();
        self.entries.insert(key.to_string(), CacheEntry::new(value, now));
        self.inserts.fetch_add(1, Ordering::Relaxed);
    }

    /// Borra las claves que contienen `filter` como subcadena, o todas si no hay filtro.
    ///
    /// # Retorno
    /// Cantidad de entradas eliminadas.
    pub fn clear(&self, filter: Option<&str>) -> usize {
        let removed = match filter {
            Some(filter) => {
                let mut removed = 0;
                self.entries.retain(|key, _| {
                    let matches = key.contains(filter);
                    if matches {
                        removed += 1;
                    }
                    !matches
                });
                removed
            }
            None => {
                let removed = self.entries.len();
                self.entries.clear();
                removed
            }
        };

        debug!("Debug: caché limpiada, filtro {:?}, {} entradas eliminadas", filter, removed);
        removed
    }

    /// Elimina todas las entradas expiradas (o con timestamp corrupto) sin leerlas.
    pub fn purge_expired(&self) -> usize {
        let now = self.clock.now_millis();
        let ttl = self.ttl_ms;
        let mut removed = 0;

        self.entries.retain(|_, entry| {
            let keep = entry.is_expired(now, ttl) == Some(false);
            if !keep {
                removed += 1;
            }
            keep
        });

        self.expirations.fetch_add(removed as u64, Ordering::Relaxed);
        removed
    }

    /// Indica si la clave tiene una entrada vigente, sin tocar contadores ni borrar nada.
    pub fn contains_fresh(&self, key: &str) -> bool {
        let now = self.clock.now_millis();
        self.entries
            .get(key)
            .is_some_and(|entry| entry.is_expired(now, self.ttl_ms) == Some(false))
    }

    /// Entradas almacenadas, incluidas las expiradas aún no leídas.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn hits(&self) -> u64 {
        self.hits.load(Ordering::Relaxed)
    }

    pub fn metrics(&self) -> CacheMetrics {
        CacheMetrics {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            expirations: self.expirations.load(Ordering::Relaxed),
            inserts: self.inserts.load(Ordering::Relaxed),
            faults: self.faults.load(Ordering::Relaxed),
        }
    }

    fn remove_stale(&self, key: &str, now: i64) {
        let ttl = self.ttl_ms;
        self.entries.remove_if(key, |_, entry| entry.is_expired(now, ttl) != Some(false));
    }

    fn record_fault(&self, error: &ErrorType) {
        self.faults.fetch_add(1, Ordering::Relaxed);
        warn!("Warning: fallo interno de caché tratado como miss. {error}");
    }
}


fn check_key(key: &str) -> Result<(), ErrorType> {
    if key.trim().is_empty() {
        return Err(ErrorType::InvalidArgument("clave de caché vacía".to_string()));
    }
    Ok(())
}
