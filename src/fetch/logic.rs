//! Fetch a través de la caché.
//!
//! Un controlador de página pide datos por clave; si hay *miss* o la entrada expiró se
//! consulta la fuente externa (con timeout), se guarda el resultado y se devuelve.
//!
//! # Comportamiento
//! * Sólo se cachean resultados exitosos. Un fallo o timeout del fetch se devuelve al
//!   llamador como `FetchFailure` / `FetchTimeout` para que la UI pueda avisar al usuario.
//! * Los *miss* concurrentes sobre la misma clave se agrupan: el primero hace el fetch y el
//!   resto espera su turno y vuelve a mirar la caché.
//! * Un fetch que excede el timeout se cancela (su future se descarta), así que nunca
//!   escribe un resultado tardío en la caché.


use std::fmt::Display;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use dashmap::DashMap;
use serde_json::Value;
use tokio::sync::Mutex;
use tracing::{debug, error, instrument, warn};
use crate::cache::logic::TtlCache;
use crate::system::domain::{ErrorType, System};


/// Clave del mapa de fetches en curso: identidad de la caché más la clave del llamador.
///
/// Dos contenedores que usan la misma clave no comparten lock.
type PendingKey = (usize, String);


#[derive(Debug)]
struct PendingSlot {
    lock: Arc<Mutex<()>>,
    waiters: usize,
}


/// Registro de un llamador en `pending`. Al soltarse (al terminar o al cancelar el
/// future) descuenta su turno y borra la entrada cuando no queda nadie esperando.
struct PendingFetch<'a> {
    pending: &'a DashMap<PendingKey, PendingSlot>,
    key: PendingKey,
}


impl<'a> PendingFetch<'a> {
    fn register(pending: &'a DashMap<PendingKey, PendingSlot>,
                key: PendingKey) -> (Self, Arc<Mutex<()>>) {
        let lock = {
            let mut slot = pending.entry(key.clone()).or_insert_with(|| PendingSlot {
                lock: Arc::new(Mutex::new(())),
                waiters: 0,
            });
            slot.waiters += 1;
            slot.lock.clone()
        };
        (Self { pending, key }, lock)
    }
}


impl Drop for PendingFetch<'_> {
    fn drop(&mut self) {
        self.pending.remove_if_mut(&self.key, |_, slot| {
            slot.waiters = slot.waiters.saturating_sub(1);
            slot.waiters == 0
        });
    }
}


#[derive(Debug)]
pub struct Fetcher {
    timeout: Duration,
    pending: DashMap<PendingKey, PendingSlot>,
}


impl Fetcher {
    pub fn new(timeout: Duration) -> Self {
        Self {
            timeout,
            pending: DashMap::new(),
        }
    }

    pub fn from_system(system: &System) -> Self {
        Self::new(system.fetch_timeout)
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Devuelve el valor cacheado o lo obtiene con `fetch` y lo almacena.
    ///
    /// # Argumentos
    /// * `cache`: Caché del contenedor de la página.
    /// * `key`: Clave opaca compuesta por el llamador.
    /// * `fetch`: Llamada asíncrona a la fuente de datos externa.
    #[instrument(name = "get_or_fetch", skip(self, cache, fetch))]
    pub async fn get_or_fetch<F, Fut, E>(&self,
                                         cache: &TtlCache,
                                         key: &str,
                                         fetch: F) -> Result<Value, ErrorType>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Value, E>>,
        E: Display,
    {
        if let Some(value) = cache.get(key) {
            return Ok(value);
        }

        let cache_id = std::ptr::from_ref(cache) as usize;
        let (_registration, lock) = PendingFetch::register(&self.pending, (cache_id, key.to_string()));
        let _turn = lock.lock_owned().await;

        let coalesced = if cache.contains_fresh(key) { cache.get(key) } else { None };

        match coalesced {
            Some(value) => {
                debug!("Debug: fetch agrupado, resultado tomado de la caché");
                Ok(value)
            }
            None => {
                let result = self.fetch_with_timeout(fetch).await;
                if let Ok(value) = &result {
                    cache.set(key, value.clone());
                }
                result
            }
        }
    }

    async fn fetch_with_timeout<F, Fut, E>(&self, fetch: F) -> Result<Value, ErrorType>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Value, E>>,
        E: Display,
    {
        match tokio::time::timeout(self.timeout, fetch()).await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(e)) => {
                error!("Error: el fetch externo falló. {e}");
                Err(ErrorType::FetchFailure(e.to_string()))
            }
            Err(_) => {
                warn!("Warning: el fetch externo excedió {:?}", self.timeout);
                Err(ErrorType::FetchTimeout(self.timeout))
            }
        }
    }

    /// Pares caché/clave con un fetch en curso o en espera.
    pub fn in_flight(&self) -> usize {
        self.pending.len()
    }
}
