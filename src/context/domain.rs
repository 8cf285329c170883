//! Definición del Contexto de Aplicación (Shared State).
//!
//! El `AppContext` actúa como un contenedor de "Inyección de Dependencias" manual,
//! agrupando los recursos que deben ser accesibles por múltiples tareas concurrentes
//! (Configuración, Reloj, Fetcher).
//!
//! No existe un contenedor de estado global: cada página pide uno nuevo con
//! `new_container` y es su única dueña. El contexto sólo guarda referencias débiles a
//! sus cachés para que el barrido pueda alcanzarlas mientras la página siga viva.


use std::sync::{Arc, Weak};
use std::sync::atomic::{AtomicU64, Ordering};
use dashmap::DashMap;
use tracing::debug;
use crate::cache::logic::TtlCache;
use crate::clock::domain::{Clock, SystemClock};
use crate::fetch::logic::Fetcher;
use crate::page::domain::Page;
use crate::state::logic::StateContainer;
use crate::system::domain::System;


#[derive(Clone, Debug)]
pub struct AppContext {
    pub system: Arc<System>,
    pub clock: Arc<dyn Clock>,
    pub fetcher: Arc<Fetcher>,
    caches: Arc<DashMap<u64, Weak<TtlCache>>>,
    next_id: Arc<AtomicU64>,
}


impl AppContext {
    pub fn new(system: System) -> Self {
        Self::with_clock(system, Arc::new(SystemClock))
    }

    pub fn with_clock(system: System, clock: Arc<dyn Clock>) -> Self {
        let fetcher = Arc::new(Fetcher::from_system(&system));
        Self {
            system: Arc::new(system),
            clock,
            fetcher,
            caches: Arc::new(DashMap::new()),
            next_id: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Construye un contenedor aislado para la página.
    pub fn new_container(&self, page: Page) -> StateContainer {
        let ttl_ms = page.ttl_ms(self.system.cache_ttl_ms);
        let container = StateContainer::with_fields(page.initial_fields(), ttl_ms, self.clock.clone());

        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        self.caches.insert(id, Arc::downgrade(container.cache()));
        debug!("Debug: contenedor {id} creado para la página {}", page.name());

        container
    }

    /// Purga las entradas expiradas de todas las cachés vivas y olvida las descartadas.
    ///
    /// # Retorno
    /// Cantidad total de entradas eliminadas.
    pub fn sweep_expired(&self) -> usize {
        let mut removed = 0;
        self.caches.retain(|_, weak| match weak.upgrade() {
            Some(cache) => {
                removed += cache.purge_expired();
                true
            }
            None => false,
        });
        removed
    }

    /// Contenedores registrados cuyas cachés siguen vivas.
    pub fn live_containers(&self) -> usize {
        self.caches.iter().filter(|entry| entry.value().strong_count() > 0).count()
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use crate::clock::domain::ManualClock;

    fn context() -> (AppContext, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::new(0));
        let system = System { cache_ttl_ms: 1_000, ..System::default() };
        (AppContext::with_clock(system, clock.clone()), clock)
    }

    #[test]
    fn containers_are_isolated() {
        let (ctx, _clock) = context();
        let mut reports = ctx.new_container(Page::Reports);
        let leads = ctx.new_container(Page::Leads);

        reports.set_state(json!({"period": "30d"})).unwrap();
        reports.set_cached_data("k", json!(1));

        assert_eq!(leads.get_state("period"), None);
        assert_eq!(leads.get_cached_data("k"), None);
        assert_eq!(reports.cache().ttl_ms(), 1_000);
    }

    #[test]
    fn sweep_reaches_live_caches_and_forgets_dropped_ones() {
        let (ctx, clock) = context();
        let dashboard = ctx.new_container(Page::Dashboard);
        let login = ctx.new_container(Page::Login);
        dashboard.set_cached_data("a", json!(1));
        login.set_cached_data("b", json!(2));
        assert_eq!(ctx.live_containers(), 2);

        drop(login);
        clock.advance(5_000);

        assert_eq!(ctx.sweep_expired(), 1);
        assert!(dashboard.cache().is_empty());
        assert_eq!(ctx.live_containers(), 1);
    }
}
