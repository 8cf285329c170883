//! Contenedores de estado por página con caché TTL para el CRM ALSHAM 360° PRIMA.

pub mod cache;
pub mod channels;
pub mod clock;
pub mod config;
pub mod context;
pub mod fetch;
pub mod page;
pub mod state;
pub mod sweep;
pub mod system;

pub use cache::domain::{cache_key, CacheMetrics};
pub use cache::logic::TtlCache;
pub use clock::domain::{Clock, ManualClock, SystemClock};
pub use context::domain::AppContext;
pub use fetch::logic::Fetcher;
pub use page::domain::Page;
pub use state::domain::{ErrorLogEntry, StateSnapshot};
pub use state::logic::StateContainer;
pub use system::domain::{ErrorType, System};
