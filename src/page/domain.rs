//! Páginas del CRM que construyen su propio contenedor de estado.
//!
//! Cada página crea un contenedor aislado al cargarse y lo descarta al navegar.
//! Aquí sólo viven los valores por defecto de cada una (TTL y campos iniciales).


use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use crate::config::cache::{DEFAULT_TTL_MS, SHORT_TTL_MS};


#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Page {
    Reports,
    Leads,
    Login,
    Dashboard,
    Configuration,
}


impl Page {
    pub const ALL: [Page; 5] = [
        Page::Reports,
        Page::Leads,
        Page::Login,
        Page::Dashboard,
        Page::Configuration,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Page::Reports => "reports",
            Page::Leads => "leads",
            Page::Login => "login",
            Page::Dashboard => "dashboard",
            Page::Configuration => "configuration",
        }
    }

    /// TTL de la caché de la página a partir del TTL base configurado.
    /// Login usa una ventana corta.
    pub fn ttl_ms(&self, base_ttl_ms: i64) -> i64 {
        match self {
            Page::Login => SHORT_TTL_MS.min(base_ttl_ms),
            _ => base_ttl_ms,
        }
    }

    pub fn default_ttl_ms(&self) -> i64 {
        self.ttl_ms(DEFAULT_TTL_MS)
    }

    pub fn initial_fields(&self) -> Map<String, Value> {
        let mut fields = Map::new();
        fields.insert("is_loading".to_string(), json!(false));
        fields.insert("last_error".to_string(), Value::Null);
        fields
    }
}
