//! Módulo de configuración central y gestión del entorno de ejecución.
//!
//! Este módulo actúa como la fuente única de verdad para la configuración del servicio
//! de estado. Se encarga de leer las variables de entorno, establecer valores por defecto
//! y proveer las estructuras necesarias para iniciar los subsistemas (Caché, Fetch, Logging).
//!
//! # Funcionalidades Principales
//! * **Carga de Configuración:** Lee de `.env` en desarrollo y variables de sistema en producción.
//! * **Observabilidad:** Configura `tracing_subscriber` para logs estructurados o legibles.
//! * **Errores:** Define la taxonomía de errores (`ErrorType`) compartida por todo el crate.
//!


use std::env;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;
use tracing_subscriber::{fmt, EnvFilter};
use crate::config::{cache, fetch, sweep};


/// Representa la configuración global del sistema y el estado del entorno.
#[derive(Debug, Clone, PartialEq)]
pub struct System {
    /// TTL por defecto (milisegundos) de las entradas de caché.
    /// Por defecto: `300000` (5 minutos).
    pub cache_ttl_ms: i64,

    /// Tiempo máximo de espera para un fetch externo.
    /// Por defecto: `10` segundos.
    pub fetch_timeout: Duration,

    /// Intervalo del barrido de entradas expiradas. `0` lo deshabilita.
    /// Por defecto: `60` segundos.
    pub sweep_interval: Duration,

    /// Entorno de ejecución actual (`development`, `staging`, `production`).
    /// Afecta el formato de logs y la carga de archivos `.env`.
    pub environment: String,

    /// Nivel de detalle de los logs (ej. `info`, `debug`, `warn`).
    /// Se autoconfigura según el `environment` si no se especifica.
    pub rust_log: String,
}


impl Default for System {
    fn default() -> Self {
        Self {
            cache_ttl_ms: cache::DEFAULT_TTL_MS,
            fetch_timeout: fetch::TIMEOUT,
            sweep_interval: sweep::INTERVAL,
            environment: "development".to_string(),
            rust_log: "debug".to_string(),
        }
    }
}


impl System {

    /// Carga la configuración desde las variables de entorno.
    ///
    /// # Comportamiento
    /// * Si `ENVIRONMENT` es "development", intenta cargar un archivo `.env`.
    /// * Establece valores por defecto para variables opcionales.
    ///
    /// # Errores
    /// * `ErrorType::Config` si alguna variable numérica no es un número válido.
    pub fn new() -> Result<Self, ErrorType> {

        let environment = env::var("ENVIRONMENT")
            .unwrap_or_else(|_| "development".into());

        if environment == "development" {
            dotenv::dotenv().ok();
        }

        Self::from_lookup(environment, |name| env::var(name).ok())
    }

    /// Construye la configuración a partir de una función de búsqueda de variables.
    ///
    /// Separa la lectura del entorno del parseo, para poder probarlo sin tocar
    /// variables globales del proceso.
    pub fn from_lookup<F>(environment: String, lookup: F) -> Result<Self, ErrorType>
    where
        F: Fn(&str) -> Option<String>,
    {
        let cache_ttl_ms: i64 = parse_var(&lookup, "CACHE_TTL_MS", cache::DEFAULT_TTL_MS)?;
        if cache_ttl_ms < 0 {
            return Err(ErrorType::Config(format!("CACHE_TTL_MS no puede ser negativo: {cache_ttl_ms}")));
        }

        let fetch_timeout_secs: u64 = parse_var(&lookup, "FETCH_TIMEOUT_SECS", fetch::TIMEOUT.as_secs())?;
        let sweep_interval_secs: u64 = parse_var(&lookup, "SWEEP_INTERVAL_SECS", sweep::INTERVAL.as_secs())?;

        let rust_log = lookup("RUST_LOG")
            .unwrap_or_else(|| {
                match environment.as_str() {
                    "development" => "debug".to_string(),
                    "staging" => "info".to_string(),
                    _ => "warn".to_string(),
                }
            });

        Ok(System {
            cache_ttl_ms,
            fetch_timeout: Duration::from_secs(fetch_timeout_secs),
            sweep_interval: Duration::from_secs(sweep_interval_secs),
            environment,
            rust_log,
        })
    }
}


fn parse_var<F, T>(lookup: &F, name: &str, default: T) -> Result<T, ErrorType>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(name) {
        Some(raw) => raw.trim().parse().map_err(|_| {
            ErrorType::Config(format!("{name} debe ser un número, se recibió '{raw}'"))
        }),
        None => Ok(default),
    }
}


/// Categorización de errores operativos del sistema.
///
/// Los errores de estado y caché nunca se propagan como pánico: se registran y se
/// devuelven como valor. `FetchFailure` y `FetchTimeout` son los únicos que el
/// llamador debe tratar (p. ej. mostrando un aviso al usuario).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ErrorType {
    #[error("argumento inválido: {0}")]
    InvalidArgument(String),

    #[error("fallo leyendo la caché: {0}")]
    CacheReadFault(String),

    #[error("fallo del fetch externo: {0}")]
    FetchFailure(String),

    #[error("fetch externo excedió {0:?}")]
    FetchTimeout(Duration),

    #[error("configuración inválida: {0}")]
    Config(String),
}


/// Inicializa el sistema de trazabilidad y logs (Tracing).
///
/// Configura el formato de salida basándose en el entorno:
/// * **Production**: Salida JSON (para logs estructurados en la nube).
/// * **Development/Otros**: Salida "Pretty" (colores y formato legible).
///
/// # Argumentos
/// * `system`: Referencia a la configuración cargada para leer el nivel de log (`rust_log`).
pub fn init_tracing(system: &System) {

    let filter = EnvFilter::try_new(&system.rust_log)
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let builder = fmt().with_env_filter(filter).with_target(false);

    if system.environment == "production" {
        builder.json().init();
    } else {
        builder.pretty().init();
    }
}
