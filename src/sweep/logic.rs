//! Barrido periódico de entradas expiradas.
//!
//! La caché expira entradas de forma perezosa al leerlas; las que nadie vuelve a leer
//! ocupan memoria hasta un `clear`. Esta tarea opcional las purga cada cierto intervalo
//! sin cambiar el contrato de lectura.
//!
//! # Arquitectura de Actores
//! Funciona en coordinación con una tarea de temporización:
//! 1. Esta tarea agenda el próximo barrido (`Event::Schedule`).
//! 2. La tarea de temporización espera y responde con `Event::Due`.
//! 3. Esta tarea purga las cachés vivas del contexto y agenda el siguiente.


use std::time::Duration;
use tokio::sync::{mpsc};
use tracing::{debug, error, info, instrument};
use crate::context::domain::AppContext;
use super::domain::Event;


/// Ejecuta el bucle principal del barrido.
///
/// # Argumentos
/// * `tx_event`: Canal para enviar comandos al temporizador.
/// * `rx_from_timer`: Canal para recibir los avisos de plazo vencido (`Due`).
/// * `app_context`: Contexto con las cachés registradas y el intervalo configurado.
#[instrument(
    name = "run_sweeper_task",
    skip(tx_event, rx_from_timer, app_context)
)]
pub async fn run_sweeper(tx_event: mpsc::Sender<Event>,
                         mut rx_from_timer: mpsc::Receiver<Event>,
                         app_context: AppContext) {

    let interval = app_context.system.sweep_interval;
    if interval.is_zero() {
        info!("Info: barrido deshabilitado");
        return;
    }

    info!("Info: sweeper task creada");

    if !arm_timer(&tx_event, interval).await {
        return;
    }

    while let Some(event) = rx_from_timer.recv().await {
        match event {
            Event::Due => {
                let removed = app_context.sweep_expired();
                debug!("Debug: barrido completado, {removed} entradas expiradas eliminadas");

                if !arm_timer(&tx_event, interval).await {
                    break;
                }
            }
            _ => {}
        }
    }
    info!("Info: sweeper task finalizada");
}


async fn arm_timer(tx_event: &mpsc::Sender<Event>, interval: Duration) -> bool {
    if tx_event.send(Event::Schedule(interval)).await.is_err() {
        error!("Error: no se pudo enviar el evento al temporizador");
        return false;
    }
    true
}


/// Inicializa y ejecuta la tarea de barrido en segundo plano (tokio task).
///
/// # Argumentos
/// * `to_timer`: Canal hacia el temporizador.
/// * `from_timer`: Canal de entrada desde el temporizador.
/// * `ctx`: Contexto de la aplicación.
pub fn start_sweeper(to_timer: mpsc::Sender<Event>,
                     from_timer: mpsc::Receiver<Event>,
                     ctx: AppContext) -> tokio::task::JoinHandle<()> {

    info!("Info: iniciando tarea sweeper");
    tokio::spawn(async move {
        run_sweeper(
            to_timer,
            from_timer,
            ctx,
        ).await;
    })
}
