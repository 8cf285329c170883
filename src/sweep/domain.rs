//! Temporizador del barrido de cachés.
//!
//! El sweeper no duerme por su cuenta: agenda el próximo barrido con `Event::Schedule`
//! y el temporizador le avisa con `Event::Due` cuando vence el plazo. Un `Schedule`
//! recibido antes de vencer reemplaza el plazo pendiente (el último gana), y `Stop`
//! termina la tarea sin disparar el barrido agendado.


use tokio::sync::mpsc;
use tokio::time::{sleep_until, Duration, Instant};
use tracing::debug;


#[derive(Debug, PartialEq, Eq)]
pub enum Event {
    /// Agendar un barrido dentro de la duración indicada.
    Schedule(Duration),
    /// El plazo agendado venció: toca purgar.
    Due,
    /// Terminar el temporizador.
    Stop,
}


enum Wake {
    Elapsed,
    Command(Option<Event>),
}


pub async fn sweep_timer(tx_to_sweeper: mpsc::Sender<Event>,
                         mut cmd_rx: mpsc::Receiver<Event>) {

    let mut deadline: Option<Instant> = None;

    loop {
        let wake = match deadline {
            Some(at) => tokio::select! {
                _ = sleep_until(at) => Wake::Elapsed,
                event = cmd_rx.recv() => Wake::Command(event),
            },
            None => Wake::Command(cmd_rx.recv().await),
        };

        match wake {
            Wake::Elapsed => {
                deadline = None;
                if tx_to_sweeper.send(Event::Due).await.is_err() {
                    break; // El sweeper ya no escucha
                }
            }
            Wake::Command(Some(Event::Schedule(after))) => {
                debug!("Debug: barrido agendado en {:?}", after);
                deadline = Some(Instant::now() + after);
            }
            Wake::Command(Some(Event::Stop) | None) => break,
            Wake::Command(Some(Event::Due)) => {}
        }
    }
}


pub fn start_sweep_timer(tx_to_sweeper: mpsc::Sender<Event>,
                         rx_from_sweeper: mpsc::Receiver<Event>) {

    tokio::spawn(async move {
        sweep_timer(
            tx_to_sweeper,
            rx_from_sweeper
        ).await;
    });
}


#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn due_fires_after_the_scheduled_delay() {
        let (to_timer, timer_rx) = mpsc::channel(4);
        let (timer_tx, mut from_timer) = mpsc::channel(4);
        start_sweep_timer(timer_tx, timer_rx);

        let start = Instant::now();
        to_timer.send(Event::Schedule(Duration::from_secs(5))).await.unwrap();

        assert_eq!(from_timer.recv().await, Some(Event::Due));
        assert!(start.elapsed() >= Duration::from_secs(5));
    }

    #[tokio::test(start_paused = true)]
    async fn rescheduling_replaces_the_pending_deadline() {
        let (to_timer, timer_rx) = mpsc::channel(4);
        let (timer_tx, mut from_timer) = mpsc::channel(4);
        start_sweep_timer(timer_tx, timer_rx);

        let start = Instant::now();
        to_timer.send(Event::Schedule(Duration::from_secs(60))).await.unwrap();
        to_timer.send(Event::Schedule(Duration::from_secs(2))).await.unwrap();

        assert_eq!(from_timer.recv().await, Some(Event::Due));
        assert!(start.elapsed() < Duration::from_secs(60));
    }

    #[tokio::test(start_paused = true)]
    async fn stop_ends_the_timer_without_firing() {
        let (to_timer, timer_rx) = mpsc::channel(4);
        let (timer_tx, mut from_timer) = mpsc::channel(4);
        start_sweep_timer(timer_tx, timer_rx);

        to_timer.send(Event::Schedule(Duration::from_secs(1))).await.unwrap();
        to_timer.send(Event::Stop).await.unwrap();

        assert_eq!(from_timer.recv().await, None);
    }
}
