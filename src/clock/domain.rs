//! Fuente de tiempo para el estado y la caché.
//!
//! La expiración se calcula con milisegundos de reloj de pared (equivalente a `Date.now()`).
//! No se corrige el salto de reloj: si el host retrocede, una entrada puede parecer más fresca.


use std::fmt::Debug;
use std::sync::atomic::{AtomicI64, Ordering};
use chrono::Utc;


pub trait Clock: Send + Sync + Debug {
    /// Milisegundos desde la época Unix.
    fn now_millis(&self) -> i64;
}


#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;


impl Clock for SystemClock {
    fn now_millis(&self) -> i64 {
        Utc::now().timestamp_millis()
    }
}


/// Reloj simulado, avanzado a mano. Usado por tests y escenarios deterministas.
#[derive(Debug, Default)]
pub struct ManualClock {
    now: AtomicI64,
}


impl ManualClock {
    pub fn new(start_millis: i64) -> Self {
        Self { now: AtomicI64::new(start_millis) }
    }

    pub fn set(&self, millis: i64) {
        self.now.store(millis, Ordering::SeqCst);
    }

    pub fn advance(&self, millis: i64) {
        self.now.fetch_add(millis, Ordering::SeqCst);
    }
}


impl Clock for ManualClock {
    fn now_millis(&self) -> i64 {
        self.now.load(Ordering::SeqCst)
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn manual_clock_advances() {
        let clock = ManualClock::new(1_000);
        clock.advance(150);
        assert_eq!(clock.now_millis(), 1_150);
        clock.set(0);
        assert_eq!(clock.now_millis(), 0);
    }

    #[test]
    fn system_clock_is_wall_time() {
        let before = Utc::now().timestamp_millis();
        let now = SystemClock.now_millis();
        assert!(now >= before);
    }
}
