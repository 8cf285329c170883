use tokio::sync::mpsc;
use crate::config::sweep::CHANNEL_SIZE;
use crate::sweep::domain::Event;


pub struct Channels {
    pub sweeper_to_timer: mpsc::Sender<Event>,
    pub timer_from_sweeper: mpsc::Receiver<Event>,

    pub timer_to_sweeper: mpsc::Sender<Event>,
    pub sweeper_from_timer: mpsc::Receiver<Event>,
}


impl Channels {
    pub fn new() -> Channels {
        let (s_to_t, t_from_s) = mpsc::channel::<Event>(CHANNEL_SIZE);
        let (t_to_s, s_from_t) = mpsc::channel::<Event>(CHANNEL_SIZE);

        Self {
            sweeper_to_timer: s_to_t,
            timer_from_sweeper: t_from_s,
            timer_to_sweeper: t_to_s,
            sweeper_from_timer: s_from_t,
        }
    }
}
