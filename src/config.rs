pub mod cache {
    pub const DEFAULT_TTL_MS: i64 = 300_000;
    pub const SHORT_TTL_MS: i64 = 30_000;
    pub const KEY_SEPARATOR: &str = "_";
}

pub mod fetch {
    use tokio::time::{Duration};

    pub const TIMEOUT: Duration = Duration::from_secs(10);
}

pub mod sweep {
    use tokio::time::{Duration};

    pub const INTERVAL: Duration = Duration::from_secs(60);
    pub const CHANNEL_SIZE: usize = 10;
}
