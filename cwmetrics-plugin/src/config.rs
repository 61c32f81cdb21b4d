/// Address the ingest server binds to when `--listen` is not given.
pub const DEFAULT_LISTEN_ADDR: &str = "127.0.0.1:8125";

/// Reports buffered per subscriber before a slow plugin starts skipping them.
pub const STATS_CHANNEL_CAPACITY: usize = 64;
