pub const SEARCH_DEBOUNCE_MS: i64 = 300;
pub const STATUS_POLL_INTERVAL_MS: i64 = 5_000;
pub const STATUS_DISMISS_LINGER_MS: i64 = 2_000;

/// Delays propagation of a rapidly changing input value. A new `input` call
/// supersedes any pending one; `poll` yields the settled value at most once.
#[derive(Debug, Clone, Default)]
pub struct Debouncer {
    delay_ms: i64,
    pending: Option<(String, i64)>,
}

impl Debouncer {
    pub fn new(delay_ms: i64) -> Self {
        Self {
            delay_ms,
            pending: None,
        }
    }

    pub fn input(&mut self, value: &str, now_ms: i64) {
        self.pending = Some((value.to_string(), now_ms));
    }

    pub fn poll(&mut self, now_ms: i64) -> Option<String> {
        let (_, at) = self.pending.as_ref()?;
        if now_ms - at < self.delay_ms {
            return None;
        }
        self.pending.take().map(|(value, _)| value)
    }

    pub fn cancel(&mut self) {
        self.pending = None;
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }
}

/// Paces status requests for a processing document and keeps the indicator
/// visible for a short linger after a terminal status is observed.
#[derive(Debug, Clone)]
pub struct StatusPoller {
    interval_ms: i64,
    linger_ms: i64,
    last_request: Option<i64>,
    terminal_at: Option<i64>,
}

impl StatusPoller {
    pub fn new(interval_ms: i64, linger_ms: i64) -> Self {
        Self {
            interval_ms,
            linger_ms,
            last_request: None,
            terminal_at: None,
        }
    }

    /// True when the next status request should be issued now. Always false
    /// once a terminal status has been observed.
    pub fn due(&self, now_ms: i64) -> bool {
        if self.terminal_at.is_some() {
            return false;
        }
        match self.last_request {
            None => true,
            Some(at) => now_ms - at >= self.interval_ms,
        }
    }

    pub fn mark_requested(&mut self, now_ms: i64) {
        self.last_request = Some(now_ms);
    }

    pub fn observe(&mut self, terminal: bool, now_ms: i64) {
        if terminal && self.terminal_at.is_none() {
            self.terminal_at = Some(now_ms);
        }
    }

    pub fn finished(&self) -> bool {
        self.terminal_at.is_some()
    }

    /// True once the post-terminal linger has elapsed and the processing
    /// indicator can be dismissed.
    pub fn dismissed(&self, now_ms: i64) -> bool {
        match self.terminal_at {
            Some(at) => now_ms - at >= self.linger_ms,
            None => false,
        }
    }
}

impl Default for StatusPoller {
    fn default() -> Self {
        Self::new(STATUS_POLL_INTERVAL_MS, STATUS_DISMISS_LINGER_MS)
    }
}
