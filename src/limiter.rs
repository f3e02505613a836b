use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use std::time::{Duration, Instant};

/// Idle clients are swept from the map once per this many checks
const EVICT_INTERVAL: u64 = 256;

/// Result of a quota check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Quota {
    /// Attempt recorded; `remaining` attempts left in the current window
    Allowed { remaining: u32 },
    /// Quota exhausted; not retryable before `retry_after`
    Limited { retry_after: Duration },
}

impl Quota {
    pub fn is_limited(&self) -> bool {
        matches!(self, Quota::Limited { .. })
    }
}

struct LimiterState {
    // Per-client timestamps of attempts inside the trailing window
    clients: HashMap<String, VecDeque<Instant>>,
    // Total checks served, drives the periodic idle-client sweep
    checks: u64,
}

/// Rolling-window rate limiter, keyed by client identity.
///
/// State is process-local and reset on restart. The client key is the
/// originating network address, which is weak identity behind shared NAT or
/// proxies; that limitation is accepted for this scope.
pub struct RateLimiter {
    max_attempts: u32,
    window: Duration,
    // Mutex-guarded so concurrent bursts from one client cannot undercount
    state: Mutex<LimiterState>,
}

impl RateLimiter {
    pub fn new(max_attempts: u32, window: Duration) -> Self {
        Self {
            max_attempts,
            window,
            state: Mutex::new(LimiterState {
                clients: HashMap::new(),
                checks: 0,
            }),
        }
    }

    /// Record an attempt for `client` and report whether it is within quota.
    ///
    /// Every `EVICT_INTERVAL` checks the map is swept of clients whose last
    /// attempt has aged out of the window, so one-off addresses do not
    /// accumulate for the life of the process.
    pub fn check(&self, client: &str) -> Quota {
        self.check_at(client, Instant::now())
    }

    fn check_at(&self, client: &str, now: Instant) -> Quota {
        let mut state = self.state.lock().expect("rate limiter lock poisoned");

        state.checks += 1;
        if state.checks % EVICT_INTERVAL == 0 {
            let window = self.window;
            Self::evict_idle(&mut state.clients, now, window);
        }

        let attempts = state.clients.entry(client.to_string()).or_default();

        // Drop attempts that have aged out of the trailing window
        while let Some(oldest) = attempts.front() {
            if now.duration_since(*oldest) >= self.window {
                attempts.pop_front();
            } else {
                break;
            }
        }

        if attempts.len() >= self.max_attempts as usize {
            let oldest = *attempts.front().expect("non-empty window");
            let retry_after = self.window - now.duration_since(oldest);
            tracing::debug!(%client, ?retry_after, "Submission quota exhausted");
            return Quota::Limited { retry_after };
        }

        attempts.push_back(now);
        let remaining = self.max_attempts - attempts.len() as u32;
        Quota::Allowed { remaining }
    }

    /// Drop clients with no attempts inside the current window.
    /// Runs periodically from `check`; also safe to call at any time.
    pub fn evict_stale(&self) {
        let now = Instant::now();
        let mut state = self.state.lock().expect("rate limiter lock poisoned");
        Self::evict_idle(&mut state.clients, now, self.window);
    }

    fn evict_idle(
        clients: &mut HashMap<String, VecDeque<Instant>>,
        now: Instant,
        window: Duration,
    ) {
        clients.retain(|_, attempts| {
            attempts
                .back()
                .map(|last| now.duration_since(*last) < window)
                .unwrap_or(false)
        });
    }
}
