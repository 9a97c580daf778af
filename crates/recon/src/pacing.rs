use std::thread;
use std::time::{Duration, Instant};

/// Client-side write pacing. The remote quota is undocumented; the only
/// discipline available is "don't call faster than a small fixed rate."
/// Called once before every write; reads are not paced.
pub trait Pacer {
    fn pace(&mut self);
}

/// Sleep a fixed interval between writes, except before the first one.
#[derive(Debug)]
pub struct FixedDelay {
    interval: Duration,
    last: Option<Instant>,
}

impl FixedDelay {
    pub fn new(interval: Duration) -> Self {
        Self { interval, last: None }
    }
}

impl Pacer for FixedDelay {
    fn pace(&mut self) {
        if let Some(last) = self.last {
            let elapsed = last.elapsed();
            if elapsed < self.interval {
                thread::sleep(self.interval - elapsed);
            }
        }
        self.last = Some(Instant::now());
    }
}

/// Token bucket: `capacity` writes may burst, refilled at
/// `refill_per_sec` tokens per second.
#[derive(Debug)]
pub struct TokenBucket {
    capacity: f64,
    refill_per_sec: f64,
    tokens: f64,
    last_refill: Instant,
}

impl TokenBucket {
    pub fn new(capacity: u32, refill_per_sec: f64) -> Self {
        Self {
            capacity: capacity as f64,
            refill_per_sec,
            tokens: capacity as f64,
            last_refill: Instant::now(),
        }
    }

    fn refill(&mut self, now: Instant) {
        let elapsed = now.duration_since(self.last_refill).as_secs_f64();
        self.tokens = (self.tokens + elapsed * self.refill_per_sec).min(self.capacity);
        self.last_refill = now;
    }

    /// Seconds to wait before one token is available, after refilling.
    fn wait_needed(&mut self, now: Instant) -> f64 {
        self.refill(now);
        if self.tokens >= 1.0 {
            0.0
        } else {
            (1.0 - self.tokens) / self.refill_per_sec
        }
    }
}

impl Pacer for TokenBucket {
    fn pace(&mut self) {
        let wait = self.wait_needed(Instant::now());
        if wait > 0.0 {
            thread::sleep(Duration::from_secs_f64(wait));
        }
        self.refill(Instant::now());
        self.tokens -= 1.0;
    }
}

/// No pacing. Used by tests and dry runs, where no writes happen anyway.
#[derive(Debug, Default)]
pub struct NoPacing;

impl Pacer for NoPacing {
    fn pace(&mut self) {}
}
