//! Shared rolling-window rate limiter
//!
//! One limiter is created per crawl and cloned into every component that
//! issues outbound requests, so the total request rate stays bounded no
//! matter how wide the crawl fans out.

use crate::config::CrawlerConfig;
use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;

/// Admits at most `calls` acquisitions in any rolling `period`
///
/// Callers that would exceed the budget sleep until the oldest admission
/// leaves the window. Nothing is ever rejected. Waiters are admitted in
/// arrival order because the window lock is a fair tokio mutex held across
/// the wait.
#[derive(Debug, Clone)]
pub struct RateLimiter {
    inner: Arc<Inner>,
}

#[derive(Debug)]
struct Inner {
    calls: usize,
    period: Duration,
    window: Mutex<VecDeque<Instant>>,
}

impl RateLimiter {
    /// Creates a limiter; `calls` of zero is treated as one
    pub fn new(calls: u32, period: Duration) -> Self {
        let calls = calls.max(1) as usize;
        Self {
            inner: Arc::new(Inner {
                calls,
                period,
                window: Mutex::new(VecDeque::with_capacity(calls)),
            }),
        }
    }

    pub fn from_config(config: &CrawlerConfig) -> Self {
        Self::new(config.calls, config.period())
    }

    pub fn calls(&self) -> usize {
        self.inner.calls
    }

    pub fn period(&self) -> Duration {
        self.inner.period
    }

    /// Waits until one more call may start, then records it
    pub async fn acquire(&self) {
        let mut window = self.inner.window.lock().await;

        loop {
            let now = Instant::now();
            while let Some(&oldest) = window.front() {
                if now.duration_since(oldest) >= self.inner.period {
                    window.pop_front();
                } else {
                    break;
                }
            }

            match window.front().copied() {
                Some(oldest) if window.len() >= self.inner.calls => {
                    let wait = self.inner.period - now.duration_since(oldest);
                    tracing::trace!("Rate limit reached, waiting {:?}", wait);
                    tokio::time::sleep(wait).await;
                }
                _ => {
                    window.push_back(now);
                    return;
                }
            }
        }
    }
}
