//! Rate limiting for the second pass
//!
//! The second pass waits on a [`RateLimiter`] before every fetch. The
//! limiter is injected, so tests can run the pipeline with [`Unlimited`]
//! while production uses a fixed delay or a token bucket.

use crate::config::RateLimitKind;
use governor::clock::DefaultClock;
use governor::state::{InMemoryState, NotKeyed};
use governor::Quota;
use std::future::Future;
use std::num::NonZeroU32;
use std::time::Duration;

type DirectLimiter = governor::RateLimiter<NotKeyed, InMemoryState, DefaultClock>;

/// Something the second pass can wait on before issuing a request
pub trait RateLimiter: Send + Sync {
    /// Resolves once the next request may be sent
    fn until_ready(&self) -> impl Future<Output = ()> + Send;
}

/// Sleeps the full delay before every request
///
/// Consecutive requests are therefore separated by at least the delay
/// plus the time the previous request took.
#[derive(Debug, Clone, Copy)]
pub struct FixedDelay {
    delay: Duration,
}

impl FixedDelay {
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }
}

impl RateLimiter for FixedDelay {
    fn until_ready(&self) -> impl Future<Output = ()> + Send {
        tokio::time::sleep(self.delay)
    }
}

/// One request per period, the first one immediately
pub struct TokenBucket {
    limiter: DirectLimiter,
    period: Duration,
}

impl TokenBucket {
    /// Creates a bucket holding a single token refilled every `period`
    ///
    /// A zero period degrades to one request per second.
    pub fn new(period: Duration) -> Self {
        let quota = Quota::with_period(period)
            .unwrap_or_else(|| Quota::per_second(NonZeroU32::MIN))
            .allow_burst(NonZeroU32::MIN);

        Self {
            limiter: governor::RateLimiter::direct(quota),
            period,
        }
    }

    pub fn period(&self) -> Duration {
        self.period
    }
}

impl RateLimiter for TokenBucket {
    fn until_ready(&self) -> impl Future<Output = ()> + Send {
        self.limiter.until_ready()
    }
}

/// Never waits
#[derive(Debug, Clone, Copy, Default)]
pub struct Unlimited;

impl RateLimiter for Unlimited {
    fn until_ready(&self) -> impl Future<Output = ()> + Send {
        std::future::ready(())
    }
}

/// Rate limiter selected at runtime from configuration
pub enum Limiter {
    Fixed(FixedDelay),
    TokenBucket(TokenBucket),
    Unlimited(Unlimited),
}

impl Limiter {
    /// Builds the limiter named by the configuration
    pub fn from_config(kind: RateLimitKind, delay_ms: u64) -> Self {
        let delay = Duration::from_millis(delay_ms);
        match kind {
            RateLimitKind::FixedDelay => Limiter::Fixed(FixedDelay::new(delay)),
            RateLimitKind::TokenBucket => Limiter::TokenBucket(TokenBucket::new(delay)),
            RateLimitKind::None => Limiter::Unlimited(Unlimited),
        }
    }

    /// Human-readable description for logs and dry runs
    pub fn describe(&self) -> String {
        match self {
            Limiter::Fixed(fixed) => format!("fixed delay of {:?} per fetch", fixed.delay()),
            Limiter::TokenBucket(bucket) => {
                format!("token bucket, one fetch per {:?}", bucket.period())
            }
            Limiter::Unlimited(_) => "no rate limit".to_string(),
        }
    }
}

impl RateLimiter for Limiter {
    fn until_ready(&self) -> impl Future<Output = ()> + Send {
        async move {
            match self {
                Limiter::Fixed(fixed) => fixed.until_ready().await,
                Limiter::TokenBucket(bucket) => bucket.until_ready().await,
                Limiter::Unlimited(unlimited) => unlimited.until_ready().await,
            }
        }
    }
}
