//! Time-bounded memoization of secret store lookups.
//!
//! Entries are keyed by [`SecretKey`] and expire a fixed time after they were
//! fetched. Negative results (not found, failed) are cached as well so a
//! single missing secret does not stall every file of a batch run; they use
//! their own TTL, which defaults to the positive one.
//!
//! The cache lives for one process. There is no size bound.

use std::collections::HashMap;
use std::time::{Duration, Instant};
use tracing::trace;

use crate::core::secret::{Lookup, SecretKey};

/// Source of the current time.
///
/// Injected so tests can drive expiry without sleeping.
pub trait Clock {
    fn now(&self) -> Instant;
}

/// Wall clock backed by [`Instant::now`].
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

impl<C: Clock + ?Sized> Clock for &C {
    fn now(&self) -> Instant {
        (**self).now()
    }
}

/// Cache tuning.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CachePolicy {
    /// Lifetime of successful lookups.
    pub ttl: Duration,
    /// Lifetime of not-found and failed lookups.
    pub negative_ttl: Duration,
    /// When false, nothing is ever stored.
    pub enabled: bool,
}

impl CachePolicy {
    /// Policy with the same TTL for positive and negative entries.
    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            ttl,
            negative_ttl: ttl,
            enabled: true,
        }
    }

    /// A policy that stores nothing.
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Self::default()
        }
    }
}

impl Default for CachePolicy {
    fn default() -> Self {
        Self::with_ttl(crate::core::constants::DEFAULT_CACHE_TTL)
    }
}

#[derive(Debug)]
struct CacheEntry {
    lookup: Lookup,
    fetched_at: Instant,
}

/// Hit and miss counters.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: usize,
    pub misses: usize,
    pub entries: usize,
}

/// In-memory lookup cache.
pub struct SecretCache<C: Clock = SystemClock> {
    entries: HashMap<SecretKey, CacheEntry>,
    policy: CachePolicy,
    clock: C,
    hits: usize,
    misses: usize,
}

impl SecretCache<SystemClock> {
    /// Create a cache using the wall clock.
    pub fn new(policy: CachePolicy) -> Self {
        Self::with_clock(policy, SystemClock)
    }
}

impl<C: Clock> SecretCache<C> {
    /// Create a cache with an explicit clock.
    pub fn with_clock(policy: CachePolicy, clock: C) -> Self {
        Self {
            entries: HashMap::new(),
            policy,
            clock,
            hits: 0,
            misses: 0,
        }
    }

    /// The active policy.
    pub fn policy(&self) -> CachePolicy {
        self.policy
    }

    /// Look up a fresh entry.
    ///
    /// Expired entries are reported as a miss; they are replaced by the
    /// next `put` for the same key.
    pub fn get(&mut self, key: &SecretKey) -> Option<&Lookup> {
        let now = self.clock.now();
        let fresh = match self.entries.get(key) {
            Some(entry) => {
                let ttl = self.ttl_for(&entry.lookup);
                now.saturating_duration_since(entry.fetched_at) < ttl
            }
            None => false,
        };

        if fresh {
            self.hits += 1;
            trace!(key = %key, "cache hit");
            self.entries.get(key).map(|e| &e.lookup)
        } else {
            self.misses += 1;
            trace!(key = %key, "cache miss");
            None
        }
    }

    /// Store a lookup result, replacing any previous entry.
    pub fn put(&mut self, key: SecretKey, lookup: Lookup) {
        if !self.policy.enabled {
            return;
        }
        let fetched_at = self.clock.now();
        self.entries.insert(key, CacheEntry { lookup, fetched_at });
    }

    /// Counters since creation.
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits,
            misses: self.misses,
            entries: self.entries.len(),
        }
    }

    fn ttl_for(&self, lookup: &Lookup) -> Duration {
        if lookup.is_negative() {
            self.policy.negative_ttl
        } else {
            self.policy.ttl
        }
    }
}
