//! Time-bucketed cache in front of a provider.
//!
//! Entries are keyed by the requested ticker set and the TTL bucket the
//! request falls into, so an entry is reused for at most one bucket.

use crate::{HistoryProvider, ProviderOutcome};
use chrono::{DateTime, Utc};
use ledger_core::{HistoricalSeries, Ticker};
use std::collections::{BTreeSet, HashMap};
use std::sync::Mutex;
use tracing::debug;

/// One hour.
pub const DEFAULT_TTL_SECS: u64 = 3600;

/// Source of "now" for bucketing.
pub trait Clock {
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Order-insensitive ticker set plus time bucket.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub tickers: BTreeSet<Ticker>,
    pub bucket: i64,
}

impl CacheKey {
    pub fn new(tickers: &[Ticker], now: DateTime<Utc>, ttl_secs: u64) -> Self {
        let ttl = i64::try_from(ttl_secs.max(1)).unwrap_or(i64::MAX);
        Self {
            tickers: tickers.iter().cloned().collect(),
            bucket: now.timestamp().div_euclid(ttl),
        }
    }
}

/// Caches available series from `inner`. Unavailable outcomes are not cached
/// so the next request retries the source.
pub struct CachedProvider<P, C = SystemClock> {
    inner: P,
    clock: C,
    ttl_secs: u64,
    entries: Mutex<HashMap<CacheKey, HistoricalSeries>>,
}

impl<P: HistoryProvider> CachedProvider<P> {
    pub fn new(inner: P, ttl_secs: u64) -> Self {
        Self::with_clock(inner, ttl_secs, SystemClock)
    }
}

impl<P: HistoryProvider, C: Clock> CachedProvider<P, C> {
    pub fn with_clock(inner: P, ttl_secs: u64, clock: C) -> Self {
        Self {
            inner,
            clock,
            ttl_secs,
            entries: Mutex::new(HashMap::new()),
        }
    }

    pub fn ttl_secs(&self) -> u64 {
        self.ttl_secs
    }

    pub fn inner(&self) -> &P {
        &self.inner
    }

    /// Number of live entries.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop every entry.
    pub fn clear(&self) {
        self.lock().clear();
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<CacheKey, HistoricalSeries>> {
        // A panic while holding the lock leaves the map itself intact.
        self.entries.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl<P: HistoryProvider, C: Clock> HistoryProvider for CachedProvider<P, C> {
    fn name(&self) -> &str {
        self.inner.name()
    }

    fn fetch(&self, tickers: &[Ticker]) -> ProviderOutcome {
        if self.ttl_secs == 0 {
            return self.inner.fetch(tickers);
        }
        let key = CacheKey::new(tickers, self.clock.now(), self.ttl_secs);
        if let Some(series) = self.lock().get(&key) {
            debug!(bucket = key.bucket, tickers = key.tickers.len(), "history cache hit");
            return ProviderOutcome::Available(series.clone());
        }

        let outcome = self.inner.fetch(tickers);
        if let ProviderOutcome::Available(series) = &outcome {
            let mut entries = self.lock();
            entries.retain(|k, _| k.bucket >= key.bucket);
            entries.insert(key, series.clone());
        }
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ReferenceProvider, UnavailableReason};
    use std::sync::atomic::{AtomicI64, AtomicUsize, Ordering};

    struct ManualClock(AtomicI64);

    impl ManualClock {
        fn at(secs: i64) -> Self {
            Self(AtomicI64::new(secs))
        }
        fn advance(&self, secs: i64) {
            self.0.fetch_add(secs, Ordering::SeqCst);
        }
    }

    impl Clock for &ManualClock {
        fn now(&self) -> DateTime<Utc> {
            DateTime::<Utc>::from_timestamp(self.0.load(Ordering::SeqCst), 0).unwrap_or_default()
        }
    }

    #[derive(Default)]
    struct Counting {
        calls: AtomicUsize,
        fail: bool,
    }

    impl HistoryProvider for Counting {
        fn name(&self) -> &str {
            "counting"
        }
        fn fetch(&self, tickers: &[Ticker]) -> ProviderOutcome {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                ProviderOutcome::Unavailable(UnavailableReason::Failed("down".into()))
            } else {
                ReferenceProvider.fetch(tickers)
            }
        }
    }

    fn calls<C: Clock>(p: &CachedProvider<Counting, C>) -> usize {
        p.inner().calls.load(Ordering::SeqCst)
    }

    #[test]
    fn hit_within_bucket_and_ticker_order_ignored() {
        let clock = ManualClock::at(7_200);
        let p = CachedProvider::with_clock(Counting::default(), 3600, &clock);
        let a = [Ticker::from("BLK"), Ticker::from("STT")];
        let b = [Ticker::from("STT"), Ticker::from("BLK")];
        let first = p.fetch(&a);
        clock.advance(100);
        let second = p.fetch(&b);
        assert_eq!(calls(&p), 1);
        assert!(first.is_available() && second.is_available());
        assert_eq!(p.len(), 1);
    }

    #[test]
    fn new_bucket_refetches_and_evicts() {
        let clock = ManualClock::at(7_200);
        let p = CachedProvider::with_clock(Counting::default(), 3600, &clock);
        p.fetch(&[]);
        clock.advance(3600);
        p.fetch(&[]);
        assert_eq!(calls(&p), 2);
        assert_eq!(p.len(), 1);
    }

    #[test]
    fn failures_are_not_cached() {
        let clock = ManualClock::at(0);
        let inner = Counting {
            fail: true,
            ..Counting::default()
        };
        let p = CachedProvider::with_clock(inner, 3600, &clock);
        assert!(!p.fetch(&[]).is_available());
        assert!(!p.fetch(&[]).is_available());
        assert_eq!(calls(&p), 2);
        assert!(p.is_empty());
    }

    #[test]
    fn zero_ttl_disables_caching() {
        let clock = ManualClock::at(0);
        let p = CachedProvider::with_clock(Counting::default(), 0, &clock);
        p.fetch(&[]);
        p.fetch(&[]);
        assert_eq!(calls(&p), 2);
        p.clear();
        assert!(p.is_empty());
    }

    #[test]
    fn key_buckets_by_ttl() {
        let t = |s| DateTime::<Utc>::from_timestamp(s, 0).unwrap();
        let k1 = CacheKey::new(&[], t(3599), 3600);
        let k2 = CacheKey::new(&[], t(3600), 3600);
        assert_eq!(k1.bucket, 0);
        assert_eq!(k2.bucket, 1);
    }
}
