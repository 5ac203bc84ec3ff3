//! # Exchange Rates
//!
//! Currency buy rates against TRY, used to snapshot foreign-currency
//! expenses.
//!
//! ```text
//! rate(USD, 2024-03-01)
//!      │
//!      ├── TRY?                    → 1.0000
//!      ├── cache hit, not expired  → cached rate
//!      ├── source.fetch(date)      → cache (1h for today, 7d for past days)
//!      └── source failed / missing → static fallback rate
//! ```
//!
//! Expired dates are dropped whenever a new table is cached, so the cache
//! only holds dates still inside their TTL.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use chrono::NaiveDate;
use serde::Serialize;
use tokio::sync::RwLock;
use tracing::{debug, warn};

use teknoroma_core::{Currency, ExchangeRate};

/// Cache lifetime for today's rates (the feed can still change).
pub const TODAY_TTL: Duration = Duration::from_secs(60 * 60);

/// Cache lifetime for past dates.
pub const HISTORY_TTL: Duration = Duration::from_secs(7 * 24 * 60 * 60);

/// Rates used when no source answers. Ten-thousandths of a TRY.
pub const FALLBACK_RATES: [(Currency, i64); 3] = [
    (Currency::Usd, 345_000),
    (Currency::Eur, 372_000),
    (Currency::Gbp, 438_000),
];

// =============================================================================
// Rate Source
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum RateSourceError {
    #[error("Rate source unavailable: {0}")]
    Unavailable(String),

    #[error("No rates published for {0}")]
    NoData(NaiveDate),
}

/// Somewhere rates for a date can be fetched from.
#[async_trait]
pub trait RateSource: Send + Sync {
    fn name(&self) -> &'static str;

    async fn fetch(&self, date: NaiveDate) -> Result<HashMap<Currency, ExchangeRate>, RateSourceError>;
}

/// Hard-coded rates. Always answers.
#[derive(Debug, Clone, Copy, Default)]
pub struct StaticRateSource;

#[async_trait]
impl RateSource for StaticRateSource {
    fn name(&self) -> &'static str {
        "static"
    }

    async fn fetch(&self, _date: NaiveDate) -> Result<HashMap<Currency, ExchangeRate>, RateSourceError> {
        Ok(fallback_table())
    }
}

fn fallback_table() -> HashMap<Currency, ExchangeRate> {
    FALLBACK_RATES
        .iter()
        .map(|(c, v)| (*c, ExchangeRate::from_ten_thousandths(*v)))
        .collect()
}

fn fallback_rate(currency: Currency) -> ExchangeRate {
    FALLBACK_RATES
        .iter()
        .find(|(c, _)| *c == currency)
        .map(|(_, v)| ExchangeRate::from_ten_thousandths(*v))
        .unwrap_or(ExchangeRate::ONE)
}

// =============================================================================
// Service
// =============================================================================

#[derive(Debug, Clone)]
struct CachedRates {
    rates: HashMap<Currency, ExchangeRate>,
    expires_at: Instant,
}

/// One currency's rate as returned by the API.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RateQuote {
    pub currency: Currency,
    /// Decimal text, e.g. `"34.5000"`
    pub rate: String,
    pub rate_ten_thousandths: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct RateTable {
    pub date: NaiveDate,
    pub rates: Vec<RateQuote>,
}

/// Caching front for a [`RateSource`] with a static fallback.
pub struct ExchangeRateService {
    source: Arc<dyn RateSource>,
    cache: RwLock<HashMap<NaiveDate, CachedRates>>,
    today_ttl: Duration,
    history_ttl: Duration,
}

impl ExchangeRateService {
    pub fn new(source: Arc<dyn RateSource>) -> Self {
        ExchangeRateService {
            source,
            cache: RwLock::new(HashMap::new()),
            today_ttl: TODAY_TTL,
            history_ttl: HISTORY_TTL,
        }
    }

    /// Overrides the cache lifetimes for today's and past dates.
    pub fn with_ttls(mut self, today: Duration, history: Duration) -> Self {
        self.today_ttl = today;
        self.history_ttl = history;
        self
    }

    /// Service backed only by the static fallback rates.
    pub fn with_fallback() -> Self {
        Self::new(Arc::new(StaticRateSource))
    }

    /// Buy rate of `currency` on `date`. Never fails.
    pub async fn rate(&self, currency: Currency, date: NaiveDate, today: NaiveDate) -> ExchangeRate {
        if currency == Currency::Try {
            return ExchangeRate::ONE;
        }

        let table = self.table(date, today).await;
        match table.get(&currency) {
            Some(rate) if rate.is_positive() => *rate,
            _ => {
                warn!(currency = %currency, date = %date, "No rate from source, using fallback");
                fallback_rate(currency)
            }
        }
    }

    /// All foreign-currency rates for `date`.
    pub async fn rates(&self, date: NaiveDate, today: NaiveDate) -> RateTable {
        let mut rates = Vec::with_capacity(Currency::FOREIGN.len());
        for currency in Currency::FOREIGN {
            let rate = self.rate(currency, date, today).await;
            rates.push(RateQuote {
                currency,
                rate: rate.to_string(),
                rate_ten_thousandths: rate.ten_thousandths(),
            });
        }
        RateTable { date, rates }
    }

    async fn table(&self, date: NaiveDate, today: NaiveDate) -> HashMap<Currency, ExchangeRate> {
        {
            let cache = self.cache.read().await;
            if let Some(cached) = cache.get(&date) {
                if cached.expires_at > Instant::now() {
                    debug!(date = %date, "Exchange rate cache hit");
                    return cached.rates.clone();
                }
            }
        }

        match self.source.fetch(date).await {
            Ok(rates) => {
                debug!(date = %date, source = self.source.name(), "Fetched exchange rates");
                let ttl = if date >= today { self.today_ttl } else { self.history_ttl };
                let now = Instant::now();

                let mut cache = self.cache.write().await;
                cache.retain(|_, cached| cached.expires_at > now);
                cache.insert(
                    date,
                    CachedRates {
                        rates: rates.clone(),
                        expires_at: now + ttl,
                    },
                );
                rates
            }
            Err(e) => {
                warn!(date = %date, source = self.source.name(), error = %e, "Rate source failed, using fallback");
                fallback_table()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingSource {
        calls: AtomicUsize,
        fail: bool,
    }

    #[async_trait]
    impl RateSource for CountingSource {
        fn name(&self) -> &'static str {
            "counting"
        }

        async fn fetch(&self, date: NaiveDate) -> Result<HashMap<Currency, ExchangeRate>, RateSourceError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(RateSourceError::NoData(date));
            }
            Ok(HashMap::from([(Currency::Usd, ExchangeRate::from_ten_thousandths(320_000))]))
        }
    }

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, d).unwrap()
    }

    #[tokio::test]
    async fn test_try_is_identity() {
        let service = ExchangeRateService::with_fallback();
        assert_eq!(service.rate(Currency::Try, day(1), day(1)).await, ExchangeRate::ONE);
    }

    #[tokio::test]
    async fn test_static_rates() {
        let service = ExchangeRateService::with_fallback();
        let usd = service.rate(Currency::Usd, day(1), day(1)).await;
        assert_eq!(usd.to_string(), "34.5000");

        let table = service.rates(day(1), day(1)).await;
        assert_eq!(table.rates.len(), 3);
        assert_eq!(table.rates[2].rate, "43.8000");
    }

    #[tokio::test]
    async fn test_cache_avoids_refetch() {
        let source = Arc::new(CountingSource {
            calls: AtomicUsize::new(0),
            fail: false,
        });
        let service = ExchangeRateService::new(source.clone());

        let first = service.rate(Currency::Usd, day(1), day(5)).await;
        let second = service.rate(Currency::Usd, day(1), day(5)).await;
        assert_eq!(first, second);
        assert_eq!(first.ten_thousandths(), 320_000);
        assert_eq!(source.calls.load(Ordering::SeqCst), 1);

        // currency missing from the source falls back
        let eur = service.rate(Currency::Eur, day(1), day(5)).await;
        assert_eq!(eur.ten_thousandths(), 372_000);
    }

    #[tokio::test]
    async fn test_expired_dates_are_evicted() {
        let source = Arc::new(CountingSource {
            calls: AtomicUsize::new(0),
            fail: false,
        });

        let service = ExchangeRateService::new(source.clone());
        for d in 1..=3 {
            service.rate(Currency::Usd, day(d), day(10)).await;
        }
        assert_eq!(service.cache.read().await.len(), 3);

        let service = ExchangeRateService::new(source.clone()).with_ttls(Duration::ZERO, Duration::ZERO);
        for d in 1..=3 {
            service.rate(Currency::Usd, day(d), day(10)).await;
        }
        let cache = service.cache.read().await;
        assert_eq!(cache.len(), 1);
        assert!(cache.contains_key(&day(3)));
    }

    #[tokio::test]
    async fn test_failing_source_falls_back_without_caching() {
        let source = Arc::new(CountingSource {
            calls: AtomicUsize::new(0),
            fail: true,
        });
        let service = ExchangeRateService::new(source.clone());

        let usd = service.rate(Currency::Usd, day(2), day(2)).await;
        assert_eq!(usd.ten_thousandths(), 345_000);

        service.rate(Currency::Usd, day(2), day(2)).await;
        assert_eq!(source.calls.load(Ordering::SeqCst), 2);
    }
}
