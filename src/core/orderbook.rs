use crate::core::errors::OrderbookError;
use crate::core::pair::{canonical_currency, CurrencyPair};
use crate::core::types::OrderbookSnapshot;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::trace;

type BooksByType = HashMap<String, Arc<OrderbookSnapshot>>;
type BooksByQuote = HashMap<String, BooksByType>;

/// Latest known order book per (base, quote, book type).
///
/// Keys are always canonical currency symbols, so lookups are insensitive to
/// case and delimiter style. A single lock guards the whole nested map; every
/// operation is a handful of hash lookups, so contention stays low. Never hold
/// on to the store across a network call: fetch first, then `upsert`.
#[derive(Debug, Default)]
pub struct OrderbookStore {
    books: Mutex<HashMap<String, BooksByQuote>>,
}

impl OrderbookStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, BooksByQuote>> {
        // A panic mid-upsert cannot leave a half-built level behind, the
        // nested entry is inserted in one statement.
        self.books.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Look up a book.
    ///
    /// Missing base or quote is an error; a missing book type under a known
    /// pair yields an empty snapshot.
    pub fn get(
        &self,
        pair: &CurrencyPair,
        book_type: &str,
    ) -> Result<Arc<OrderbookSnapshot>, OrderbookError> {
        let key = pair.canonical();
        let books = self.lock();

        let by_quote = books
            .get(key.base())
            .ok_or_else(|| OrderbookError::PrimaryCurrencyNotFound {
                base: key.base().to_string(),
            })?;

        let by_type =
            by_quote
                .get(key.quote())
                .ok_or_else(|| OrderbookError::SecondaryCurrencyNotFound {
                    base: key.base().to_string(),
                    quote: key.quote().to_string(),
                })?;

        Ok(by_type
            .get(book_type)
            .cloned()
            .unwrap_or_else(|| Arc::new(OrderbookSnapshot::empty(key))))
    }

    /// Store a snapshot, replacing whatever was there for the same key.
    ///
    /// The snapshot's pair is rewritten to canonical form and `last_updated`
    /// is stamped with the ingestion time.
    pub fn upsert(&self, pair: &CurrencyPair, book_type: &str, mut snapshot: OrderbookSnapshot) {
        let key = pair.canonical();
        snapshot.pair = key.clone();
        snapshot.last_updated = Utc::now();

        trace!(
            pair = %key,
            book_type,
            bids = snapshot.bids.len(),
            asks = snapshot.asks.len(),
            "orderbook upsert"
        );

        self.lock()
            .entry(key.base().to_string())
            .or_default()
            .entry(key.quote().to_string())
            .or_default()
            .insert(book_type.to_string(), Arc::new(snapshot));
    }

    pub fn has_base(&self, base: &str) -> bool {
        self.lock().contains_key(&canonical_currency(base))
    }

    pub fn has_pair(&self, pair: &CurrencyPair) -> bool {
        let key = pair.canonical();
        self.lock()
            .get(key.base())
            .is_some_and(|by_quote| by_quote.contains_key(key.quote()))
    }

    /// Every stored (pair, book type), in no particular order.
    pub fn keys(&self) -> Vec<(CurrencyPair, String)> {
        self.lock()
            .iter()
            .flat_map(|(base, by_quote)| {
                by_quote.iter().flat_map(move |(quote, by_type)| {
                    by_type.keys().map(move |book_type| {
                        (
                            CurrencyPair::from_canonical_parts(base.clone(), quote.clone()),
                            book_type.clone(),
                        )
                    })
                })
            })
            .collect()
    }
}
