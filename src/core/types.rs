use crate::core::pair::CurrencyPair;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum TypesError {
    #[error("Invalid symbol: {0}")]
    InvalidSymbol(String),
    #[error("Invalid decimal: {0}")]
    InvalidDecimal(#[from] rust_decimal::Error),
    #[error("Value must be positive: {0}")]
    NonPositive(Decimal),
}

fn parse_positive(s: &str) -> Result<Decimal, TypesError> {
    let value: Decimal = s.trim().parse()?;
    if value.is_sign_negative() || value.is_zero() {
        return Err(TypesError::NonPositive(value));
    }
    Ok(value)
}

/// Type-safe price representation
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Price(#[serde(with = "rust_decimal::serde::str")] pub Decimal);

impl Price {
    pub fn new(value: Decimal) -> Self {
        Self(value)
    }

    /// Parse a venue price string; zero and negative prices are rejected.
    pub fn parse(s: &str) -> Result<Self, TypesError> {
        parse_positive(s).map(Self)
    }

    pub fn value(&self) -> Decimal {
        self.0
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Type-safe quantity representation
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Quantity(#[serde(with = "rust_decimal::serde::str")] pub Decimal);

impl Quantity {
    pub fn new(value: Decimal) -> Self {
        Self(value)
    }

    pub fn parse(s: &str) -> Result<Self, TypesError> {
        parse_positive(s).map(Self)
    }

    pub fn value(&self) -> Decimal {
        self.0
    }
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Book type tags. Any string works as a book type; these are the common ones.
pub mod book_type {
    pub const SPOT: &str = "SPOT";
    pub const MARGIN: &str = "MARGIN";
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderbookLevel {
    pub price: Price,
    pub amount: Quantity,
}

impl OrderbookLevel {
    pub fn new(price: Price, amount: Quantity) -> Self {
        Self { price, amount }
    }
}

/// Full order book for one pair as last reported by the venue.
///
/// Bids are highest-first and asks lowest-first, in whatever order the venue
/// sent them. Snapshots are replaced wholesale, never patched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderbookSnapshot {
    pub pair: CurrencyPair,
    pub bids: Vec<OrderbookLevel>,
    pub asks: Vec<OrderbookLevel>,
    pub last_updated: DateTime<Utc>,
}

impl OrderbookSnapshot {
    pub fn new(pair: CurrencyPair, bids: Vec<OrderbookLevel>, asks: Vec<OrderbookLevel>) -> Self {
        Self {
            pair,
            bids,
            asks,
            last_updated: Utc::now(),
        }
    }

    /// A book with no levels, stamped at the Unix epoch.
    pub fn empty(pair: CurrencyPair) -> Self {
        Self {
            pair,
            bids: Vec::new(),
            asks: Vec::new(),
            last_updated: DateTime::<Utc>::default(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.bids.is_empty() && self.asks.is_empty()
    }

    pub fn best_bid(&self) -> Option<&OrderbookLevel> {
        self.bids.first()
    }

    pub fn best_ask(&self) -> Option<&OrderbookLevel> {
        self.asks.first()
    }

    /// (collated amount, notional value) of all bids
    pub fn total_bids(&self) -> (Decimal, Decimal) {
        collate(&self.bids)
    }

    /// (collated amount, notional value) of all asks
    pub fn total_asks(&self) -> (Decimal, Decimal) {
        collate(&self.asks)
    }
}

fn collate(levels: &[OrderbookLevel]) -> (Decimal, Decimal) {
    levels
        .iter()
        .fold((Decimal::ZERO, Decimal::ZERO), |(amount, total), level| {
            (
                amount + level.amount.value(),
                total + level.amount.value() * level.price.value(),
            )
        })
}
