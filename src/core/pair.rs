use crate::core::errors::ExchangeError;
use crate::core::types::TypesError;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::sync::{PoisonError, RwLock};

/// Delimiters accepted when parsing a pair from a single string.
const ACCEPTED_DELIMITERS: [char; 4] = ['/', '-', '_', ':'];

/// Canonical form of a single currency symbol: trimmed and lowercase.
///
/// Every key used by the order book store goes through this function.
pub fn canonical_currency(symbol: &str) -> String {
    symbol.trim().to_lowercase()
}

/// How a venue (or the store) renders a pair as one string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PairFormat {
    pub delimiter: String,
    pub uppercase: bool,
}

impl PairFormat {
    pub fn new(delimiter: impl Into<String>, uppercase: bool) -> Self {
        Self {
            delimiter: delimiter.into(),
            uppercase,
        }
    }

    /// The store's internal format: `btc/usdt`.
    pub fn canonical() -> Self {
        Self::new("/", false)
    }
}

/// Ordered (base, quote) currency pair.
///
/// Both symbols are non-empty; construct through `new` or `parse`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawCurrencyPair")]
pub struct CurrencyPair {
    base: String,
    quote: String,
}

#[derive(Deserialize)]
struct RawCurrencyPair {
    base: String,
    quote: String,
}

impl TryFrom<RawCurrencyPair> for CurrencyPair {
    type Error = TypesError;

    fn try_from(raw: RawCurrencyPair) -> Result<Self, Self::Error> {
        Self::new(raw.base, raw.quote)
    }
}

impl CurrencyPair {
    pub fn new(base: impl Into<String>, quote: impl Into<String>) -> Result<Self, TypesError> {
        let base = base.into().trim().to_string();
        let quote = quote.into().trim().to_string();

        if base.is_empty() || quote.is_empty() {
            return Err(TypesError::InvalidSymbol(
                "Base and quote currencies cannot be empty".to_string(),
            ));
        }

        Ok(Self { base, quote })
    }

    /// Rebuild a pair from store keys, which are canonical and non-empty.
    pub(crate) fn from_canonical_parts(base: String, quote: String) -> Self {
        Self { base, quote }
    }

    pub fn base(&self) -> &str {
        &self.base
    }

    pub fn quote(&self) -> &str {
        &self.quote
    }

    /// Same pair with both symbols in canonical form.
    #[must_use]
    pub fn canonical(&self) -> Self {
        Self {
            base: canonical_currency(&self.base),
            quote: canonical_currency(&self.quote),
        }
    }

    /// Render with the given delimiter and case.
    pub fn format(&self, format: &PairFormat) -> String {
        let joined = format!("{}{}{}", self.base, format.delimiter, self.quote);
        if format.uppercase {
            joined.to_uppercase()
        } else {
            joined.to_lowercase()
        }
    }

    #[must_use]
    fn with_case(&self, uppercase: bool) -> Self {
        if uppercase {
            Self {
                base: self.base.to_uppercase(),
                quote: self.quote.to_uppercase(),
            }
        } else {
            self.canonical()
        }
    }
}

impl FromStr for CurrencyPair {
    type Err = TypesError;

    /// Parse `BTC/USDT`, `btc-usdt`, `Btc_Usdt` or `BTC:USDT`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.split(&ACCEPTED_DELIMITERS[..]);
        match (parts.next(), parts.next(), parts.next()) {
            (Some(base), Some(quote), None) => Self::new(base, quote),
            _ => Err(TypesError::InvalidSymbol(format!(
                "expected exactly one delimiter in '{}'",
                s
            ))),
        }
    }
}

impl fmt::Display for CurrencyPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.base, self.quote)
    }
}

/// Translation between canonical pairs and a venue's wire symbols.
pub trait CurrencyPairCodec {
    /// Display format the venue expects in requests.
    fn request_format(&self) -> &PairFormat;

    /// Venue symbol for a pair. Total.
    fn pair_to_symbol(&self, pair: &CurrencyPair) -> String {
        pair.format(self.request_format())
    }

    /// Pair for a venue symbol. Fails for symbols the venue has not advertised.
    fn symbol_to_pair(&self, symbol: &str) -> Result<CurrencyPair, ExchangeError>;
}

/// Venue symbol → pair mapping, populated from the venue's instrument list.
#[derive(Debug, Default)]
pub struct SymbolMap {
    pairs: RwLock<HashMap<String, CurrencyPair>>,
}

impl SymbolMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the whole mapping with a freshly published instrument list.
    pub fn replace(&self, entries: impl IntoIterator<Item = (String, CurrencyPair)>) {
        let fresh: HashMap<_, _> = entries.into_iter().collect();
        *self.pairs.write().unwrap_or_else(PoisonError::into_inner) = fresh;
    }

    pub fn insert(&self, symbol: String, pair: CurrencyPair) {
        self.pairs
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(symbol, pair);
    }

    /// Look up a symbol and render the pair in the venue's case.
    pub fn resolve(&self, symbol: &str, format: &PairFormat) -> Result<CurrencyPair, ExchangeError> {
        self.pairs
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(symbol)
            .map(|pair| pair.with_case(format.uppercase))
            .ok_or_else(|| ExchangeError::UnknownSymbol(symbol.to_string()))
    }

    pub fn len(&self) -> usize {
        self.pairs.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedCodec {
        format: PairFormat,
        symbols: SymbolMap,
    }

    impl CurrencyPairCodec for FixedCodec {
        fn request_format(&self) -> &PairFormat {
            &self.format
        }

        fn symbol_to_pair(&self, symbol: &str) -> Result<CurrencyPair, ExchangeError> {
            self.symbols.resolve(symbol, &self.format)
        }
    }

    #[test]
    fn test_parse_accepts_common_delimiters() {
        for raw in ["BTC/USDT", "btc-usdt", "Btc_Usdt", "BTC:usdt", " btc / usdt "] {
            let pair: CurrencyPair = raw.parse().unwrap();
            assert_eq!(pair.canonical(), CurrencyPair::new("btc", "usdt").unwrap());
        }
    }

    #[test]
    fn test_parse_rejects_ambiguous_input() {
        assert!("BTCUSDT".parse::<CurrencyPair>().is_err());
        assert!("BTC/USDT/ETH".parse::<CurrencyPair>().is_err());
        assert!("/USDT".parse::<CurrencyPair>().is_err());
    }

    #[test]
    fn test_deserialize_goes_through_validation() {
        let pair: CurrencyPair =
            serde_json::from_str(r#"{"base":" ETH ","quote":"BTC"}"#).unwrap();
        assert_eq!(pair.base(), "ETH");
        assert_eq!(pair.quote(), "BTC");

        assert!(serde_json::from_str::<CurrencyPair>(r#"{"base":"","quote":"BTC"}"#).is_err());
        assert!(serde_json::from_str::<CurrencyPair>(r#"{"base":"ETH","quote":"  "}"#).is_err());
    }

    #[test]
    fn test_format() {
        let pair = CurrencyPair::new("btc", "Usdt").unwrap();
        assert_eq!(pair.format(&PairFormat::new("", true)), "BTCUSDT");
        assert_eq!(pair.format(&PairFormat::canonical()), "btc/usdt");
        assert_eq!(pair.to_string(), "btc/Usdt");
    }

    #[test]
    fn test_codec_round_trip_and_unknown_symbol() {
        let codec = FixedCodec {
            format: PairFormat::new("", true),
            symbols: SymbolMap::new(),
        };
        codec
            .symbols
            .insert("ETHBTC".to_string(), CurrencyPair::new("eth", "btc").unwrap());

        let pair = codec.symbol_to_pair("ETHBTC").unwrap();
        assert_eq!(pair, CurrencyPair::new("ETH", "BTC").unwrap());
        assert_eq!(codec.pair_to_symbol(&pair), "ETHBTC");

        match codec.symbol_to_pair("DOGEUSDT") {
            Err(ExchangeError::UnknownSymbol(symbol)) => assert_eq!(symbol, "DOGEUSDT"),
            other => panic!("Expected UnknownSymbol, got {:?}", other),
        }
    }

    #[test]
    fn test_replace_drops_delisted_symbols() {
        let map = SymbolMap::new();
        map.insert("LUNAUSDT".to_string(), CurrencyPair::new("LUNA", "USDT").unwrap());
        map.replace([(
            "BTCUSDT".to_string(),
            CurrencyPair::new("BTC", "USDT").unwrap(),
        )]);

        assert_eq!(map.len(), 1);
        assert!(map.resolve("LUNAUSDT", &PairFormat::canonical()).is_err());
    }
}
