use super::types::{BinanceDepth, BinanceExchangeInfo};
use crate::core::errors::ExchangeError;
use crate::core::pair::CurrencyPair;
use crate::core::types::{OrderbookLevel, OrderbookSnapshot, Price, Quantity};
use rust_decimal::Decimal;

/// Venue symbol → pair entries for every market in the instrument list.
pub fn symbol_entries(info: &BinanceExchangeInfo) -> Vec<(String, CurrencyPair)> {
    info.symbols
        .iter()
        .filter_map(|market| {
            CurrencyPair::new(market.base_asset.as_str(), market.quote_asset.as_str())
                .ok()
                .map(|pair| (market.symbol.clone(), pair))
        })
        .collect()
}

/// Convert a depth response into a snapshot, keeping the venue's level order.
///
/// Levels with a zero amount carry no liquidity and are dropped; anything
/// unparsable or negative fails the whole conversion.
pub fn convert_depth(
    pair: &CurrencyPair,
    depth: BinanceDepth,
) -> Result<OrderbookSnapshot, ExchangeError> {
    let bids = convert_levels(&depth.bids)?;
    let asks = convert_levels(&depth.asks)?;
    Ok(OrderbookSnapshot::new(pair.clone(), bids, asks))
}

fn convert_levels(raw: &[[String; 2]]) -> Result<Vec<OrderbookLevel>, ExchangeError> {
    raw.iter()
        .filter(|[_, amount]| !is_zero(amount))
        .map(|[price, amount]| {
            let price = Price::parse(price).map_err(|e| {
                ExchangeError::MalformedResponse(format!("bad price '{}': {}", price, e))
            })?;
            let amount = Quantity::parse(amount).map_err(|e| {
                ExchangeError::MalformedResponse(format!("bad amount '{}': {}", amount, e))
            })?;
            Ok(OrderbookLevel::new(price, amount))
        })
        .collect()
}

fn is_zero(raw: &str) -> bool {
    raw.trim().parse::<Decimal>().is_ok_and(|d| d.is_zero())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn depth(bids: &[(&str, &str)], asks: &[(&str, &str)]) -> BinanceDepth {
        let levels = |raw: &[(&str, &str)]| -> Vec<[String; 2]> {
            raw.iter()
                .map(|(p, q)| [(*p).to_string(), (*q).to_string()])
                .collect()
        };
        BinanceDepth {
            last_update_id: 1_027_024,
            bids: levels(bids),
            asks: levels(asks),
        }
    }

    #[test]
    fn test_convert_depth_keeps_order() {
        let pair = CurrencyPair::new("BTC", "USDT").unwrap();
        let snapshot = convert_depth(
            &pair,
            depth(
                &[("4.00000000", "431.00000000"), ("3.90000000", "12.00000000")],
                &[("4.00000200", "12.00000000")],
            ),
        )
        .unwrap();

        assert_eq!(snapshot.pair, pair);
        assert_eq!(snapshot.bids.len(), 2);
        assert_eq!(snapshot.bids[0].price.value(), dec!(4));
        assert_eq!(snapshot.bids[1].amount.value(), dec!(12));
        assert_eq!(snapshot.asks[0].price.value(), dec!(4.000002));
    }

    #[test]
    fn test_zero_amount_levels_are_dropped() {
        let pair = CurrencyPair::new("BTC", "USDT").unwrap();
        let snapshot = convert_depth(
            &pair,
            depth(&[("4.0", "0.00000000"), ("3.9", "1")], &[]),
        )
        .unwrap();
        assert_eq!(snapshot.bids.len(), 1);
        assert_eq!(snapshot.bids[0].price.value(), dec!(3.9));
    }

    #[test]
    fn test_bad_level_is_malformed_response() {
        let pair = CurrencyPair::new("BTC", "USDT").unwrap();
        let err = convert_depth(&pair, depth(&[("abc", "1")], &[])).unwrap_err();
        assert!(matches!(err, ExchangeError::MalformedResponse(_)));
    }

    #[test]
    fn test_symbol_entries() {
        let info: BinanceExchangeInfo = serde_json::from_str(
            r#"{"timezone":"UTC","serverTime":1565246363776,"symbols":[
                {"symbol":"ETHBTC","status":"TRADING","baseAsset":"ETH","quoteAsset":"BTC",
                 "baseAssetPrecision":8,"quotePrecision":8},
                {"symbol":"BNBUSDT","status":"BREAK","baseAsset":"BNB","quoteAsset":"USDT"}
            ]}"#,
        )
        .unwrap();

        let entries = symbol_entries(&info);
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].0, "ETHBTC");
        assert_eq!(entries[0].1, CurrencyPair::new("ETH", "BTC").unwrap());
    }
}
