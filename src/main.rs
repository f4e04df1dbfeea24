use orderlink::core::pair::CurrencyPair;
use orderlink::{BinanceClient, ExchangeConfig, OrderbookStore};
use std::sync::Arc;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    // Market data only needs public endpoints
    let config =
        ExchangeConfig::from_env("BINANCE").unwrap_or_else(|_| ExchangeConfig::read_only());
    let client = Arc::new(BinanceClient::new(config)?);
    let store = Arc::new(OrderbookStore::new());

    let pairs: Vec<CurrencyPair> = ["BTC/USDT", "ETH/USDT", "ETH/BTC"]
        .iter()
        .map(|p| p.parse())
        .collect::<Result<_, _>>()?;

    let handles: Vec<_> = pairs
        .iter()
        .cloned()
        .map(|pair| {
            let client = client.clone();
            let store = store.clone();
            tokio::spawn(async move {
                let result = client.update_orderbook(&store, &pair, Some(20)).await;
                (pair, result)
            })
        })
        .collect();

    for handle in handles {
        let (pair, result) = handle.await?;
        match result {
            Ok(book) => {
                let (bid_amount, bid_total) = book.total_bids();
                let (ask_amount, ask_total) = book.total_asks();
                info!(
                    %pair,
                    best_bid = ?book.best_bid().map(|l| l.price.value()),
                    best_ask = ?book.best_ask().map(|l| l.price.value()),
                    %bid_amount, %bid_total, %ask_amount, %ask_total,
                    "orderbook updated"
                );
            }
            Err(e) => warn!(%pair, error = %e, "orderbook update failed"),
        }
    }

    if client.has_credentials() {
        let orders = client.poll_open_orders(10, Some("BTCUSDT")).await?;
        info!(count = orders.len(), "open BTCUSDT orders");
    }

    for (pair, kind) in store.keys() {
        let book = store.get(&pair, &kind)?;
        info!(%pair, book_type = %kind, updated = %book.last_updated, "stored");
    }

    Ok(())
}
