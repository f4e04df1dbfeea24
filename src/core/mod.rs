pub mod config;
pub mod errors;
pub mod kernel;
pub mod orderbook;
pub mod pair;
pub mod types;
