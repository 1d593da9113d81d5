//! Deterministic helper services backing the tool set

pub mod currency;
pub mod time;
pub mod weather;

pub use currency::ExchangeClient;
pub use weather::WeatherClient;
