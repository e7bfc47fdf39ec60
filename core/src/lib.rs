pub mod models;

pub use models::{AlertState, PriceHistory, PriceSample, Quantity, Quote};
