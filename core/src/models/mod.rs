pub mod quote;
pub mod state;

pub use quote::{Quantity, Quote};
pub use state::{AlertState, PriceHistory, PriceSample};
