pub mod aggregate;

pub use aggregate::{PriceLevel, Product, ProductId, ProductPrices};
