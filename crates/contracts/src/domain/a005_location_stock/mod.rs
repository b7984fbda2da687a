pub mod aggregate;

pub use aggregate::LocationStock;
