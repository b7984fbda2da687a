pub mod aggregate;

pub use aggregate::{Location, LocationId, LocationKind};
