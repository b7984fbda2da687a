pub mod a001_location;
pub mod a002_category;
pub mod a003_supplier;
pub mod a004_product;
pub mod a005_location_stock;
