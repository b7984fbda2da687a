pub mod code;
pub mod repository;
