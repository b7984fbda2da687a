//! Общие контракты (DTO и агрегаты) между backend и клиентами

pub mod domain;
pub mod system;
pub mod usecases;
