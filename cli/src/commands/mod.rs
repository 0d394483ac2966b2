pub mod browse;
pub mod catalog;
pub mod classify;
pub mod drill;
