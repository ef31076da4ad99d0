//! Persistence implementations

mod postgres;
mod rows;

pub use postgres::{PostgresCatalogSource, like_pattern};
