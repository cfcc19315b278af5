//! Reduces fetched rows into dashboard and profit/loss figures.

pub mod aggregate;
pub mod statement;
pub mod trend;

#[cfg(test)]
pub(crate) mod fixtures;
