//! Storage cost estimation

pub mod oracle;

pub use oracle::PriceOracle;
