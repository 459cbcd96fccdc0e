//! Feature derivation: calendar encodings and historical lags

pub mod calendar;
pub mod lags;

pub use calendar::add_calendar_features;
pub use lags::{lag_column_name, LagGenerator, LagPolicy};
