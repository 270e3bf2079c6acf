//! Terminal presentation: tables and chart renderers.

pub mod plot;
pub mod report;
pub mod table;
