//! Solar irradiance comparison for Benin, Sierra Leone and Togo.
//!
//! ```text
//!   data::loader ──▶ CombinedDataset ──▶ aggregate ──▶ chart ──▶ ChartRenderer
//!        │                 ▲
//!        └─ data::synthetic┘        state::DatasetCache keeps it per session
//! ```

pub mod aggregate;
pub mod chart;
pub mod color;
pub mod config;
pub mod data;
pub mod state;
pub mod ui;
