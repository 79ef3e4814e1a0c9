// src/lib.rs

//! Builds a monthly macro feature panel for Swedish inflation forecasting from
//! published spreadsheets: CPIF components, wages, household inflation
//! expectations, business price plans and Nord Pool electricity prices.

pub mod config;
pub mod error;
pub mod frame;
pub mod grid;
pub mod panel;
pub mod pipeline;
pub mod process;
pub mod sources;
pub mod transform;

pub use config::PanelConfig;
pub use error::{ExtractError, ExtractResult};
pub use pipeline::Pipeline;
