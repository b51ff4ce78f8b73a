//! Core library for the bookings-sync batch job.
//!
//! A run lists booking-export workbooks on a transfer endpoint, remaps every
//! row into the canonical booking schema, publishes the merged result as CSV
//! and archives the consumed inputs. Transfer backends live under
//! [`transfer`], workbook and CSV adapters under [`io`], the data
//! representations in [`model`], the field rules in [`mapping`] and the run
//! orchestration in [`pipeline`].

pub mod config;
pub mod error;
pub mod io;
pub mod mapping;
pub mod model;
pub mod pipeline;
pub mod transfer;

pub use config::Settings;
pub use error::{Result, ToolError};
pub use pipeline::{Pipeline, RunSummary};
