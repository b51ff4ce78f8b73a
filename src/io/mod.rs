//! Adapters between raw file payloads and the in-memory tables.

pub mod csv_write;
pub mod excel_read;
