//! Feishu (Lark) spreadsheet client.
//!
//! Fetches a cell range from the order spreadsheet and converts it into
//! `OrderRow` records for the reconciliation engine. Handles tenant access
//! token acquisition and first-sheet discovery; cell values may be plain
//! strings, numbers, or rich-text structures.

mod cell;
mod client;
mod error;

pub use cell::{cell_i64, cell_text};
pub use client::{OrderRow, SheetsClient};
pub use error::SheetsError;
