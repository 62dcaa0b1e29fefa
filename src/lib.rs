//! This crate relays daily task completion flags between HTTP clients and a Google Sheets spreadsheet.
//!
//! The spreadsheet is laid out as a table: the header row names the tasks, and every other row holds the flags of one day,
//! with the date in its first column.
//!
//! The core logic is split in three small pieces: locating the row of a date (in the [`grid`] module),
//! reading a row into a map of task states (in the [`task`] module), and planning the cell updates that write such a map back (in the [`update`] module). \
//! The spreadsheet service itself is abstracted behind the [`SheetGateway`](traits::SheetGateway) trait, that is implemented by the [`SheetsClient`](client::SheetsClient). \
//! The [`server`] module exposes all of this over HTTP.

pub mod traits;

pub mod grid;
pub use grid::{DateKey, Grid};
pub mod task;
pub use task::TaskStates;
pub mod update;
pub use update::UpdateInstruction;

pub mod credentials;
pub mod client;
pub use client::SheetsClient;

pub mod config;
pub mod error;
pub use error::RelayError;
pub mod server;
