//! autoserv — service records and revenue analytics for an auto workshop.
//!
//! Records are read from a Firebase Realtime Database tree
//! (`services/{vehicle}/{key}`), normalized into one canonical schema and
//! turned into monthly revenue, part rankings, daily summaries and per-year
//! views. The same views back the CLI reports and the web dashboard.

pub mod analytics;
pub mod cli;
pub mod config;
pub mod logging;
pub mod records;
pub mod store;
pub mod web;
