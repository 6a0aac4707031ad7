//! Open Food Facts nutrition lookups by barcode or product name.
//!
//! The [`api`] module talks to the remote database, [`worker`] runs one query
//! off the caller's path and [`session`] owns the in-flight task on behalf of
//! a front end.

pub mod api;
pub mod config;
pub mod display;
pub mod models;
pub mod session;
pub mod worker;
