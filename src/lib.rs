// src/lib.rs

//! Release Tracker Library
//!
//! Keeps a catalog of upcoming set releases, filled in by hand or by reading
//! the publisher's "First Look" announcement pages.

pub mod commands;
pub mod error;
pub mod models;
pub mod pipeline;
pub mod services;
pub mod storage;
pub mod utils;
