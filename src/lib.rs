//! codeassist library crate
//!
//! Exposes the client core so integration tests can drive the HTTP backend
//! and the controller without going through CLI startup.

pub mod app;
pub mod backend;
pub mod browser;
pub mod config;
pub mod controller;
pub mod dispatch;
pub mod error;
pub mod github;
pub mod identity;
pub mod keyring;
pub mod selector;
pub mod session;
pub mod ui;
pub mod util;
pub mod workflow;

#[cfg(test)]
pub mod testing;
