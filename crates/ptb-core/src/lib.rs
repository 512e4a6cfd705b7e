//! Core domain + application logic for the places bot.
//!
//! This crate is intentionally framework-agnostic. Telegram lives behind the
//! [`messaging::port::Notifier`] port and storage behind the [`store`] ports,
//! both implemented in adapter crates (or the in-crate store adapters).

pub mod bot;
pub mod config;
pub mod domain;
pub mod errors;
pub mod geo;
pub mod logging;
pub mod messaging;
pub mod nearby;
pub mod place;
pub mod places;
pub mod session;
pub mod store;

pub use errors::{Error, Result};
