//! Studyolle: study-group community service.
//!
//! Everything below `web` compiles natively; the Cloudflare Worker entrypoint
//! is only built for `wasm32-unknown-unknown`.

pub mod config;
pub mod crypto;
pub mod error;
pub mod form;
pub mod libsql;
pub mod logging;
pub mod mail;
pub mod service;
pub mod util;
pub mod validator;
pub mod web;

#[cfg(target_arch = "wasm32")]
mod worker_wasm;

#[cfg(target_arch = "wasm32")]
pub use worker_wasm::*;
