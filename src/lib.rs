//! atmention composes chat and channel messages that mention users and
//! channels, producing both the rendered content and the structured mention
//! list a Teams-style chat API expects.
//!
//! The crate is organized around a small set of collaborating layers:
//! - [`core`] owns the mention pipeline (validation, label resolution, markup
//!   injection), content rendering, message composition and configuration.
//! - [`api`] defines the wire payloads sent to the chat service.
//! - [`graph`] talks HTTP to the directory and message endpoints.
//! - [`cli`] implements the command-line front end.
//!
//! The binary (`src/main.rs`) routes through [`crate::cli::main`].

pub mod api;
pub mod cli;
pub mod core;
pub mod graph;
pub mod utils;
