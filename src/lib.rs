//! Source-level debugger for programs running on a stack-based virtual machine.
//!
//! The [`debugger`] module holds the execution controller, which drives a
//! [`vm::Machine`] one source line at a time using the address-to-line
//! mapping in [`parser::DebugInfo`] and stops on breakpoints.

pub mod config;
pub mod debugger;
pub mod error;
pub mod executor;
pub mod parser;
pub mod ui;
pub mod vm;

pub use error::{Error, Result};
