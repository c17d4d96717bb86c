//! TUI Apples (workspace facade crate).
//!
//! Re-exports `tui_apples::{core,adapter,term,input,types}` so the binary,
//! integration tests and benches share one import path while the
//! implementation lives in dedicated crates under `crates/`.

pub use tui_apples_adapter as adapter;
pub use tui_apples_core as core;
pub use tui_apples_input as input;
pub use tui_apples_term as term;
pub use tui_apples_types as types;
