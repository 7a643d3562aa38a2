// src/report/mod.rs
// =============================================================================
// Output: what the user sees in the terminal and what ends up in -o files.
//
// Submodules:
// - console: Banner, per-target status lines, result tables, progress bar
// - export: The combined text/JSON report written with -o
// =============================================================================

mod console;
mod export;

pub use console::{progress_bar, progress_line, Console};
pub use export::export_results;
