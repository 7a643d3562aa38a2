// src/robots/mod.rs
// =============================================================================
// Everything to do with robots.txt itself.
//
// Submodules:
// - fetch: Downloads <target>/robots.txt (or reads a local override)
// - parse: Pulls the Disallow/Allow/Sitemap values out of the file and turns
//          them into paths we can probe
//
// Nothing in here is concurrent. The scanner calls these once per target
// before any worker starts.
// =============================================================================

mod fetch;
mod parse;

pub use fetch::{fetch_robots_txt, read_local_robots, RobotsFetch};
pub use parse::extract_endpoints;
