//! Version details baked in by the build script.

include!(concat!(env!("OUT_DIR"), "/build_info.rs"));

pub const PKG_VERSION: &str = env!("CARGO_PKG_VERSION");

/// One-line version string for `--version`.
pub fn version_line() -> String {
    format!(
        "math-runner {} ({} {})",
        PKG_VERSION, BUILD_DATE, BUILD_COMMIT
    )
}
