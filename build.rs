//! Build script for GlyTrack
//!
//! Embeds a rebuild counter, the build time and the cargo profile. The
//! counter is kept in OUT_DIR, so building never writes into the source tree.

use std::env;
use std::fs;
use std::path::Path;

fn next_build_number(out_dir: &Path) -> u64 {
    let path = out_dir.join("build_number");
    let previous: u64 = fs::read_to_string(&path)
        .ok()
        .and_then(|s| s.trim().parse().ok())
        .unwrap_or(0);
    let next = previous + 1;

    if let Err(e) = fs::write(&path, next.to_string()) {
        println!("cargo:warning=could not persist build number in {}: {}", path.display(), e);
    }
    next
}

fn main() {
    println!("cargo:rerun-if-changed=src");
    println!("cargo:rerun-if-changed=build.rs");

    let build_number = env::var_os("OUT_DIR")
        .map(|dir| next_build_number(Path::new(&dir)))
        .unwrap_or(0);
    let timestamp = chrono::Utc::now().format("%Y-%m-%dT%H:%M:%SZ").to_string();
    let profile = env::var("PROFILE").unwrap_or_else(|_| "unknown".to_string());

    println!("cargo:rustc-env=GLYTRACK_BUILD_NUMBER={}", build_number);
    println!("cargo:rustc-env=GLYTRACK_BUILD_TIMESTAMP={}", timestamp);
    println!("cargo:rustc-env=GLYTRACK_BUILD_PROFILE={}", profile);
}
