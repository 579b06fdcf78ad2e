//! Build script for storefront crate.
//!
//! Computes a content hash of the stylesheet so templates can append it as a
//! cache-busting query string.

use std::env;
use std::fs;
use std::path::Path;

use sha2::{Digest, Sha256};

fn main() {
    hash_css();
}

/// Hash `static/css/main.css` and export it as `CSS_HASH`.
fn hash_css() {
    let Ok(manifest_dir) = env::var("CARGO_MANIFEST_DIR") else {
        println!("cargo:rustc-env=CSS_HASH=dev");
        return;
    };
    let css_path = Path::new(&manifest_dir).join("static/css/main.css");

    println!("cargo:rerun-if-changed={}", css_path.display());

    let Ok(content) = fs::read(&css_path) else {
        println!("cargo:rustc-env=CSS_HASH=dev");
        return;
    };

    let hash = format!("{:x}", Sha256::digest(&content));
    let short_hash = hash.get(..8).unwrap_or("dev");

    println!("cargo:rustc-env=CSS_HASH={short_hash}");
}
