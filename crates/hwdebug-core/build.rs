//! Build script for hwdebug-core
//!
//! Checks the toolchain before compilation:
//! - Minimum Rust version (let-else and GATs need Rust 1.65.0+)
//! - Target architecture support
//!
//! ## Requirements
//!
//! - **Rust**: 1.65.0 or newer
//! - **Target**: `aarch64` or `x86_64` for a live provider; other targets
//!   still build and can decode recorded snapshots

const SUPPORTED_ARCHES: [&str; 2] = ["aarch64", "x86_64"];

fn main()
{
    println!("cargo:rerun-if-changed=build.rs");

    match rustc_version::version() {
        Ok(found) => {
            let minimum = rustc_version::Version::new(1, 65, 0);
            assert!(
                found >= minimum,
                "hwdebug-core requires Rust {minimum} or newer, found {found}"
            );
        }
        // Some build environments hide the compiler version
        Err(_) => println!("cargo:warning=could not verify Rust version"),
    }

    // The build script runs on the host; the target comes from Cargo.
    let target_arch = std::env::var("CARGO_CFG_TARGET_ARCH").unwrap_or_default();
    if !SUPPORTED_ARCHES.contains(&target_arch.as_str()) {
        println!(
            "cargo:warning=hwdebug-core has no architecture provider for target_arch={target_arch}; \
             ArchProvider::current() will return an error"
        );
    }
}
