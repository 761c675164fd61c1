//! Environment readiness check.

use crate::config::COOKIE_ENV;
use crate::renderer::chromium::find_chromium;
use anyhow::Result;
use std::path::Path;

/// Check Chromium availability, the output directory, and the session token.
pub async fn run(out_dir: &Path) -> Result<()> {
    println!("lessongrab doctor");
    println!("=================");
    println!();

    let os = std::env::consts::OS;
    let arch = std::env::consts::ARCH;
    println!("OS:   {os}");
    println!("Arch: {arch}");
    println!();

    // Check Chromium
    let chromium_path = find_chromium();
    match &chromium_path {
        Some(path) => println!("[OK] Chromium found: {}", path.display()),
        None => println!(
            "[!!] Chromium NOT found. Install Chrome/Chromium or set LESSONGRAB_CHROMIUM_PATH."
        ),
    }

    // Check output directory (the scraper refuses to create it)
    if out_dir.is_dir() {
        println!("[OK] Output directory exists: {}", out_dir.display());
    } else {
        println!(
            "[!!] Output directory does not exist: {} (create it before scraping)",
            out_dir.display()
        );
    }

    // Check session token
    if std::env::var(COOKIE_ENV).map(|v| !v.is_empty()).unwrap_or(false) {
        println!("[OK] {COOKIE_ENV} is set");
    } else {
        println!("[??] {COOKIE_ENV} not set (pass --cookie instead)");
    }

    println!();
    if chromium_path.is_some() && out_dir.is_dir() {
        println!("Status: READY");
    } else {
        println!("Status: NOT READY");
    }

    Ok(())
}
