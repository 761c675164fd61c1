//! `lessongrab scrape <manifest>` — walk a course and write its catalog.

use crate::config::{ScrapeConfig, COOKIE_ENV};
use crate::manifest::CourseManifest;
use crate::renderer::chromium::ChromiumBrowser;
use crate::renderer::Browser;
use crate::scraper::Scraper;
use anyhow::{bail, Context, Result};
use std::path::PathBuf;
use std::time::Duration;
use tracing::warn;

/// Options resolved from the command line.
pub struct ScrapeOpts {
    pub manifest: PathBuf,
    pub cookie: Option<String>,
    pub host: String,
    pub out_dir: PathBuf,
    pub player_timeout_secs: u64,
    pub quiet: bool,
}

/// Run the scrape command.
pub async fn run(opts: ScrapeOpts) -> Result<()> {
    let token = resolve_token(opts.cookie)?;

    let manifest = CourseManifest::load(&opts.manifest)?;

    let mut config = ScrapeConfig::new(opts.host, token);
    config.player_timeout = Duration::from_secs(opts.player_timeout_secs);
    config.out_dir = opts.out_dir;

    if !config.out_dir.is_dir() {
        // Not created here; surfaced now so a long run doesn't fail only at
        // the final write.
        warn!(
            "output directory {} does not exist; the catalog write will fail",
            config.out_dir.display()
        );
    }

    let mut browser = ChromiumBrowser::launch(config.nav_timeout).await?;
    let page = browser.new_page().await?;

    let scraper = Scraper::new(config.clone());
    let result = scraper.run(&manifest, page.as_ref()).await;

    // Teardown before reporting: the browser dies regardless of how the
    // run went.
    let _ = page.close().await;
    browser.shutdown().await;

    let catalog = result?;
    let path = catalog
        .write_to(&config.out_dir)
        .context("scrape finished but the catalog could not be written")?;

    if !opts.quiet {
        println!(
            "{} of {} lessons captured -> {}",
            catalog.item_count,
            manifest.contents.len(),
            path.display()
        );
    }

    Ok(())
}

/// The session token: `--cookie` wins, then the environment.
fn resolve_token(flag: Option<String>) -> Result<String> {
    if let Some(token) = flag {
        if token.is_empty() {
            bail!("--cookie is empty");
        }
        return Ok(token);
    }
    match std::env::var(COOKIE_ENV) {
        Ok(token) if !token.is_empty() => Ok(token),
        _ => bail!("no session token: pass --cookie or set {COOKIE_ENV}"),
    }
}
