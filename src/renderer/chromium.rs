//! Chromium-based page driver using chromiumoxide.

use super::{Browser, FrameId, PageDriver};
use crate::config::SessionCookie;
use anyhow::{Context, Result};
use async_trait::async_trait;
use chromiumoxide::browser::BrowserConfig;
use chromiumoxide::cdp::browser_protocol::network::CookieParam;
use chromiumoxide::cdp::browser_protocol::page::{
    CreateIsolatedWorldParams, GetFrameTreeParams,
};
use chromiumoxide::cdp::js_protocol::runtime::EvaluateParams;
use chromiumoxide::page::Page;
use futures::StreamExt;
use std::path::PathBuf;
use std::time::Duration;

/// Find the Chromium binary path.
pub fn find_chromium() -> Option<PathBuf> {
    // 1. LESSONGRAB_CHROMIUM_PATH env
    if let Ok(p) = std::env::var("LESSONGRAB_CHROMIUM_PATH") {
        let path = PathBuf::from(&p);
        if path.exists() {
            return Some(path);
        }
    }

    // 2. ~/.lessongrab/chromium/
    if let Some(home) = dirs::home_dir() {
        let candidates = if cfg!(target_os = "macos") {
            vec![
                home.join(".lessongrab/chromium/chrome-mac-arm64/Google Chrome for Testing.app/Contents/MacOS/Google Chrome for Testing"),
                home.join(".lessongrab/chromium/chrome-mac-x64/Google Chrome for Testing.app/Contents/MacOS/Google Chrome for Testing"),
                home.join(".lessongrab/chromium/chrome"),
            ]
        } else {
            vec![
                home.join(".lessongrab/chromium/chrome-linux64/chrome"),
                home.join(".lessongrab/chromium/chrome"),
            ]
        };
        for c in candidates {
            if c.exists() {
                return Some(c);
            }
        }
    }

    // 3. System PATH
    for name in ["google-chrome", "chromium", "chromium-browser"] {
        if let Ok(path) = which::which(name) {
            return Some(path);
        }
    }

    // 4. Common macOS location
    if cfg!(target_os = "macos") {
        let common = PathBuf::from("/Applications/Google Chrome.app/Contents/MacOS/Google Chrome");
        if common.exists() {
            return Some(common);
        }
    }

    None
}

/// Chromium engine, launched headless.
pub struct ChromiumBrowser {
    browser: chromiumoxide::browser::Browser,
    nav_timeout: Duration,
}

impl ChromiumBrowser {
    /// Launch a headless Chromium instance.
    pub async fn launch(nav_timeout: Duration) -> Result<Self> {
        let chrome_path = find_chromium()
            .context("Chromium not found. Install Chrome/Chromium or set LESSONGRAB_CHROMIUM_PATH.")?;

        let config = BrowserConfig::builder()
            .chrome_executable(chrome_path)
            .arg("--headless=new")
            .arg("--disable-gpu")
            .arg("--no-sandbox")
            .arg("--disable-dev-shm-usage")
            .arg("--disable-extensions")
            .arg("--disable-background-networking")
            .build()
            .map_err(|e| anyhow::anyhow!("failed to build browser config: {e}"))?;

        let (browser, mut handler) = chromiumoxide::browser::Browser::launch(config)
            .await
            .context("failed to launch Chromium")?;

        // Drain CDP events for the life of the browser
        tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                let _ = event;
            }
        });

        Ok(Self {
            browser,
            nav_timeout,
        })
    }
}

#[async_trait]
impl Browser for ChromiumBrowser {
    async fn new_page(&self) -> Result<Box<dyn PageDriver>> {
        let page = self
            .browser
            .new_page("about:blank")
            .await
            .context("failed to create new page")?;

        Ok(Box::new(ChromiumPage {
            page,
            nav_timeout: self.nav_timeout,
        }))
    }

    async fn shutdown(&mut self) {
        let _ = self.browser.close().await;
        let _ = self.browser.wait().await;
    }
}

/// A single Chromium page.
pub struct ChromiumPage {
    page: Page,
    nav_timeout: Duration,
}

fn quote_selector(selector: &str) -> String {
    selector.replace('\\', "\\\\").replace('\'', "\\'")
}

#[async_trait]
impl PageDriver for ChromiumPage {
    async fn add_cookie(&self, cookie: &SessionCookie) -> Result<()> {
        let param = CookieParam::builder()
            .name(cookie.name.clone())
            .value(cookie.value.clone())
            .domain(cookie.domain.clone())
            .path(cookie.path.clone())
            .secure(cookie.secure)
            .build()
            .map_err(|e| anyhow::anyhow!("failed to build cookie: {e}"))?;

        self.page
            .set_cookies(vec![param])
            .await
            .context("failed to set session cookie")?;
        Ok(())
    }

    async fn goto(&self, url: &str) -> Result<()> {
        let result = tokio::time::timeout(self.nav_timeout, self.page.goto(url)).await;
        match result {
            Ok(Ok(_)) => {
                // Initial document is in; dynamic content settles later and is
                // handled by the caller's condition waits.
                let _ = self.page.wait_for_navigation().await;
                Ok(())
            }
            Ok(Err(e)) => Err(anyhow::anyhow!("navigation failed: {e}")),
            Err(_) => Err(anyhow::anyhow!(
                "navigation timed out after {:?}",
                self.nav_timeout
            )),
        }
    }

    async fn has_element(&self, selector: &str) -> Result<bool> {
        let script = format!(
            "document.querySelector('{}') !== null",
            quote_selector(selector)
        );
        let result = self
            .page
            .evaluate(script)
            .await
            .context("selector probe failed")?;
        result
            .into_value()
            .map_err(|e| anyhow::anyhow!("failed to convert probe result: {e:?}"))
    }

    async fn first_frame(&self) -> Result<Option<FrameId>> {
        let resp = self
            .page
            .execute(GetFrameTreeParams::default())
            .await
            .context("failed to read frame tree")?;

        let first = resp
            .result
            .frame_tree
            .child_frames
            .as_ref()
            .and_then(|children| children.first())
            .map(|child| child.frame.id.inner().clone());
        Ok(first)
    }

    async fn frame_script_sources(&self, frame: &FrameId) -> Result<Vec<String>> {
        // Evaluation happens in an isolated world scoped to the frame, so
        // cross-origin frame documents are still readable.
        let world = self
            .page
            .execute(
                CreateIsolatedWorldParams::builder()
                    .frame_id(frame.clone())
                    .build()
                    .map_err(|e| anyhow::anyhow!("failed to build isolated world params: {e}"))?,
            )
            .await
            .context("failed to create isolated world in frame")?;

        let eval = self
            .page
            .execute(
                EvaluateParams::builder()
                    .expression(
                        "Array.from(document.querySelectorAll('script')).map(s => s.src || '')",
                    )
                    .context_id(world.result.execution_context_id)
                    .return_by_value(true)
                    .build()
                    .map_err(|e| anyhow::anyhow!("failed to build evaluate params: {e}"))?,
            )
            .await
            .context("script enumeration failed in frame")?;

        if let Some(details) = &eval.result.exception_details {
            anyhow::bail!("frame evaluation threw: {}", details.text);
        }

        let value = eval
            .result
            .result
            .value
            .clone()
            .unwrap_or(serde_json::Value::Array(Vec::new()));
        let sources: Vec<String> =
            serde_json::from_value(value).context("unexpected script source list shape")?;
        Ok(sources)
    }

    async fn click(&self, selector: &str) -> Result<()> {
        let element = self
            .page
            .find_element(selector)
            .await
            .with_context(|| format!("click target not found: {selector}"))?;
        element
            .click()
            .await
            .with_context(|| format!("click failed: {selector}"))?;
        Ok(())
    }

    async fn close(self: Box<Self>) -> Result<()> {
        let _ = self.page.close().await;
        Ok(())
    }
}
