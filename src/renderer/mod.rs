//! Browser abstraction for driving lesson pages.
//!
//! Defines the `Browser` and `PageDriver` traits that abstract over the
//! engine (currently Chromium via chromiumoxide), so the scrape loop can be
//! exercised against a scripted in-memory driver in tests.

pub mod chromium;

use crate::config::SessionCookie;
use anyhow::Result;
use async_trait::async_trait;

/// Opaque frame handle, valid for the page's current document.
pub type FrameId = String;

/// A browser engine that can open pages.
#[async_trait]
pub trait Browser: Send + Sync {
    /// Open a new page (tab).
    async fn new_page(&self) -> Result<Box<dyn PageDriver>>;
    /// Shut down the engine. Best-effort; failures are swallowed.
    async fn shutdown(&mut self);
}

/// One browser page, navigated in place across lessons.
///
/// Probes (`has_element`, `first_frame`, `frame_script_sources`) report the
/// DOM as it is right now; any waiting/polling policy lives in the caller.
#[async_trait]
pub trait PageDriver: Send + Sync {
    /// Install the session cookie. Must happen before the first navigation.
    async fn add_cookie(&self, cookie: &SessionCookie) -> Result<()>;
    /// Navigate, resolving once the initial document has loaded.
    async fn goto(&self, url: &str) -> Result<()>;
    /// Whether an element matching `selector` currently exists.
    async fn has_element(&self, selector: &str) -> Result<bool>;
    /// The first inline frame on the page, if any.
    async fn first_frame(&self) -> Result<Option<FrameId>>;
    /// `src` of every `<script>` inside the frame's document, in DOM order.
    async fn frame_script_sources(&self, frame: &FrameId) -> Result<Vec<String>>;
    /// Dispatch a click on the first element matching `selector`.
    async fn click(&self, selector: &str) -> Result<()>;
    /// Close the page.
    async fn close(self: Box<Self>) -> Result<()>;
}
