//! The per-lesson scrape-and-accumulate loop.
//!
//! One page, navigated in place through every lesson in manifest order. Each
//! lesson either yields a [`MediaEntry`] or a logged skip; nothing a single
//! lesson does can abort the run.

use crate::catalog::{MediaCatalog, MediaEntry};
use crate::config::ScrapeConfig;
use crate::manifest::CourseManifest;
use crate::media;
use crate::renderer::{FrameId, PageDriver};
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info, warn};

/// How often DOM conditions are re-probed while waiting.
const POLL_INTERVAL: Duration = Duration::from_millis(250);

/// Why a lesson produced no media entry.
#[derive(Debug, Error)]
pub enum SkipReason {
    /// The page never grew a `<script>` element before the deadline.
    #[error("no script element appeared within {0:?}")]
    NoScriptTag(Duration),
    /// The lesson page has no inline frame (typical for text-only lessons,
    /// or for every lesson when the session cookie is stale).
    #[error("no iframe found")]
    NoFrame,
    /// The frame exists but never exposed a player script.
    #[error("no player script matched within {0:?}")]
    NoPlayerScript(Duration),
    /// Navigation or evaluation failed outright.
    #[error(transparent)]
    Page(#[from] anyhow::Error),
}

/// Per-lesson outcome, before accumulation.
enum LessonOutcome {
    /// Player script found; frame was present.
    Captured(String),
    /// Frame was present but no player script matched before the deadline.
    FrameWithoutPlayer(Duration),
}

/// Runs the scrape loop for one course.
pub struct Scraper {
    config: ScrapeConfig,
}

impl Scraper {
    pub fn new(config: ScrapeConfig) -> Self {
        Self { config }
    }

    /// Visit every lesson and accumulate captured media ids into a catalog.
    ///
    /// The page is expected to be fresh; the session cookie is installed here
    /// before the first navigation. Per-lesson failures are logged and
    /// skipped; only cookie installation errors propagate.
    pub async fn run(
        &self,
        manifest: &CourseManifest,
        page: &dyn PageDriver,
    ) -> anyhow::Result<MediaCatalog> {
        page.add_cookie(&self.config.cookie).await?;

        let total = manifest.contents.len();
        info!(course = %manifest.course.slug, lessons = total, "starting scrape");

        let mut items: Vec<MediaEntry> = Vec::new();

        for (index, lesson) in manifest.contents.iter().enumerate() {
            let url = self.config.lesson_url(&manifest.course.slug, &lesson.slug);
            debug!(lesson = %lesson.slug, index, "visiting {url}");

            match self.scrape_lesson(page, &url).await {
                Ok(outcome) => {
                    match outcome {
                        LessonOutcome::Captured(media_id) => {
                            info!(index, media_id = %media_id, "captured {}", lesson.name);
                            items.push(MediaEntry::new(index, media_id, &lesson.name));
                        }
                        LessonOutcome::FrameWithoutPlayer(deadline) => {
                            warn!(index, "skipping {url}: {}", SkipReason::NoPlayerScript(deadline));
                        }
                    }
                    // The record (if any) is already accumulated; a missing or
                    // broken continue button must not take it back.
                    if let Err(e) = page.click(&self.config.continue_selector).await {
                        warn!(index, "continue click failed on {url}: {e:#}");
                    }
                }
                Err(reason) => {
                    warn!(index, "skipping {url}: {reason:#}");
                }
            }
        }

        info!(
            captured = items.len(),
            skipped = total - items.len(),
            "scrape finished"
        );
        Ok(MediaCatalog::new(manifest.course.name.clone(), items))
    }

    /// Steps 2-6 for one lesson: navigate, wait for the DOM to produce a
    /// script tag, locate the frame, read the player script inside it.
    async fn scrape_lesson(
        &self,
        page: &dyn PageDriver,
        url: &str,
    ) -> Result<LessonOutcome, SkipReason> {
        page.goto(url).await?;

        self.wait_for_script_tag(page).await?;

        let frame = self.wait_for_frame(page).await?;

        match self.wait_for_player_script(page, &frame).await? {
            Some(media_id) => Ok(LessonOutcome::Captured(media_id)),
            None => Ok(LessonOutcome::FrameWithoutPlayer(self.config.player_timeout)),
        }
    }

    /// Bounded wait for any `<script>` element on the page.
    async fn wait_for_script_tag(&self, page: &dyn PageDriver) -> Result<(), SkipReason> {
        let deadline = tokio::time::Instant::now() + self.config.script_timeout;
        loop {
            if page.has_element("script").await? {
                return Ok(());
            }
            if tokio::time::Instant::now() >= deadline {
                return Err(SkipReason::NoScriptTag(self.config.script_timeout));
            }
            tokio::time::sleep(POLL_INTERVAL).await;
        }
    }

    /// Bounded wait for the lesson's inline frame.
    async fn wait_for_frame(&self, page: &dyn PageDriver) -> Result<FrameId, SkipReason> {
        let deadline = tokio::time::Instant::now() + self.config.player_timeout;
        loop {
            if let Some(frame) = page.first_frame().await? {
                return Ok(frame);
            }
            if tokio::time::Instant::now() >= deadline {
                return Err(SkipReason::NoFrame);
            }
            tokio::time::sleep(POLL_INTERVAL).await;
        }
    }

    /// Bounded wait for a player script inside the frame. `None` means the
    /// deadline passed with the frame present but playerless.
    async fn wait_for_player_script(
        &self,
        page: &dyn PageDriver,
        frame: &FrameId,
    ) -> Result<Option<String>, SkipReason> {
        let deadline = tokio::time::Instant::now() + self.config.player_timeout;
        loop {
            let sources = page.frame_script_sources(frame).await?;
            let mut ids = media::media_ids(&sources, &self.config.player_prefix);
            if !ids.is_empty() {
                return Ok(Some(ids.remove(0)));
            }
            if tokio::time::Instant::now() >= deadline {
                return Ok(None);
            }
            tokio::time::sleep(POLL_INTERVAL).await;
        }
    }
}
