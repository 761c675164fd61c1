//! Run-scoped configuration.
//!
//! Everything a run needs (credential, target host, selectors, timeouts,
//! output location) travels in one explicit [`ScrapeConfig`] value threaded
//! into the scraper, never in module-level state.

use std::path::PathBuf;
use std::time::Duration;

/// Cookie name the platform uses for its persistent login session.
pub const SESSION_COOKIE_NAME: &str = "remember_user_token";

/// Env var consulted for the session token when `--cookie` is not given.
pub const COOKIE_ENV: &str = "LESSONGRAB_COOKIE";

/// Default platform host.
pub const DEFAULT_HOST: &str = "courses.ardanlabs.com";

/// Script sources under this prefix are the embedded player.
pub const DEFAULT_PLAYER_PREFIX: &str = "https://fast.wistia.com/embed/medias/";

/// The platform's "complete and continue" button.
pub const DEFAULT_CONTINUE_SELECTOR: &str = r#"[data-qa="complete-continue__btn"]"#;

/// The authentication cookie injected into the browser session.
#[derive(Debug, Clone)]
pub struct SessionCookie {
    pub name: String,
    pub value: String,
    pub domain: String,
    pub path: String,
    pub secure: bool,
}

impl SessionCookie {
    /// The platform session cookie for `host` with the given token value.
    pub fn for_host(host: &str, value: impl Into<String>) -> Self {
        Self {
            name: SESSION_COOKIE_NAME.to_string(),
            value: value.into(),
            domain: host.to_string(),
            path: "/".to_string(),
            secure: true,
        }
    }
}

/// Configuration for one scrape run.
#[derive(Debug, Clone)]
pub struct ScrapeConfig {
    /// Platform host serving the course pages.
    pub host: String,
    /// Session credential granting access to gated lessons.
    pub cookie: SessionCookie,
    /// Script `src` prefix identifying the embedded player.
    pub player_prefix: String,
    /// Selector for the lesson-completion control clicked after each lesson.
    pub continue_selector: String,
    /// Per-navigation deadline.
    pub nav_timeout: Duration,
    /// Deadline for the page to produce its first `<script>` element.
    pub script_timeout: Duration,
    /// Deadline for the lesson iframe and its player script to appear.
    pub player_timeout: Duration,
    /// Directory the catalog is written into. Must already exist.
    pub out_dir: PathBuf,
}

impl ScrapeConfig {
    /// Config for `host` with the given session token and all defaults.
    pub fn new(host: impl Into<String>, token: impl Into<String>) -> Self {
        let host = host.into();
        let cookie = SessionCookie::for_host(&host, token);
        Self {
            host,
            cookie,
            player_prefix: DEFAULT_PLAYER_PREFIX.to_string(),
            continue_selector: DEFAULT_CONTINUE_SELECTOR.to_string(),
            nav_timeout: Duration::from_secs(30),
            script_timeout: Duration::from_secs(30),
            player_timeout: Duration::from_secs(10),
            out_dir: PathBuf::from("./jsons"),
        }
    }

    /// Lesson page URL: course slug first, then lesson slug.
    pub fn lesson_url(&self, course_slug: &str, lesson_slug: &str) -> String {
        format!(
            "https://{}/courses/take/{}/lessons/{}",
            self.host, course_slug, lesson_slug
        )
    }
}
