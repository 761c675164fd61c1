//! Scrape-loop behavior against a scripted in-memory page driver.

use anyhow::{bail, Result};
use async_trait::async_trait;
use lessongrab::config::{ScrapeConfig, SessionCookie};
use lessongrab::manifest::{Course, CourseManifest, Lesson};
use lessongrab::renderer::{FrameId, PageDriver};
use lessongrab::scraper::Scraper;
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

const WISTIA: &str = "https://fast.wistia.com/embed/medias/";

/// What one lesson page looks like to the driver.
#[derive(Default, Clone)]
struct PageScript {
    goto_error: Option<String>,
    /// `None` = no iframe on the page.
    frame_sources: Option<Vec<String>>,
    eval_error: Option<String>,
    click_fails: bool,
}

/// A page driver that replays scripted lesson pages.
struct ScriptedPage {
    pages: HashMap<String, PageScript>,
    current: Mutex<Option<String>>,
    cookie: Mutex<Option<SessionCookie>>,
    navigations_before_cookie: Mutex<usize>,
    clicks: Mutex<Vec<(String, String)>>,
}

impl ScriptedPage {
    fn new(pages: HashMap<String, PageScript>) -> Self {
        Self {
            pages,
            current: Mutex::new(None),
            cookie: Mutex::new(None),
            navigations_before_cookie: Mutex::new(0),
            clicks: Mutex::new(Vec::new()),
        }
    }

    fn current_script(&self) -> PageScript {
        let current = self.current.lock().unwrap();
        let url = current.as_ref().expect("no page loaded");
        self.pages[url].clone()
    }

    fn clicked_urls(&self) -> Vec<String> {
        self.clicks.lock().unwrap().iter().map(|(url, _)| url.clone()).collect()
    }
}

#[async_trait]
impl PageDriver for ScriptedPage {
    async fn add_cookie(&self, cookie: &SessionCookie) -> Result<()> {
        *self.cookie.lock().unwrap() = Some(cookie.clone());
        Ok(())
    }

    async fn goto(&self, url: &str) -> Result<()> {
        if self.cookie.lock().unwrap().is_none() {
            *self.navigations_before_cookie.lock().unwrap() += 1;
        }
        let script = match self.pages.get(url) {
            Some(script) => script,
            None => bail!("net::ERR_NAME_NOT_RESOLVED: {url}"),
        };
        if let Some(msg) = &script.goto_error {
            bail!("{msg}");
        }
        *self.current.lock().unwrap() = Some(url.to_string());
        Ok(())
    }

    async fn has_element(&self, selector: &str) -> Result<bool> {
        assert_eq!(selector, "script");
        Ok(true)
    }

    async fn first_frame(&self) -> Result<Option<FrameId>> {
        Ok(self
            .current_script()
            .frame_sources
            .map(|_| "frame-0".to_string()))
    }

    async fn frame_script_sources(&self, _frame: &FrameId) -> Result<Vec<String>> {
        let script = self.current_script();
        if let Some(msg) = script.eval_error {
            bail!("{msg}");
        }
        Ok(script.frame_sources.unwrap_or_default())
    }

    async fn click(&self, selector: &str) -> Result<()> {
        let current = self.current.lock().unwrap().clone().expect("no page loaded");
        self.clicks
            .lock()
            .unwrap()
            .push((current, selector.to_string()));
        if self.current_script().click_fails {
            bail!("click target not found: {selector}");
        }
        Ok(())
    }

    async fn close(self: Box<Self>) -> Result<()> {
        Ok(())
    }
}

fn test_config() -> ScrapeConfig {
    let mut config = ScrapeConfig::new("courses.test", "token-123");
    // Single-shot polls: probe once, then the deadline has already passed
    config.script_timeout = Duration::from_millis(0);
    config.player_timeout = Duration::from_millis(0);
    config
}

fn manifest(lessons: &[(&str, &str)]) -> CourseManifest {
    CourseManifest {
        course: Course {
            slug: "ultimate-go".to_string(),
            name: "Ultimate Go".to_string(),
        },
        contents: lessons
            .iter()
            .map(|(slug, name)| Lesson {
                slug: slug.to_string(),
                name: name.to_string(),
            })
            .collect(),
    }
}

fn lesson_url(config: &ScrapeConfig, lesson_slug: &str) -> String {
    config.lesson_url("ultimate-go", lesson_slug)
}

fn player(id: &str) -> Vec<String> {
    vec![
        "https://courses.test/packs/player-shell.js".to_string(),
        format!("{WISTIA}{id}.jsonp"),
    ]
}

#[tokio::test]
async fn skipped_lesson_leaves_a_gap_in_indices() {
    let config = test_config();
    let manifest = manifest(&[("l1", "Intro"), ("l2", "Reading"), ("l3", "Pointers")]);

    let mut pages = HashMap::new();
    pages.insert(
        lesson_url(&config, "l1"),
        PageScript { frame_sources: Some(player("aaa111")), ..Default::default() },
    );
    // Text-only lesson: no iframe at all
    pages.insert(lesson_url(&config, "l2"), PageScript::default());
    pages.insert(
        lesson_url(&config, "l3"),
        PageScript { frame_sources: Some(player("ccc333")), ..Default::default() },
    );

    let page = ScriptedPage::new(pages);
    let catalog = Scraper::new(config.clone())
        .run(&manifest, &page)
        .await
        .unwrap();

    assert_eq!(catalog.name, "Ultimate Go");
    assert_eq!(catalog.item_count, 2);
    assert_eq!(catalog.items.len(), 2);
    assert_eq!(catalog.items[0].index, 0);
    assert_eq!(catalog.items[0].media_id, "aaa111");
    assert_eq!(catalog.items[0].label, "0_Intro");
    assert_eq!(catalog.items[1].index, 2);
    assert_eq!(catalog.items[1].media_id, "ccc333");
    assert_eq!(catalog.items[1].label, "2_Pointers");

    // No continue click on the frameless lesson
    assert_eq!(
        page.clicked_urls(),
        vec![lesson_url(&config, "l1"), lesson_url(&config, "l3")]
    );
    assert!(page
        .clicks
        .lock()
        .unwrap()
        .iter()
        .all(|(_, selector)| selector == r#"[data-qa="complete-continue__btn"]"#));
}

#[tokio::test]
async fn evaluation_error_skips_only_that_lesson() {
    let config = test_config();
    let manifest = manifest(&[("l1", "Intro"), ("l2", "Broken"), ("l3", "Pointers")]);

    let mut pages = HashMap::new();
    pages.insert(
        lesson_url(&config, "l1"),
        PageScript { frame_sources: Some(player("aaa111")), ..Default::default() },
    );
    pages.insert(
        lesson_url(&config, "l2"),
        PageScript {
            frame_sources: Some(Vec::new()),
            eval_error: Some("Execution context was destroyed".to_string()),
            ..Default::default()
        },
    );
    pages.insert(
        lesson_url(&config, "l3"),
        PageScript { frame_sources: Some(player("ccc333")), ..Default::default() },
    );

    let catalog = Scraper::new(config)
        .run(&manifest, &ScriptedPage::new(pages))
        .await
        .unwrap();

    assert_eq!(catalog.item_count, 2);
    assert_eq!(catalog.items[0].index, 0);
    assert_eq!(catalog.items[1].index, 2);
}

#[tokio::test]
async fn navigation_error_skips_only_that_lesson() {
    let config = test_config();
    let manifest = manifest(&[("l1", "Intro"), ("l2", "Gone")]);

    let mut pages = HashMap::new();
    pages.insert(
        lesson_url(&config, "l1"),
        PageScript { frame_sources: Some(player("aaa111")), ..Default::default() },
    );
    pages.insert(
        lesson_url(&config, "l2"),
        PageScript {
            goto_error: Some("net::ERR_CONNECTION_RESET".to_string()),
            ..Default::default()
        },
    );

    let page = ScriptedPage::new(pages);
    let catalog = Scraper::new(config.clone())
        .run(&manifest, &page)
        .await
        .unwrap();

    assert_eq!(catalog.item_count, 1);
    assert_eq!(catalog.items[0].index, 0);
    // Failed navigation never reaches the continue button
    assert_eq!(page.clicked_urls(), vec![lesson_url(&config, "l1")]);
}

#[tokio::test]
async fn frame_without_player_script_clicks_but_records_nothing() {
    let config = test_config();
    let manifest = manifest(&[("l1", "Quiz")]);

    let mut pages = HashMap::new();
    pages.insert(
        lesson_url(&config, "l1"),
        PageScript {
            // Frame exists, but only platform chrome inside
            frame_sources: Some(vec!["https://courses.test/packs/quiz.js".to_string()]),
            ..Default::default()
        },
    );

    let page = ScriptedPage::new(pages);
    let catalog = Scraper::new(config.clone())
        .run(&manifest, &page)
        .await
        .unwrap();

    assert_eq!(catalog.item_count, 0);
    assert!(catalog.items.is_empty());
    // The lesson still advances platform-side
    assert_eq!(page.clicked_urls(), vec![lesson_url(&config, "l1")]);
}

#[tokio::test]
async fn failed_continue_click_keeps_the_record() {
    let config = test_config();
    let manifest = manifest(&[("l1", "Intro")]);

    let mut pages = HashMap::new();
    pages.insert(
        lesson_url(&config, "l1"),
        PageScript {
            frame_sources: Some(player("aaa111")),
            click_fails: true,
            ..Default::default()
        },
    );

    let catalog = Scraper::new(config)
        .run(&manifest, &ScriptedPage::new(pages))
        .await
        .unwrap();

    assert_eq!(catalog.item_count, 1);
    assert_eq!(catalog.items[0].media_id, "aaa111");
}

#[tokio::test]
async fn first_matching_script_wins() {
    let config = test_config();
    let manifest = manifest(&[("l1", "Intro")]);

    let mut pages = HashMap::new();
    pages.insert(
        lesson_url(&config, "l1"),
        PageScript {
            frame_sources: Some(vec![
                // Same path shape on a foreign host must not be picked
                "https://cdn.example.com/embed/medias/decoy.jsonp".to_string(),
                format!("{WISTIA}first1.jsonp"),
                format!("{WISTIA}second2.jsonp"),
            ]),
            ..Default::default()
        },
    );

    let catalog = Scraper::new(config)
        .run(&manifest, &ScriptedPage::new(pages))
        .await
        .unwrap();

    assert_eq!(catalog.item_count, 1);
    assert_eq!(catalog.items[0].media_id, "first1");
}

#[tokio::test]
async fn cookie_is_installed_before_first_navigation() {
    let config = test_config();
    let manifest = manifest(&[("l1", "Intro")]);

    let mut pages = HashMap::new();
    pages.insert(
        lesson_url(&config, "l1"),
        PageScript { frame_sources: Some(player("aaa111")), ..Default::default() },
    );

    let page = ScriptedPage::new(pages);
    Scraper::new(config).run(&manifest, &page).await.unwrap();

    assert_eq!(*page.navigations_before_cookie.lock().unwrap(), 0);
    let cookie = page.cookie.lock().unwrap().clone().unwrap();
    assert_eq!(cookie.name, "remember_user_token");
    assert_eq!(cookie.domain, "courses.test");
    assert!(cookie.secure);
}

#[tokio::test]
async fn catalog_written_at_end_of_run_round_trips() {
    let config = test_config();
    let manifest = manifest(&[("l1", "Intro"), ("l2", "Pointers")]);

    let mut pages = HashMap::new();
    pages.insert(
        lesson_url(&config, "l1"),
        PageScript { frame_sources: Some(player("aaa111")), ..Default::default() },
    );
    pages.insert(
        lesson_url(&config, "l2"),
        PageScript { frame_sources: Some(player("bbb222")), ..Default::default() },
    );

    let catalog = Scraper::new(config)
        .run(&manifest, &ScriptedPage::new(pages))
        .await
        .unwrap();

    let dir = tempfile::tempdir().unwrap();
    let path = catalog.write_to(dir.path()).unwrap();
    assert!(path.ends_with("Ultimate Go.json"));

    let parsed: lessongrab::catalog::MediaCatalog =
        serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(parsed, catalog);
    assert_eq!(parsed.item_count, parsed.items.len());
}
