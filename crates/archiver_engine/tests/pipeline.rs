//! End-to-end pipeline behavior against a scripted fake renderer session.

use std::collections::HashMap;
use std::sync::{Mutex, Once};
use std::time::Duration;

use async_trait::async_trait;
use pretty_assertions::assert_eq;
use serde_json::{json, Value};

use archiver_engine::{
    analyze_page, archive_page, capture, reveal_page, ArchiveError, ArchiveSettings, Progress,
    ProgressSink, RendererSession, ScrollSettings, Stage, DEFAULT_TITLE,
};

fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(engine_logging::initialize_for_tests);
}

/// Scroll settings with all pauses zeroed so tests run instantly.
fn fast_scroll() -> ScrollSettings {
    ScrollSettings {
        initial_pause: Duration::ZERO,
        bottom_pause: Duration::ZERO,
        midpoint_pause: Duration::ZERO,
        top_pause: Duration::ZERO,
        post_expand_pause: Duration::ZERO,
        ..ScrollSettings::default()
    }
}

#[derive(Default)]
struct FakeState {
    url: String,
    title: String,
    html: String,
    text: String,
    heights: Vec<i64>,
    height_reads: usize,
    scroll_commands: Vec<String>,
    expand_runs: usize,
    expand_fails: bool,
    body_missing: bool,
    counts: HashMap<&'static str, usize>,
}

struct FakeSession {
    state: Mutex<FakeState>,
}

impl FakeSession {
    fn new(title: &str, html: &str, text: &str, heights: Vec<i64>) -> Self {
        Self {
            state: Mutex::new(FakeState {
                title: title.to_string(),
                html: html.to_string(),
                text: text.to_string(),
                heights,
                ..FakeState::default()
            }),
        }
    }

    fn with<T>(&self, f: impl FnOnce(&mut FakeState) -> T) -> T {
        f(&mut self.state.lock().expect("fake state"))
    }
}

#[async_trait]
impl RendererSession for FakeSession {
    async fn navigate(&self, url: &str) -> Result<(), ArchiveError> {
        self.with(|st| st.url = url.to_string());
        Ok(())
    }

    async fn wait_for_body(&self) -> Result<(), ArchiveError> {
        if self.with(|st| st.body_missing) {
            return Err(ArchiveError::ReadinessTimeout(Duration::from_secs(15)));
        }
        Ok(())
    }

    async fn execute(&self, script: &str, _args: Vec<Value>) -> Result<Value, ArchiveError> {
        self.with(|st| {
            if script.contains("return document.body.scrollHeight") {
                let idx = st.height_reads.min(st.heights.len().saturating_sub(1));
                st.height_reads += 1;
                Ok(json!(st.heights.get(idx).copied().unwrap_or(0)))
            } else if script.contains("scrollTo") {
                st.scroll_commands.push(script.trim().to_string());
                Ok(Value::Null)
            } else {
                st.expand_runs += 1;
                if st.expand_fails {
                    Err(ArchiveError::SessionStartup(
                        "javascript error: click is not a function".into(),
                    ))
                } else {
                    Ok(Value::Null)
                }
            }
        })
    }

    async fn count_elements(&self, selector: &str) -> Result<usize, ArchiveError> {
        Ok(self.with(|st| st.counts.get(selector).copied().unwrap_or(0)))
    }

    async fn page_source(&self) -> Result<String, ArchiveError> {
        Ok(self.with(|st| st.html.clone()))
    }

    async fn visible_text(&self) -> Result<String, ArchiveError> {
        Ok(self.with(|st| st.text.clone()))
    }

    async fn current_url(&self) -> Result<String, ArchiveError> {
        Ok(self.with(|st| st.url.clone()))
    }

    async fn title(&self) -> Result<String, ArchiveError> {
        Ok(self.with(|st| st.title.clone()))
    }
}

#[derive(Default)]
struct CollectingSink {
    events: Mutex<Vec<Progress>>,
}

impl CollectingSink {
    fn stages(&self) -> Vec<Stage> {
        self.events
            .lock()
            .expect("events")
            .iter()
            .map(|p| p.stage)
            .collect()
    }
}

impl ProgressSink for CollectingSink {
    fn emit(&self, progress: Progress) {
        self.events.lock().expect("events").push(progress);
    }
}

#[tokio::test]
async fn stable_page_settles_after_the_iteration_floor() {
    init_logging();
    let session = FakeSession::new("t", "<body></body>", "", vec![2000; 16]);
    let sink = CollectingSink::default();

    let revelation = reveal_page(&session, &fast_scroll(), &sink)
        .await
        .expect("reveal");

    assert!(revelation.settled);
    assert!(revelation.fully_revealed);
    // The floor keeps the loop alive through one extra confirming pass.
    assert_eq!(revelation.iterations, 5);
    assert!((4..=10).contains(&revelation.iterations));
    // Each pass scrolls bottom then midpoint; one final scroll to top.
    let scrolls = session.with(|st| st.scroll_commands.clone());
    assert_eq!(scrolls.len(), revelation.iterations * 2 + 1);
    assert!(scrolls.last().expect("top scroll").contains("scrollTo(0, 0)"));
}

#[tokio::test]
async fn growing_page_stops_at_the_iteration_cap() {
    init_logging();
    let heights: Vec<i64> = (0..16).map(|i| 1000 + i * 250).collect();
    let session = FakeSession::new("t", "<body></body>", "", heights);
    let sink = CollectingSink::default();

    let revelation = reveal_page(&session, &fast_scroll(), &sink)
        .await
        .expect("reveal");

    assert!(!revelation.settled);
    assert_eq!(revelation.iterations, 10);
}

#[tokio::test]
async fn failing_expand_script_degrades_instead_of_aborting() {
    init_logging();
    let session = FakeSession::new("t", "<body></body>", "", vec![500; 16]);
    session.with(|st| st.expand_fails = true);
    let sink = CollectingSink::default();

    let revelation = reveal_page(&session, &fast_scroll(), &sink)
        .await
        .expect("reveal");

    assert!(!revelation.fully_revealed);
    assert_eq!(session.with(|st| st.expand_runs), 1);
}

#[tokio::test]
async fn empty_title_falls_back_to_the_default() {
    init_logging();
    let session = FakeSession::new("", "<body><p>x</p></body>", "x", vec![100; 16]);
    session.navigate("https://example.com/").await.expect("navigate");

    let snapshot = capture(&session).await.expect("capture");

    assert_eq!(snapshot.title, DEFAULT_TITLE);
    assert_eq!(snapshot.url, "https://example.com/");
}

#[tokio::test]
async fn archive_writes_the_three_artifact_set() {
    init_logging();
    let html = "<body><h1>Заголовок</h1><div style=\"display:none\">Hidden</div><p>Visible</p></body>";
    let session = FakeSession::new("Ретрознак", html, "Заголовок\nHidden\nVisible", vec![900; 16]);
    let sink = CollectingSink::default();
    let dir = tempfile::tempdir().expect("tempdir");
    let settings = ArchiveSettings {
        scroll: fast_scroll(),
        output_dir: dir.path().to_path_buf(),
        base_name: Some("page".to_string()),
    };

    let outcome = archive_page(&session, "https://example.com/", &settings, &sink)
        .await
        .expect("archive");

    let markdown = std::fs::read_to_string(&outcome.paths.markdown).expect("markdown");
    let raw_html = std::fs::read_to_string(&outcome.paths.html).expect("html");
    let text = std::fs::read_to_string(&outcome.paths.text).expect("text");

    assert!(markdown.starts_with("---\nurl: https://example.com/\n"));
    assert!(markdown.contains("# Ретрознак"));
    assert!(markdown.contains("Visible"));
    assert_eq!(raw_html, html);
    assert_eq!(text, "Заголовок\nHidden\nVisible");

    // The converted body can never carry less than the visible text.
    assert!(outcome.markdown_chars >= outcome.text_chars);

    let stages = sink.stages();
    assert_eq!(stages.first(), Some(&Stage::Loading));
    assert_eq!(stages.last(), Some(&Stage::Done));
    for stage in [
        Stage::Scrolling,
        Stage::Expanding,
        Stage::Capturing,
        Stage::Converting,
        Stage::Writing,
    ] {
        assert!(stages.contains(&stage), "missing stage {stage:?}");
    }
}

#[tokio::test]
async fn missing_body_aborts_the_run() {
    init_logging();
    let session = FakeSession::new("t", "", "", vec![0; 16]);
    session.with(|st| st.body_missing = true);
    let sink = CollectingSink::default();
    let dir = tempfile::tempdir().expect("tempdir");
    let settings = ArchiveSettings {
        scroll: fast_scroll(),
        output_dir: dir.path().to_path_buf(),
        base_name: None,
    };

    let result = archive_page(&session, "https://example.com/", &settings, &sink).await;

    assert!(matches!(result, Err(ArchiveError::ReadinessTimeout(_))));
}

#[tokio::test]
async fn invalid_url_is_rejected_before_navigation() {
    init_logging();
    let session = FakeSession::new("t", "", "", vec![0; 16]);
    let sink = CollectingSink::default();
    let settings = ArchiveSettings {
        scroll: fast_scroll(),
        ..ArchiveSettings::default()
    };

    let result = archive_page(&session, "not a url", &settings, &sink).await;

    assert!(matches!(result, Err(ArchiveError::InvalidUrl(_))));
    assert_eq!(session.with(|st| st.url.clone()), "");
}

#[tokio::test]
async fn analyze_reports_scripted_element_counts() {
    init_logging();
    let session = FakeSession::new("Стат", "<body></body>", "", vec![100; 16]);
    session.with(|st| {
        st.counts.insert("a", 12);
        st.counts.insert("img", 3);
        st.counts.insert("p", 7);
        st.counts.insert("h1,h2,h3,h4,h5,h6", 4);
        st.counts.insert("div", 40);
        st.counts.insert("form", 1);
        st.counts.insert("table", 0);
        st.counts.insert("ul,ol", 5);
    });

    let stats = analyze_page(&session, "https://example.com/", Duration::ZERO)
        .await
        .expect("analyze");

    assert_eq!(stats.title, "Стат");
    assert_eq!(stats.links, 12);
    assert_eq!(stats.images, 3);
    assert_eq!(stats.paragraphs, 7);
    assert_eq!(stats.headers, 4);
    assert_eq!(stats.divs, 40);
    assert_eq!(stats.forms, 1);
    assert_eq!(stats.tables, 0);
    assert_eq!(stats.lists, 5);
}
