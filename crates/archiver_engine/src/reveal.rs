use std::time::Duration;

use engine_logging::engine_warn;
use tokio::time::sleep;

use crate::session::RendererSession;
use crate::types::{ArchiveError, Progress, ProgressSink, Stage};

const SCROLL_HEIGHT_JS: &str = "return document.body.scrollHeight";
const SCROLL_BOTTOM_JS: &str = "window.scrollTo(0, document.body.scrollHeight);";
const SCROLL_MIDPOINT_JS: &str = "window.scrollTo(0, document.body.scrollHeight/2);";
const SCROLL_TOP_JS: &str = "window.scrollTo(0, 0);";

/// One JavaScript program that forces hidden content into view: activates
/// "show more" controls and collapse/expand markers, reverses inline hiding
/// styles, and strips the common hiding utility classes.
const EXPAND_EVERYTHING_JS: &str = r#"
    document.querySelectorAll('*').forEach(el => {
        if (el.textContent && el.textContent.includes('Показать больше')) {
            el.click();
        }
    });

    document.querySelectorAll('[data-toggle], .collapse, .collapsed, .accordion, .expandable').forEach(el => {
        el.click();
    });

    document.querySelectorAll('*').forEach(el => {
        if (window.getComputedStyle(el).display === 'none') {
            el.style.display = 'block';
        }
        if (window.getComputedStyle(el).visibility === 'hidden') {
            el.style.visibility = 'visible';
        }
    });

    document.querySelectorAll('.hidden, .d-none, .invisible').forEach(el => {
        el.classList.remove('hidden', 'd-none', 'invisible');
    });
"#;

/// Timing and effort budget for the revelation pass.
#[derive(Debug, Clone)]
pub struct ScrollSettings {
    /// Hard cap on scroll iterations.
    pub max_iterations: usize,
    /// Height stability is ignored until this many iterations have run.
    pub min_iterations: usize,
    /// Pause after the body appears, before any scrolling.
    pub initial_pause: Duration,
    /// Pause after scrolling to the bottom.
    pub bottom_pause: Duration,
    /// Shorter pause after scrolling to the vertical midpoint.
    pub midpoint_pause: Duration,
    /// Pause after returning to the top.
    pub top_pause: Duration,
    /// Pause after the expand pass, while triggered DOM mutations land.
    pub post_expand_pause: Duration,
}

impl Default for ScrollSettings {
    fn default() -> Self {
        Self {
            max_iterations: 10,
            min_iterations: 4,
            initial_pause: Duration::from_secs(5),
            bottom_pause: Duration::from_secs(1),
            midpoint_pause: Duration::from_millis(500),
            top_pause: Duration::from_secs(1),
            post_expand_pause: Duration::from_secs(3),
        }
    }
}

/// What the revelation pass accomplished.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Revelation {
    /// Scroll iterations actually performed.
    pub iterations: usize,
    /// True when the loop exited on height stability rather than the cap.
    pub settled: bool,
    /// False when the expand script failed and the page is only scrolled,
    /// not force-revealed.
    pub fully_revealed: bool,
}

/// Settlement policy over the scroll-height history.
///
/// `history` holds the initial reading followed by one reading per
/// iteration. The page counts as settled once the two latest readings are
/// equal and more than `min_iterations` iterations have produced readings.
/// Height alone is deliberately not trusted earlier than that: many async
/// loaders need several scroll cycles before they stop growing the page.
pub fn is_settled(history: &[i64], min_iterations: usize) -> bool {
    if history.len() < min_iterations + 2 {
        return false;
    }
    match history {
        [.., previous, latest] => previous == latest,
        _ => false,
    }
}

/// Drive the page until no further lazily-rendered content is expected.
///
/// Scrolls bottom-then-midpoint up to the iteration cap, returns to the top,
/// then unconditionally runs the expand pass. Height stability is not a
/// sufficient signal on its own (accordions grow without changing scroll
/// height), so the expand pass is never gated on it.
pub async fn reveal_page(
    session: &dyn RendererSession,
    settings: &ScrollSettings,
    sink: &dyn ProgressSink,
) -> Result<Revelation, ArchiveError> {
    sleep(settings.initial_pause).await;

    let mut history = vec![read_scroll_height(session).await?];
    let mut iterations = 0;
    let mut settled = false;

    for iteration in 1..=settings.max_iterations {
        sink.emit(Progress::with_detail(
            Stage::Scrolling,
            format!("pass {iteration}/{}", settings.max_iterations),
        ));

        session.execute(SCROLL_BOTTOM_JS, vec![]).await?;
        sleep(settings.bottom_pause).await;

        session.execute(SCROLL_MIDPOINT_JS, vec![]).await?;
        sleep(settings.midpoint_pause).await;

        history.push(read_scroll_height(session).await?);
        iterations = iteration;
        if is_settled(&history, settings.min_iterations) {
            settled = true;
            break;
        }
    }

    session.execute(SCROLL_TOP_JS, vec![]).await?;
    sleep(settings.top_pause).await;

    // Best effort only: a failing expand script leaves the page scrolled but
    // not force-revealed, which still beats aborting the run.
    sink.emit(Progress::stage(Stage::Expanding));
    let fully_revealed = match session.execute(EXPAND_EVERYTHING_JS, vec![]).await {
        Ok(_) => true,
        Err(err) => {
            engine_warn!("expand pass failed, continuing without it: {err}");
            false
        }
    };
    sleep(settings.post_expand_pause).await;

    Ok(Revelation {
        iterations,
        settled,
        fully_revealed,
    })
}

async fn read_scroll_height(session: &dyn RendererSession) -> Result<i64, ArchiveError> {
    let value = session.execute(SCROLL_HEIGHT_JS, vec![]).await?;
    Ok(value
        .as_i64()
        .or_else(|| value.as_f64().map(|height| height as i64))
        .unwrap_or(0))
}

#[cfg(test)]
mod tests {
    use super::is_settled;

    #[test]
    fn empty_history_is_not_settled() {
        assert!(!is_settled(&[], 4));
    }

    #[test]
    fn stable_height_before_floor_is_not_settled() {
        // Initial reading plus four identical iteration readings: the floor
        // requires strictly more than four iterations.
        assert!(!is_settled(&[100, 100, 100, 100, 100], 4));
    }

    #[test]
    fn stable_height_past_floor_is_settled() {
        assert!(is_settled(&[100, 200, 300, 300, 300, 300], 4));
    }

    #[test]
    fn growing_height_is_never_settled() {
        assert!(!is_settled(&[100, 200, 300, 400, 500, 600], 4));
    }

    #[test]
    fn only_latest_two_readings_matter() {
        assert!(is_settled(&[100, 100, 100, 200, 300, 300], 4));
    }
}
