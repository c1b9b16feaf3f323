use chrono::{DateTime, Local};
use engine_logging::engine_info;

use crate::session::RendererSession;
use crate::types::ArchiveError;

/// Title used when the page reports an empty one.
pub const DEFAULT_TITLE: &str = "Ретрознак";

/// Immutable record of the fully revealed page, captured once settlement is
/// reached and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageSnapshot {
    pub title: String,
    pub url: String,
    pub raw_html: String,
    pub visible_text: String,
    pub captured_at: DateTime<Local>,
}

/// Pull the full rendered markup and visible-text rendering out of a
/// settled session. A body that cannot be read is fatal: without it there is
/// no meaningful snapshot to recover.
pub async fn capture(session: &dyn RendererSession) -> Result<PageSnapshot, ArchiveError> {
    let title = match session.title().await? {
        title if title.is_empty() => DEFAULT_TITLE.to_string(),
        title => title,
    };
    let url = session.current_url().await?;
    let raw_html = session.page_source().await?;
    let visible_text = session.visible_text().await?;

    engine_info!(
        "captured {} chars of markup, {} chars of visible text",
        raw_html.chars().count(),
        visible_text.chars().count()
    );

    Ok(PageSnapshot {
        title,
        url,
        raw_html,
        visible_text,
        captured_at: Local::now(),
    })
}
