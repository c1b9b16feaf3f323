use std::path::PathBuf;

use engine_logging::engine_info;
use url::Url;

use crate::capture::capture;
use crate::convert::convert_snapshot;
use crate::filename::deterministic_base_name;
use crate::persist::write_artifact_set;
use crate::reveal::{reveal_page, ScrollSettings};
use crate::session::RendererSession;
use crate::types::{ArchiveError, ArchiveOutcome, Progress, ProgressSink, Stage};

/// Per-run configuration for [`archive_page`].
#[derive(Debug, Clone)]
pub struct ArchiveSettings {
    pub scroll: ScrollSettings,
    /// Directory the artifact set lands in; created on first use.
    pub output_dir: PathBuf,
    /// Explicit artifact base name; derived from title and URL when absent.
    pub base_name: Option<String>,
}

impl Default for ArchiveSettings {
    fn default() -> Self {
        Self {
            scroll: ScrollSettings::default(),
            output_dir: PathBuf::from("markdown_output"),
            base_name: None,
        }
    }
}

/// Run the whole pipeline against one page: reveal, capture, convert,
/// persist. Returns a summary of what was written.
///
/// Only session startup, readiness and persistence problems abort the run;
/// revelation and conversion failures degrade the output instead and are
/// reflected in the outcome flags.
pub async fn archive_page(
    session: &dyn RendererSession,
    url: &str,
    settings: &ArchiveSettings,
    sink: &dyn ProgressSink,
) -> Result<ArchiveOutcome, ArchiveError> {
    Url::parse(url)?;

    sink.emit(Progress::with_detail(Stage::Loading, url));
    session.navigate(url).await?;
    session.wait_for_body().await?;

    let revelation = reveal_page(session, &settings.scroll, sink).await?;

    sink.emit(Progress::stage(Stage::Capturing));
    let snapshot = capture(session).await?;

    sink.emit(Progress::stage(Stage::Converting));
    let document = convert_snapshot(&snapshot);
    let markdown = document.render();

    let base_name = settings
        .base_name
        .clone()
        .unwrap_or_else(|| deterministic_base_name(Some(&snapshot.title), &snapshot.url));

    sink.emit(Progress::with_detail(Stage::Writing, base_name.clone()));
    let paths = write_artifact_set(
        &settings.output_dir,
        &base_name,
        &markdown,
        &snapshot.raw_html,
        &snapshot.visible_text,
    )?;

    let outcome = ArchiveOutcome {
        final_url: snapshot.url.clone(),
        title: snapshot.title.clone(),
        paths,
        revelation,
        used_fallback: document.used_fallback,
        html_chars: snapshot.raw_html.chars().count(),
        text_chars: snapshot.visible_text.chars().count(),
        markdown_chars: markdown.chars().count(),
    };
    engine_info!(
        "archived {} ({} markdown chars, fallback: {})",
        outcome.final_url,
        outcome.markdown_chars,
        outcome.used_fallback
    );
    sink.emit(Progress::stage(Stage::Done));
    Ok(outcome)
}
