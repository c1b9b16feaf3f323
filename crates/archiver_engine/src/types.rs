use std::path::PathBuf;
use std::time::Duration;

use crate::persist::PersistError;
use crate::reveal::Revelation;

/// Pipeline stage, in execution order, used for progress narration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Loading,
    Scrolling,
    Expanding,
    Capturing,
    Converting,
    Writing,
    Done,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Progress {
    pub stage: Stage,
    pub detail: Option<String>,
}

impl Progress {
    pub fn stage(stage: Stage) -> Self {
        Self {
            stage,
            detail: None,
        }
    }

    pub fn with_detail(stage: Stage, detail: impl Into<String>) -> Self {
        Self {
            stage,
            detail: Some(detail.into()),
        }
    }
}

/// Receiver for stage-by-stage progress events.
pub trait ProgressSink: Send + Sync {
    fn emit(&self, progress: Progress);
}

/// Paths of the three sibling artifacts produced by one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactPaths {
    pub markdown: PathBuf,
    pub html: PathBuf,
    pub text: PathBuf,
}

/// Summary of a completed archive run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveOutcome {
    pub final_url: String,
    pub title: String,
    pub paths: ArtifactPaths,
    pub revelation: Revelation,
    pub used_fallback: bool,
    pub html_chars: usize,
    pub text_chars: usize,
    pub markdown_chars: usize,
}

/// Failures that abort a run. Revelation and conversion problems are
/// recovered inside the pipeline and never surface here.
#[derive(Debug, thiserror::Error)]
pub enum ArchiveError {
    #[error("browser session could not be established: {0}")]
    SessionStartup(String),
    #[error("webdriver command failed: {0}")]
    Session(#[from] fantoccini::error::CmdError),
    #[error("page body did not appear within {0:?}")]
    ReadinessTimeout(Duration),
    #[error("invalid url: {0}")]
    InvalidUrl(#[from] url::ParseError),
    #[error(transparent)]
    Persist(#[from] PersistError),
}
