//! Archiver engine: drives a headless browser to fully render one page,
//! forces lazy and hidden content to materialize, and persists the result as
//! markdown, raw HTML and plain text.
mod capture;
mod convert;
mod engine;
mod filename;
mod frontmatter;
mod persist;
mod reveal;
mod session;
mod stats;
mod types;

pub use capture::{capture, PageSnapshot, DEFAULT_TITLE};
pub use convert::{convert_snapshot, ConvertedDocument, FALLBACK_HEADING};
pub use engine::{archive_page, ArchiveSettings};
pub use filename::deterministic_base_name;
pub use frontmatter::{build_metadata_block, MODE_LABEL, PARSER_LABEL, TIMESTAMP_FORMAT};
pub use persist::{ensure_output_dir, write_artifact_set, AtomicFileWriter, PersistError};
pub use reveal::{is_settled, reveal_page, Revelation, ScrollSettings};
pub use session::{BrowserConfig, RendererSession, WebDriverSession};
pub use stats::{analyze_page, PageStats};
pub use types::{ArchiveError, ArchiveOutcome, ArtifactPaths, Progress, ProgressSink, Stage};
