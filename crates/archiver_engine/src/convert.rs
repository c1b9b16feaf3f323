use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::OnceLock;

use engine_logging::engine_warn;
use regex::Regex;
use scraper::{Html, Selector};

use crate::capture::PageSnapshot;
use crate::frontmatter::{build_metadata_block, TIMESTAMP_FORMAT};

/// Heading of the appended full-text section when the structured conversion
/// comes up short.
pub const FALLBACK_HEADING: &str = "## 📝 Текстовое содержимое страницы";

/// Structured-text document derived from one [`PageSnapshot`]. Immutable
/// once produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConvertedDocument {
    pub metadata_block: String,
    pub body: String,
    pub used_fallback: bool,
}

impl ConvertedDocument {
    /// Full artifact text: front matter followed by the body.
    pub fn render(&self) -> String {
        format!("{}{}", self.metadata_block, self.body)
    }
}

/// Convert a snapshot's markup into structured text without discarding
/// content.
///
/// Only `script`, `style` and `noscript` nodes are removed before
/// conversion; everything else stays eligible, so text of unknown elements
/// still surfaces through its ancestors. The visible-text snapshot acts as a
/// safety net twice: it replaces the body wholesale when conversion itself
/// fails, and it is appended whenever the converted body ends up shorter
/// than the visible text. The length comparison is a deliberate heuristic
/// for "conversion dropped something", false positives included.
pub fn convert_snapshot(snapshot: &PageSnapshot) -> ConvertedDocument {
    let pruned = prune_markup(&snapshot.raw_html);

    let (candidate, mut used_fallback) =
        match catch_unwind(AssertUnwindSafe(|| html2md::parse_html(&pruned))) {
            Ok(markdown) => (markdown, false),
            Err(_) => {
                engine_warn!("structural conversion failed, falling back to visible text");
                (snapshot.visible_text.clone(), true)
            }
        };

    let mut body = collapse_blank_lines(&candidate);

    if body.chars().count() < snapshot.visible_text.chars().count() {
        body.push_str(&fallback_section(&snapshot.visible_text));
        used_fallback = true;
    }

    let metadata_block = build_metadata_block(
        &snapshot.url,
        &snapshot.title,
        &snapshot.captured_at.format(TIMESTAMP_FORMAT).to_string(),
    );

    ConvertedDocument {
        metadata_block,
        body,
        used_fallback,
    }
}

/// Parse the markup and drop script/style/noscript subtrees, returning the
/// body's markup (the whole document when no body is present).
fn prune_markup(html: &str) -> String {
    let mut doc = Html::parse_document(html);

    if let Ok(strip_sel) = Selector::parse("script, style, noscript") {
        let doomed: Vec<_> = doc.select(&strip_sel).map(|el| el.id()).collect();
        for id in doomed {
            if let Some(mut node) = doc.tree.get_mut(id) {
                node.detach();
            }
        }
    }

    let body_sel = Selector::parse("body").ok();
    if let Some(sel) = body_sel.as_ref() {
        if let Some(body) = doc.select(sel).next() {
            return body.html();
        }
    }
    doc.root_element().html()
}

/// Collapse runs of 5-or-more consecutive blank lines down to exactly 3.
/// Cosmetic only; idempotent.
fn collapse_blank_lines(text: &str) -> String {
    static EXCESS_BLANKS: OnceLock<Regex> = OnceLock::new();
    let re = EXCESS_BLANKS.get_or_init(|| Regex::new(r"\n{5,}").expect("static pattern"));
    re.replace_all(text, "\n\n\n\n").into_owned()
}

fn fallback_section(visible_text: &str) -> String {
    format!(
        "\n\n{separator}\n\n{heading}\n\n{visible_text}",
        separator = "=".repeat(60),
        heading = FALLBACK_HEADING,
    )
}
