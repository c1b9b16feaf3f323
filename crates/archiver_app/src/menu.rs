//! Interactive operator menu: archive a page, or report its element stats.

use std::error::Error;
use std::io::{self, Write};
use std::time::Duration;

use engine_logging::engine_warn;

use archiver_engine::{
    analyze_page, archive_page, ArchiveError, ArchiveOutcome, ArchiveSettings, BrowserConfig,
    PageStats, Progress, ProgressSink, Stage, WebDriverSession,
};

/// Site this tool was built to back up; offered as the default target.
const DEFAULT_URL: &str = "https://xn--80ajgnnembr.xn--p1ai/";
const ANALYZE_PAUSE: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Full extraction: reveal everything, write the three artifacts.
    Archive,
    /// Element statistics only, nothing written.
    Analyze,
}

/// `1` archives, `2` analyzes; anything else (including empty) archives.
pub fn parse_mode(input: &str) -> Mode {
    match input.trim() {
        "2" => Mode::Analyze,
        _ => Mode::Archive,
    }
}

/// Progress narration to the operator's terminal.
struct ConsoleSink;

impl ProgressSink for ConsoleSink {
    fn emit(&self, progress: Progress) {
        let detail = progress.detail.as_deref().unwrap_or("");
        match progress.stage {
            Stage::Loading => println!("Loading {detail}..."),
            Stage::Scrolling => println!("  scroll {detail}"),
            Stage::Expanding => println!("Expanding hidden content..."),
            Stage::Capturing => println!("Extracting page content..."),
            Stage::Converting => println!("Converting markup to markdown..."),
            Stage::Writing => println!("Writing artifact set '{detail}'..."),
            Stage::Done => println!("Done."),
        }
    }
}

/// Run the menu once: pick a mode and a URL, drive the browser, report.
///
/// The browser session is closed on every path out of here, including after
/// a failed run, so the external browser process is never leaked.
pub async fn run() -> Result<(), Box<dyn Error>> {
    banner();
    println!("Mode:");
    println!("  1. Archive the page (default)");
    println!("  2. Analyze the page (statistics only)");
    let mode = parse_mode(&prompt("Choice (1 or 2): ")?);

    let typed = prompt(&format!("URL [{DEFAULT_URL}]: "))?;
    let url = match typed.trim() {
        "" => DEFAULT_URL.to_string(),
        typed => typed.to_string(),
    };

    let config = BrowserConfig::default();
    println!("Starting browser...");
    let session = WebDriverSession::connect(&config).await?;

    let result = match mode {
        Mode::Archive => {
            let settings = ArchiveSettings::default();
            archive_page(&session, &url, &settings, &ConsoleSink)
                .await
                .map(RunReport::Archive)
        }
        Mode::Analyze => analyze_page(&session, &url, ANALYZE_PAUSE)
            .await
            .map(RunReport::Analyze),
    };

    if let Err(err) = session.close().await {
        engine_warn!("failed to close browser session: {err}");
    }

    report(result?);
    Ok(())
}

enum RunReport {
    Archive(ArchiveOutcome),
    Analyze(PageStats),
}

fn report(result: RunReport) {
    match result {
        RunReport::Archive(outcome) => {
            println!();
            println!("Saved:");
            println!("  markdown: {}", outcome.paths.markdown.display());
            println!("  html:     {}", outcome.paths.html.display());
            println!("  text:     {}", outcome.paths.text.display());
            println!(
                "{} markdown chars from {} chars of markup, {} of visible text",
                outcome.markdown_chars, outcome.html_chars, outcome.text_chars
            );
            if outcome.used_fallback {
                println!("Structured conversion came up short; full visible text appended.");
            }
            if !outcome.revelation.fully_revealed {
                println!("Expand pass failed; the page was scrolled but not force-revealed.");
            }
        }
        RunReport::Analyze(stats) => {
            println!();
            println!("PAGE STATISTICS");
            println!("{}", "=".repeat(40));
            println!("{stats}");
            println!("{}", "=".repeat(40));
        }
    }
}

fn banner() {
    println!("Full-content page archiver");
    println!("Reveals lazy and hidden content, then saves markdown, HTML and text.");
    println!();
}

fn prompt(label: &str) -> Result<String, io::Error> {
    print!("{label}");
    io::stdout().flush()?;
    let mut line = String::new();
    io::stdin().read_line(&mut line)?;
    Ok(line)
}

// Startup failures get a dedicated hint since they are the most common
// operator problem (chromedriver not running).
pub fn describe_failure(err: &(dyn Error + 'static)) -> String {
    if let Some(ArchiveError::SessionStartup(msg)) = err.downcast_ref::<ArchiveError>() {
        return format!("{msg}\nIs chromedriver running on localhost:9515?");
    }
    err.to_string()
}

#[cfg(test)]
mod tests {
    use super::{parse_mode, Mode};

    #[test]
    fn analyze_only_on_explicit_two() {
        assert_eq!(parse_mode("2"), Mode::Analyze);
        assert_eq!(parse_mode(" 2 \n"), Mode::Analyze);
        assert_eq!(parse_mode("1"), Mode::Archive);
        assert_eq!(parse_mode(""), Mode::Archive);
        assert_eq!(parse_mode("yes"), Mode::Archive);
    }
}
