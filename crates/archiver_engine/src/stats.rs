use std::fmt;
use std::time::Duration;

use tokio::time::sleep;

use crate::session::RendererSession;
use crate::types::ArchiveError;

/// Element counts for a rendered page, reported by the analyze mode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageStats {
    pub title: String,
    pub url: String,
    pub links: usize,
    pub images: usize,
    pub paragraphs: usize,
    pub headers: usize,
    pub divs: usize,
    pub forms: usize,
    pub tables: usize,
    pub lists: usize,
}

impl fmt::Display for PageStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{:<12}: {}", "title", self.title)?;
        writeln!(f, "{:<12}: {}", "url", self.url)?;
        writeln!(f, "{:<12}: {}", "links", self.links)?;
        writeln!(f, "{:<12}: {}", "images", self.images)?;
        writeln!(f, "{:<12}: {}", "paragraphs", self.paragraphs)?;
        writeln!(f, "{:<12}: {}", "headers", self.headers)?;
        writeln!(f, "{:<12}: {}", "divs", self.divs)?;
        writeln!(f, "{:<12}: {}", "forms", self.forms)?;
        writeln!(f, "{:<12}: {}", "tables", self.tables)?;
        write!(f, "{:<12}: {}", "lists", self.lists)
    }
}

/// Navigate to `url` and tally the document-structuring elements, giving
/// dynamic content `pause` to arrive first.
pub async fn analyze_page(
    session: &dyn RendererSession,
    url: &str,
    pause: Duration,
) -> Result<PageStats, ArchiveError> {
    session.navigate(url).await?;
    session.wait_for_body().await?;
    sleep(pause).await;

    Ok(PageStats {
        title: session.title().await?,
        url: session.current_url().await?,
        links: session.count_elements("a").await?,
        images: session.count_elements("img").await?,
        paragraphs: session.count_elements("p").await?,
        headers: session.count_elements("h1,h2,h3,h4,h5,h6").await?,
        divs: session.count_elements("div").await?,
        forms: session.count_elements("form").await?,
        tables: session.count_elements("table").await?,
        lists: session.count_elements("ul,ol").await?,
    })
}
