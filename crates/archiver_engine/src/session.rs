use std::time::Duration;

use async_trait::async_trait;
use fantoccini::{Client, ClientBuilder, Locator};
use serde_json::{json, Value};
use webdriver::capabilities::Capabilities;

use crate::types::ArchiveError;

/// Immutable browser configuration, fixed for the lifetime of a session.
#[derive(Debug, Clone)]
pub struct BrowserConfig {
    /// Run the browser without a visible window.
    pub headless: bool,
    /// Disable the Chromium sandbox (required in most containers).
    pub no_sandbox: bool,
    /// Fixed viewport size in pixels.
    pub window_size: (u32, u32),
    /// User-agent string presented to the site.
    pub user_agent: String,
    /// Deny notification permission prompts so they never block rendering.
    pub suppress_notifications: bool,
    /// WebDriver endpoint to connect to.
    pub webdriver_url: String,
    /// How long to wait for the document body before giving up on a page.
    pub body_wait: Duration,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            headless: true,
            no_sandbox: true,
            window_size: (1920, 1080),
            user_agent: "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36"
                .to_string(),
            suppress_notifications: true,
            webdriver_url: "http://localhost:9515".to_string(),
            body_wait: Duration::from_secs(15),
        }
    }
}

impl BrowserConfig {
    fn chrome_args(&self) -> Vec<String> {
        let mut args = vec![
            "--disable-dev-shm-usage".to_string(),
            "--disable-blink-features=AutomationControlled".to_string(),
            format!("--window-size={},{}", self.window_size.0, self.window_size.1),
            format!("--user-agent={}", self.user_agent),
        ];
        if self.headless {
            args.push("--headless=new".to_string());
        }
        if self.no_sandbox {
            args.push("--no-sandbox".to_string());
        }
        args
    }
}

/// The rendering surface the pipeline drives.
///
/// The engine only ever talks to this trait; [`WebDriverSession`] is the real
/// implementation and tests substitute scripted fakes.
#[async_trait]
pub trait RendererSession: Send + Sync {
    async fn navigate(&self, url: &str) -> Result<(), ArchiveError>;
    /// Block until the document body exists, or fail with a readiness timeout.
    async fn wait_for_body(&self) -> Result<(), ArchiveError>;
    /// Run a JavaScript snippet in the page and return its value.
    async fn execute(&self, script: &str, args: Vec<Value>) -> Result<Value, ArchiveError>;
    /// Number of elements matching a CSS selector.
    async fn count_elements(&self, selector: &str) -> Result<usize, ArchiveError>;
    /// Full rendered markup, as the browser currently holds it.
    async fn page_source(&self) -> Result<String, ArchiveError>;
    /// The visible-text rendering of the document body.
    async fn visible_text(&self) -> Result<String, ArchiveError>;
    async fn current_url(&self) -> Result<String, ArchiveError>;
    async fn title(&self) -> Result<String, ArchiveError>;
}

/// Session backed by a running chromedriver, driven over WebDriver.
pub struct WebDriverSession {
    client: Client,
    body_wait: Duration,
}

impl WebDriverSession {
    /// Connect to the WebDriver endpoint and start a browser per `config`.
    pub async fn connect(config: &BrowserConfig) -> Result<Self, ArchiveError> {
        let mut caps = Capabilities::new();
        let mut chrome_opts = serde_json::Map::new();
        chrome_opts.insert("args".to_string(), json!(config.chrome_args()));
        if config.suppress_notifications {
            chrome_opts.insert(
                "prefs".to_string(),
                json!({ "profile.default_content_setting_values.notifications": 2 }),
            );
        }
        caps.insert("goog:chromeOptions".to_string(), json!(chrome_opts));

        let client = ClientBuilder::native()
            .capabilities(caps)
            .connect(&config.webdriver_url)
            .await
            .map_err(|err| ArchiveError::SessionStartup(err.to_string()))?;

        Ok(Self {
            client,
            body_wait: config.body_wait,
        })
    }

    /// Terminate the browser session. Must run on every exit path so the
    /// external browser process is not leaked.
    pub async fn close(self) -> Result<(), ArchiveError> {
        self.client.close().await?;
        Ok(())
    }
}

#[async_trait]
impl RendererSession for WebDriverSession {
    async fn navigate(&self, url: &str) -> Result<(), ArchiveError> {
        self.client.goto(url).await?;
        Ok(())
    }

    async fn wait_for_body(&self) -> Result<(), ArchiveError> {
        self.client
            .wait()
            .at_most(self.body_wait)
            .for_element(Locator::Css("body"))
            .await
            .map_err(|_| ArchiveError::ReadinessTimeout(self.body_wait))?;
        Ok(())
    }

    async fn execute(&self, script: &str, args: Vec<Value>) -> Result<Value, ArchiveError> {
        Ok(self.client.execute(script, args).await?)
    }

    async fn count_elements(&self, selector: &str) -> Result<usize, ArchiveError> {
        let elements = self.client.find_all(Locator::Css(selector)).await?;
        Ok(elements.len())
    }

    async fn page_source(&self) -> Result<String, ArchiveError> {
        Ok(self.client.source().await?)
    }

    async fn visible_text(&self) -> Result<String, ArchiveError> {
        let body = self.client.find(Locator::Css("body")).await?;
        Ok(body.text().await?)
    }

    async fn current_url(&self) -> Result<String, ArchiveError> {
        Ok(self.client.current_url().await?.to_string())
    }

    async fn title(&self) -> Result<String, ArchiveError> {
        Ok(self.client.title().await?)
    }
}
