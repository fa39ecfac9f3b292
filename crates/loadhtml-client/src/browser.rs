use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use chromiumoxide::{Browser, BrowserConfig, Page};
use futures::StreamExt;
use tokio::sync::Mutex;

use loadhtml_core::error::AppError;
use loadhtml_core::settle::{self, Settle, SettleConfig};
use loadhtml_core::traits::Fetcher;

/// Identity string presented to target servers.
///
/// A realistic desktop browser identity; some sites serve degraded or
/// blocked responses to unrecognized clients.
pub const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (X11; Linux x86_64; rv:128.0) Gecko/20100101 Firefox/128.0";

/// Static per-invocation configuration of the browser engine.
#[derive(Debug, Clone)]
pub struct BrowserOptions {
    /// User-Agent sent with every request.
    pub user_agent: String,

    /// Whether page scripts run. Rendered markup is only meaningful for
    /// script-driven pages when this is on.
    pub javascript: bool,

    /// Deadline for the whole navigate-settle-capture sequence.
    pub nav_timeout: Duration,

    /// Post-load quiescence wait (see [`loadhtml_core::settle`]).
    pub settle: SettleConfig,
}

impl Default for BrowserOptions {
    fn default() -> Self {
        Self {
            user_agent: DEFAULT_USER_AGENT.to_string(),
            javascript: true,
            nav_timeout: Duration::from_secs(30),
            settle: SettleConfig::default(),
        }
    }
}

/// Headless-browser fetcher using Chromium via the Chrome DevTools Protocol.
///
/// Renders JavaScript before returning the HTML, so script-built pages
/// (SPAs, lazy-loaded content) come back in their post-execution form.
///
/// A single Chromium process backs all clones of this struct; each
/// [`Fetcher::fetch`] call opens a new tab, waits for the document to
/// settle, grabs the rendered HTML, and closes the tab. The process
/// itself is released with [`close`](Self::close).
///
/// # Example
///
/// ```rust,no_run
/// use loadhtml_client::{BrowserFetcher, BrowserOptions};
/// use loadhtml_core::traits::Fetcher;
///
/// # async fn run() -> Result<(), Box<dyn std::error::Error>> {
/// let fetcher = BrowserFetcher::launch(BrowserOptions::default()).await?;
/// let html = fetcher.fetch("https://example.com").await?;
/// fetcher.close().await?;
/// println!("{html}");
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct BrowserFetcher {
    browser: Arc<Mutex<Browser>>,
    options: BrowserOptions,
}

impl BrowserFetcher {
    /// Launches a headless Chromium process configured per `options`.
    ///
    /// Requires a Chromium / Chrome binary reachable via `CHROME_BIN`,
    /// well-known install paths, or the default locations checked by
    /// `chromiumoxide`.
    pub async fn launch(options: BrowserOptions) -> Result<Self, AppError> {
        let mut builder = BrowserConfig::builder().no_sandbox().disable_default_args();

        if let Some(bin) = find_chrome_binary() {
            tracing::info!("Using Chrome binary: {}", bin.display());
            builder = builder.chrome_executable(bin);
        }

        builder = builder
            .arg("--headless=new")
            .arg("--disable-gpu")
            .arg("--disable-dev-shm-usage")
            .arg("--disable-extensions")
            .arg("--disable-popup-blocking")
            .arg("--no-first-run")
            .arg(format!("--user-agent={}", options.user_agent));

        if !options.javascript {
            builder = builder.arg("--blink-settings=scriptEnabled=false");
        }

        let config = builder.build().map_err(AppError::Browser)?;

        let (browser, mut handler) = Browser::launch(config)
            .await
            .map_err(|e| AppError::Browser(format!("Failed to launch browser: {e}")))?;

        // The CDP handler must be polled continuously for the connection to work.
        tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if event.is_err() {
                    tracing::warn!("Browser CDP handler error: {event:?}");
                    break;
                }
            }
        });

        Ok(Self {
            browser: Arc::new(Mutex::new(browser)),
            options,
        })
    }

    /// Shuts the Chromium process down: CDP close, then child reap.
    ///
    /// Must be called on every exit path once `launch` has succeeded; a
    /// dropped handle only kills the child as a last resort.
    pub async fn close(&self) -> Result<(), AppError> {
        let mut browser = self.browser.lock().await;
        browser
            .close()
            .await
            .map_err(|e| AppError::Browser(format!("Failed to close browser: {e}")))?;
        if let Err(err) = browser.wait().await {
            tracing::debug!("Browser process wait failed: {err}");
        }
        Ok(())
    }

    /// Navigate, wait for the document to settle, and read the rendered DOM.
    async fn render(&self, url: &str) -> Result<String, AppError> {
        let page = {
            let browser = self.browser.lock().await;
            browser
                .new_page(url)
                .await
                .map_err(|e| AppError::Load(format!("Failed to navigate to {url}: {e}")))?
        };

        let captured = self.capture(&page, url).await;

        // Close the tab to free browser resources, success or not.
        let _ = page.close().await;

        captured
    }

    async fn capture(&self, page: &Page, url: &str) -> Result<String, AppError> {
        page.wait_for_navigation()
            .await
            .map_err(|e| AppError::Load(format!("Navigation to {url} did not complete: {e}")))?;

        // Wait until <body> is present — a minimal signal that the page
        // has rendered its main content.
        page.find_element("body")
            .await
            .map_err(|e| AppError::Load(format!("Page did not render a body: {e}")))?;

        // Let deferred scripts finish mutating the document: sample the
        // serialized size until it holds still, bounded by the budget.
        let settled = settle::wait_for_quiescence(
            || {
                let page = page.clone();
                async move {
                    page.evaluate("document.documentElement.outerHTML.length")
                        .await
                        .map_err(|e| AppError::Generic(format!("Settle probe failed: {e}")))?
                        .into_value::<u64>()
                        .map_err(|e| AppError::Generic(format!("Settle probe failed: {e}")))
                }
            },
            &self.options.settle,
        )
        .await;

        if settled == Settle::BudgetExhausted {
            tracing::debug!("Document still mutating after settle budget; capturing as-is");
        }

        // Grab the fully-rendered DOM.
        page.content()
            .await
            .map_err(|e| AppError::Load(format!("Failed to read page content: {e}")))
    }
}

impl Fetcher for BrowserFetcher {
    async fn fetch(&self, url: &str) -> Result<String, AppError> {
        let timeout = self.options.nav_timeout;

        match tokio::time::timeout(timeout, self.render(url)).await {
            Ok(inner) => inner,
            Err(_) => Err(AppError::Timeout(timeout.as_secs())),
        }
    }
}

/// Tries to locate the real Chrome/Chromium binary.
///
/// An explicit `CHROME_BIN` override wins. On systems where Chromium is
/// installed via snap, the wrapper at `/snap/bin/chromium` strips unknown
/// CLI flags and breaks headless mode, so the real binary inside the snap
/// is probed before the usual system paths. Returns `None` to let
/// `chromiumoxide` do its own lookup.
fn find_chrome_binary() -> Option<PathBuf> {
    if let Ok(bin) = std::env::var("CHROME_BIN") {
        let path = PathBuf::from(&bin);
        if path.exists() {
            return Some(path);
        }
        tracing::warn!("CHROME_BIN={bin} does not exist; falling back to discovery");
    }

    let candidates: &[&str] = &[
        // Snap (Ubuntu default)
        "/snap/chromium/current/usr/lib/chromium-browser/chrome",
        // Flatpak
        "/var/lib/flatpak/exports/bin/org.chromium.Chromium",
        // Common apt / manual installs
        "/usr/bin/google-chrome-stable",
        "/usr/bin/google-chrome",
        "/usr/bin/chromium",
        "/usr/bin/chromium-browser",
    ];

    candidates.iter().map(PathBuf::from).find(|p| p.exists())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_options_match_the_documented_contract() {
        let options = BrowserOptions::default();
        assert_eq!(options.user_agent, DEFAULT_USER_AGENT);
        assert!(options.javascript);
        assert_eq!(options.nav_timeout, Duration::from_secs(30));
        assert_eq!(options.settle.budget, Duration::from_secs(2));
    }

    #[test]
    fn default_user_agent_looks_like_a_desktop_browser() {
        assert!(DEFAULT_USER_AGENT.starts_with("Mozilla/5.0"));
        assert!(DEFAULT_USER_AGENT.contains("Linux x86_64"));
    }
}
