use crate::traits::Fetcher;

/// How a load ended, mapped one-to-one onto process exit codes.
///
/// Usage errors (exit code 2) never reach this type — they are rejected
/// by the argument parser before any fetcher exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The page rendered and its markup is ready to print.
    Rendered,
    /// The engine could not load the address (or timed out doing so).
    LoadFailed,
}

impl Outcome {
    pub fn exit_code(self) -> u8 {
        match self {
            Outcome::Rendered => 0,
            Outcome::LoadFailed => 1,
        }
    }
}

/// Result of a [`PageLoader::load`] call: what to print and how to exit.
///
/// `output` is the full stdout payload — the rendered markup verbatim on
/// success, the single diagnostic line on failure. The loader never
/// transforms, escapes, or trims what the fetcher returned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadReport {
    pub outcome: Outcome,
    pub output: String,
}

impl LoadReport {
    pub fn exit_code(&self) -> u8 {
        self.outcome.exit_code()
    }
}

/// Drives a single page load: fetch → report.
///
/// Generic over [`Fetcher`] via dependency injection, enabling outcome
/// and output-contract tests without a real browser.
pub struct PageLoader<F: Fetcher> {
    fetcher: F,
}

impl<F: Fetcher> PageLoader<F> {
    pub fn new(fetcher: F) -> Self {
        Self { fetcher }
    }

    /// Load `url` and map the result onto the output contract.
    ///
    /// Every fetcher error is terminal — no retry — and collapses to the
    /// same stdout line; the distinction (timeout vs. engine failure)
    /// stays on stderr via tracing.
    pub async fn load(&self, url: &str) -> LoadReport {
        tracing::info!("Loading {}", url);

        match self.fetcher.fetch(url).await {
            Ok(html) => {
                tracing::info!("Rendered {} bytes of HTML", html.len());
                LoadReport {
                    outcome: Outcome::Rendered,
                    output: html,
                }
            }
            Err(err) => {
                tracing::error!("Load failed for {}: {}", url, err);
                LoadReport {
                    outcome: Outcome::LoadFailed,
                    output: format!("Fail to load the address: {url}"),
                }
            }
        }
    }
}
