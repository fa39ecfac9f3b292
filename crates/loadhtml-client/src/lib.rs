pub mod browser;

pub use browser::{BrowserFetcher, BrowserOptions, DEFAULT_USER_AGENT};
