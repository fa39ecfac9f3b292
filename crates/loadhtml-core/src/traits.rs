use std::future::Future;

use crate::error::AppError;

/// Fetches the fully rendered HTML of a URL.
///
/// Implementations own the navigation semantics: what "load complete"
/// means, how long to wait for the document to settle, and which failures
/// map to which [`AppError`] variants. [`crate::page::PageLoader`] is
/// generic over this trait so the outcome mapping can be tested without a
/// real browser.
pub trait Fetcher: Send + Sync + Clone {
    fn fetch(&self, url: &str) -> impl Future<Output = Result<String, AppError>> + Send;
}
