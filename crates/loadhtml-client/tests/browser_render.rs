//! End-to-end render tests against local file:// pages.
//!
//! These launch a real Chromium and are ignored by default; run with
//! `cargo test -p loadhtml-client -- --ignored` on a machine with a
//! Chrome/Chromium binary available.

use std::io::Write;

use loadhtml_client::{BrowserFetcher, BrowserOptions};
use loadhtml_core::traits::Fetcher;

fn write_page(html: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::Builder::new()
        .suffix(".html")
        .tempfile()
        .expect("failed to create temp page");
    file.write_all(html.as_bytes()).expect("failed to write temp page");
    file.flush().unwrap();
    file
}

#[tokio::test]
#[ignore = "requires a Chrome/Chromium binary"]
async fn captures_script_mutations_in_rendered_html() {
    let page = write_page(
        r#"<html><body>
            <p id="out">before</p>
            <script>document.getElementById('out').textContent = 'after';</script>
        </body></html>"#,
    );
    let url = format!("file://{}", page.path().display());

    let fetcher = BrowserFetcher::launch(BrowserOptions::default())
        .await
        .expect("browser launch failed");
    let html = fetcher.fetch(&url).await.expect("fetch failed");
    fetcher.close().await.expect("browser close failed");

    assert!(
        html.contains("after"),
        "Script mutation missing from rendered HTML: {html}"
    );
    assert!(!html.contains(">before<"), "Pre-script DOM was captured");
}

#[tokio::test]
#[ignore = "requires a Chrome/Chromium binary"]
async fn unresolvable_host_is_a_load_error() {
    let fetcher = BrowserFetcher::launch(BrowserOptions::default())
        .await
        .expect("browser launch failed");
    let result = fetcher.fetch("http://no-such-host.invalid/").await;
    fetcher.close().await.expect("browser close failed");

    assert!(result.is_err(), "Expected a load error for an unresolvable host");
}
