// Common test utilities and fixtures
//
// Integration tests here drive a real browser against the fixture site.
// They skip (rather than fail) when no WebDriver/browser is available on
// the machine, so the unit-test suite stays green everywhere.

use tokio::sync::OnceCell;

use sitecheck::{BrowserKind, Page, Result, UiModel, ViewportSize};

include!("../fixture_app.rs");

static FIXTURE_SITE: OnceCell<SiteHandle> = OnceCell::const_new();

pub struct SiteHandle {
    pub base_url: String,
}

/// Start the fixture site once per test binary.
///
/// The server lives on a dedicated thread with its own runtime so it
/// survives the per-test runtimes tokio::test creates and tears down.
pub async fn ensure_fixture_site() -> &'static SiteHandle {
    FIXTURE_SITE
        .get_or_init(|| async {
            let std_listener =
                std::net::TcpListener::bind("127.0.0.1:0").expect("Failed to bind fixture site");
            let addr = std_listener.local_addr().unwrap();
            let base_url = format!("http://{}", addr);
            // Close the listener so the server thread can bind to it
            drop(std_listener);

            std::thread::spawn(move || {
                let runtime = tokio::runtime::Runtime::new().expect("Failed to create runtime");

                runtime.block_on(async move {
                    let listener = tokio::net::TcpListener::bind(addr)
                        .await
                        .expect("Failed to bind in thread");
                    let app = create_app().await;
                    axum::serve(listener, app)
                        .await
                        .expect("Fixture site failed");
                });
            });

            // Wait for the site to answer before handing the URL out
            for _ in 0..50 {
                tokio::time::sleep(std::time::Duration::from_millis(100)).await;
                let ready = reqwest::get(&base_url)
                    .await
                    .map(|response| response.status().is_success())
                    .unwrap_or(false);
                if ready {
                    break;
                }
            }

            SiteHandle { base_url }
        })
        .await
}

/// Browser kind under test; override with SITECHECK_BROWSER=chrome.
pub fn test_browser() -> BrowserKind {
    std::env::var("SITECHECK_BROWSER")
        .ok()
        .and_then(|value| value.parse().ok())
        .unwrap_or(BrowserKind::Firefox)
}

/// Launch a headless page, or None when the environment has no usable
/// WebDriver/browser (the calling test should return early).
pub async fn launch_page() -> Option<Page> {
    let viewport = ViewportSize {
        width: 1280,
        height: 720,
    };
    match Page::launch(test_browser(), Some(viewport), true).await {
        Ok(page) => Some(page),
        Err(e) => {
            eprintln!("Skipping browser test (no WebDriver available): {e}");
            None
        }
    }
}

/// Build a model rooted at the fixture site and load its landing page.
pub async fn home_model(page: &Page) -> Result<UiModel<'_>> {
    let site = ensure_fixture_site().await;
    let base = url::Url::parse(&site.base_url).expect("fixture site url");
    let model = UiModel::new(page, base);
    model.goto().await?;
    Ok(model)
}

/// URL of a non-landing fixture document, e.g. `fixture_url("/probe")`.
pub async fn fixture_url(path: &str) -> String {
    let site = ensure_fixture_site().await;
    format!("{}{}", site.base_url, path)
}
