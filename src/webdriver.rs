use anyhow::anyhow;
use fantoccini::elements::Element;
use fantoccini::wd::WindowHandle;
use fantoccini::{Client, ClientBuilder, Locator};
use serde_json::json;
use tracing::{debug, info};

use crate::errors::{Error, Result};
use crate::selector::ElementRef;
use crate::types::{CookieRecord, CookieSnapshot, ViewportSize};
use crate::webdriver_manager::GLOBAL_DRIVER_MANAGER;

/// Supported browser kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum BrowserKind {
    /// Mozilla Firefox
    Firefox,
    /// Google Chrome/Chromium
    Chrome,
}

impl std::str::FromStr for BrowserKind {
    type Err = anyhow::Error;

    /// Parse browser kind from string (case-insensitive)
    fn from_str(s: &str) -> anyhow::Result<Self> {
        match s.to_lowercase().as_str() {
            "firefox" => Ok(BrowserKind::Firefox),
            "chrome" | "chromium" => Ok(BrowserKind::Chrome),
            _ => anyhow::bail!("Unsupported browser: {}", s),
        }
    }
}

/// A live browser tab under the suite's control.
///
/// `Page` is the handle everything else in this crate borrows: the
/// catalogue resolves against it, composite operations interact through
/// it, and the viewport probe runs its payload inside it. It owns the
/// underlying WebDriver session and is closed explicitly with
/// [`Page::close`].
///
/// Operations on one `Page` must be sequenced by the caller: every method
/// suspends while the browser works out-of-band, and issuing a second
/// interaction before the first completes is a caller error the suite
/// does not reconcile. Independent `Page`s share no state and may be
/// driven concurrently.
pub struct Page {
    client: Client,
    kind: BrowserKind,
}

impl Page {
    /// Launch a browser and open a fresh tab.
    ///
    /// Ensures a WebDriver process is available (starting one if needed),
    /// builds capabilities for the requested kind, and connects.
    pub async fn launch(
        kind: BrowserKind,
        viewport: Option<ViewportSize>,
        headless: bool,
    ) -> Result<Self> {
        info!("Connecting to {:?} WebDriver", kind);

        let webdriver_url = GLOBAL_DRIVER_MANAGER
            .ensure_driver(kind)
            .await
            .map_err(Error::Driver)?;

        let caps = Self::capabilities(kind, viewport.as_ref(), headless)?;

        debug!("Connecting to WebDriver at {}", webdriver_url);

        let client = match ClientBuilder::rustls()
            .capabilities(caps.clone())
            .connect(&webdriver_url)
            .await
        {
            Ok(client) => client,
            Err(e) => {
                let error_str = e.to_string();
                if error_str.contains("Session is already started")
                    || error_str.contains("session not created")
                {
                    // Driver is in a bad state; restart it and retry once
                    info!("WebDriver appears to be in a bad state, attempting recovery...");

                    GLOBAL_DRIVER_MANAGER.kill_driver(kind);
                    tokio::time::sleep(std::time::Duration::from_millis(500)).await;

                    let new_url = GLOBAL_DRIVER_MANAGER
                        .ensure_driver(kind)
                        .await
                        .map_err(Error::Driver)?;

                    ClientBuilder::rustls()
                        .capabilities(caps)
                        .connect(&new_url)
                        .await?
                } else {
                    return Err(e.into());
                }
            }
        };

        // Window sizing after connect is best-effort
        if let Some(vp) = viewport {
            debug!("Setting viewport to {}x{}", vp.width, vp.height);
            if let Err(e) = client.set_window_size(vp.width, vp.height).await {
                debug!("Note: Could not set window size: {}", e);
            }
        }

        Ok(Page { client, kind })
    }

    fn capabilities(
        kind: BrowserKind,
        viewport: Option<&ViewportSize>,
        headless: bool,
    ) -> Result<serde_json::Map<String, serde_json::Value>> {
        let mut caps = serde_json::Map::new();

        match kind {
            BrowserKind::Firefox => {
                let mut firefox_opts = serde_json::Map::new();
                let mut args = Vec::new();

                if headless {
                    args.push("--headless".to_string());
                }

                if let Some(vp) = viewport {
                    args.push(format!("--width={}", vp.width));
                    args.push(format!("--height={}", vp.height));
                }

                firefox_opts.insert("args".to_string(), json!(args));
                caps.insert("moz:firefoxOptions".to_string(), json!(firefox_opts));
            }
            BrowserKind::Chrome => {
                let mut chrome_opts = serde_json::Map::new();
                let mut args = vec!["--no-sandbox".to_string()];

                if headless {
                    // Chrome 112+ headless syntax
                    args.push("--headless=new".to_string());
                    args.push("--disable-gpu".to_string());
                    args.push("--disable-dev-shm-usage".to_string());
                }

                if let Some(vp) = viewport {
                    args.push(format!("--window-size={},{}", vp.width, vp.height));
                }

                // Chrome refuses to share a profile directory between sessions
                let profile_dir = tempfile::Builder::new()
                    .prefix("sitecheck-chrome-")
                    .tempdir()
                    .map_err(|e| Error::Driver(anyhow!(e)))?;
                #[allow(deprecated)]
                let profile_path = profile_dir.into_path();
                args.push(format!("--user-data-dir={}", profile_path.display()));

                chrome_opts.insert("args".to_string(), json!(args));
                caps.insert("goog:chromeOptions".to_string(), json!(chrome_opts));
            }
        }

        Ok(caps)
    }

    /// The browser kind this page runs in.
    pub fn kind(&self) -> BrowserKind {
        self.kind
    }

    /// Load a document and suspend until navigation settles.
    pub async fn navigate(&self, url: &str) -> Result<()> {
        info!("Navigating to {}", url);

        self.client.goto(url).await?;

        // Wait for the document to be ready; avoids stale element races
        let wait_script = "return document.readyState === 'complete';";
        for _ in 0..20 {
            // Max 2 seconds
            match self.client.execute(wait_script, vec![]).await {
                Ok(val) if val.as_bool().unwrap_or(false) => break,
                _ => {
                    tokio::time::sleep(tokio::time::Duration::from_millis(100)).await;
                }
            }
        }

        Ok(())
    }

    /// The current document URL.
    pub async fn current_url(&self) -> Result<url::Url> {
        Ok(self.client.current_url().await?)
    }

    /// The current document title.
    pub async fn title(&self) -> Result<String> {
        let value = self.client.execute("return document.title;", vec![]).await?;
        Ok(value.as_str().unwrap_or_default().to_string())
    }

    /// Resolve a reference against the live page, returning all matches
    /// after the reference's text predicate. May legitimately be empty;
    /// count queries rely on that.
    pub async fn resolve_all(&self, target: &ElementRef) -> Result<Vec<Element>> {
        debug!("Resolving {}", target);

        let candidates = self
            .client
            .find_all(Locator::Css(target.selector()))
            .await?;

        let Some(filter) = target.text() else {
            return Ok(candidates);
        };

        let mut matched = Vec::new();
        for element in candidates {
            // textContent rather than rendered text, so controls inside a
            // closed menu still match their reference
            let text = element.prop("textContent").await?.unwrap_or_default();
            if filter.matches(&text) {
                matched.push(element);
            }
        }
        Ok(matched)
    }

    /// Resolve a reference to exactly one live element.
    ///
    /// Zero matches is `ElementNotFound`. Several matches pick the
    /// reference's nth index, defaulting to the first match.
    pub async fn resolve(&self, target: &ElementRef) -> Result<Element> {
        let matched = self.resolve_all(target).await?;
        let total = matched.len();
        matched
            .into_iter()
            .nth(target.index())
            .ok_or_else(|| {
                debug!("{} matched {} element(s)", target, total);
                Error::ElementNotFound {
                    selector: target.to_string(),
                }
            })
    }

    /// How many live elements the reference matches right now.
    pub async fn count(&self, target: &ElementRef) -> Result<usize> {
        Ok(self.resolve_all(target).await?.len())
    }

    /// Read an attribute off the resolved element.
    pub async fn attr(&self, target: &ElementRef, name: &str) -> Result<Option<String>> {
        let element = self.resolve(target).await?;
        Ok(element.attr(name).await?)
    }

    /// Resolve and click, with no interactability pre-checks. Composite
    /// operations that need the full taxonomy go through
    /// [`crate::page_object::UiModel`] instead.
    pub async fn click(&self, target: &ElementRef) -> Result<()> {
        let element = self.resolve(target).await?;
        debug!("Clicking {}", target);
        element.click().await?;
        Ok(())
    }

    /// Execute a synchronous script fragment in the page, returning its
    /// JSON result.
    pub async fn execute(
        &self,
        script: &str,
        args: Vec<serde_json::Value>,
    ) -> Result<serde_json::Value> {
        Ok(self.client.execute(script, args).await?)
    }

    /// Run an asynchronous payload inside the page's own script context
    /// with access to one target element.
    ///
    /// The payload receives the resolved element as `arguments[0]` and a
    /// completion callback as `arguments[1]`; the call suspends until the
    /// callback fires and relays exactly one structured result back. No
    /// timeout is imposed here; callers needing a bounded wait wrap this
    /// in their own deadline.
    pub async fn run_in_page_context(
        &self,
        payload: &str,
        target: &ElementRef,
    ) -> Result<serde_json::Value> {
        let element = self.resolve(target).await?;
        let arg = serde_json::to_value(&element)
            .map_err(|e| Error::ProbeFailed(format!("element reference not serializable: {e}")))?;

        debug!("Running in-page payload against {}", target);
        self.client
            .execute_async(payload, vec![arg])
            .await
            .map_err(|e| Error::ProbeFailed(e.to_string()))
    }

    /// Scroll the window by a pixel delta.
    pub async fn scroll_by(&self, by_x: i64, by_y: i64) -> Result<()> {
        let script = format!("window.scrollBy({}, {});", by_x, by_y);
        debug!("Executing scroll: {}", script);
        self.client.execute(&script, vec![]).await?;
        Ok(())
    }

    /// Ordered snapshot of the cookies in the current browsing context.
    /// Re-queries the live context on every call; nothing is cached.
    pub async fn cookies(&self) -> Result<CookieSnapshot> {
        let cookies = self.client.get_all_cookies().await?;
        Ok(cookies.iter().map(CookieRecord::from).collect())
    }

    /// Handles of all windows in this session.
    pub async fn window_handles(&self) -> Result<Vec<WindowHandle>> {
        Ok(self.client.windows().await?)
    }

    /// Switch this session's focus to another window.
    pub async fn switch_to(&self, handle: WindowHandle) -> Result<()> {
        self.client.switch_to_window(handle).await?;
        Ok(())
    }

    /// Suspend until a window not present in `known` appears, as a side
    /// effect of an interaction that opens a new tab.
    ///
    /// Polls without an internal deadline; callers wrap this in their own
    /// timeout when a bounded wait is needed.
    pub async fn wait_for_new_page(&self, known: &[WindowHandle]) -> Result<WindowHandle> {
        debug!("Waiting for a new page ({} known windows)", known.len());
        loop {
            let handles = self.client.windows().await?;
            if let Some(new) = handles.into_iter().find(|h| !known.contains(h)) {
                info!("New page detected");
                return Ok(new);
            }
            tokio::time::sleep(tokio::time::Duration::from_millis(100)).await;
        }
    }

    /// Close the session and the browser window it drives.
    pub async fn close(self) -> Result<()> {
        self.client.close().await?;
        Ok(())
    }
}
