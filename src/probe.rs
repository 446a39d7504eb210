//! In-viewport detection for a single element, measured from outside the
//! browser process.
//!
//! The driver cannot see layout directly; the answer has to come from the
//! page's own script context. The payload below registers a one-shot
//! `IntersectionObserver` on the target element and resolves with the
//! first reported intersection ratio, disconnecting the observer before
//! the result crosses back over the WebDriver channel. Each call is
//! independent: no observer survives a call, however often it is invoked.

use serde_json::Value;
use tracing::debug;

use crate::errors::{Error, Result};
use crate::selector::ElementRef;
use crate::webdriver::Page;

/// One-shot observation payload run inside the page.
///
/// `arguments[0]` is the target element, `arguments[1]` the completion
/// callback supplied by the async-script channel. The observer is
/// disconnected on every exit path: first measurement (any ratio,
/// including zero) and payload error alike.
const OBSERVE_INTERSECTION: &str = r#"
    var target = arguments[0];
    var done = arguments[1];
    try {
        var observer = new IntersectionObserver(function (entries) {
            observer.disconnect();
            done({ ratio: entries[0].intersectionRatio });
        });
        observer.observe(target);
        requestAnimationFrame(function () {});
    } catch (err) {
        done({ error: String(err) });
    }
"#;

/// Whether the element referenced by `target` currently intersects the
/// visible viewport.
///
/// Intersection is computed purely geometrically: an element overlapping
/// the viewport rectangle counts as visible even when another element
/// paints over it. An element with no rendered area (`display: none`,
/// zero width or height) reports `false` regardless of scroll position.
///
/// Zero matches for `target` fail with [`Error::ElementNotFound`]; with
/// several matches the reference's own disambiguation applies, defaulting
/// to the first match. The call suspends until the page delivers the
/// first measurement, with no implicit timeout; callers needing a bounded
/// wait impose their own deadline.
pub async fn is_in_viewport(page: &Page, target: &ElementRef) -> Result<bool> {
    let result = page.run_in_page_context(OBSERVE_INTERSECTION, target).await?;
    let visible = interpret(&result)?;
    debug!("{} intersects viewport: {}", target, visible);
    Ok(visible)
}

/// Convert the observer payload's result into the probe's answer.
fn interpret(result: &Value) -> Result<bool> {
    if let Some(err) = result.get("error").and_then(Value::as_str) {
        return Err(Error::ProbeFailed(err.to_string()));
    }
    match result.get("ratio").and_then(Value::as_f64) {
        Some(ratio) => Ok(ratio > 0.0),
        None => Err(Error::ProbeFailed(format!(
            "unexpected observer result: {result}"
        ))),
    }
}

#[cfg(test)]
#[path = "probe_test.rs"]
mod probe_test;
