use thiserror::Error;

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Failure conditions surfaced to scenario code.
///
/// Nothing in this crate retries or recovers silently: every failed
/// operation maps to exactly one of these variants so that the scenario
/// runner can decide whether to retry, skip, or fail the scenario.
#[derive(Debug, Error)]
pub enum Error {
    /// A selector resolved to zero live elements.
    #[error("no element matches {selector}")]
    ElementNotFound {
        /// The reference that failed to resolve, in display form.
        selector: String,
    },

    /// A control resolved but cannot be activated right now
    /// (hidden, disabled, or obstructed by another element).
    #[error("control '{control}' is not interactable: {reason}")]
    ControlNotInteractable {
        /// Semantic name of the control, as known to the catalogue.
        control: String,
        /// What made the activation impossible.
        reason: String,
    },

    /// A locale switch was requested for a code with no matching control.
    #[error("no locale control matches '{0}'")]
    LocaleNotSupported(String),

    /// The in-page observation payload threw, produced an unexpected
    /// result, or its context was torn down mid-flight.
    #[error("in-page probe failed: {0}")]
    ProbeFailed(String),

    /// A WebDriver command failed for a reason outside the taxonomy above.
    #[error("webdriver command failed: {0}")]
    WebDriver(#[from] fantoccini::error::CmdError),

    /// Establishing the browser session itself failed.
    #[error("failed to establish browser session: {0}")]
    Session(#[from] fantoccini::error::NewSessionError),

    /// The managed driver process could not be started or reached.
    #[error("driver process error: {0}")]
    Driver(#[source] anyhow::Error),
}

impl Error {
    /// Classify a click failure against a named control.
    ///
    /// WebDriver reports obstruction and hidden/disabled targets through
    /// command errors rather than a dedicated status, so the message text
    /// is the only signal available across geckodriver and chromedriver.
    pub(crate) fn from_activation(control: &str, err: fantoccini::error::CmdError) -> Error {
        let msg = err.to_string();
        if is_interactability_failure(&msg) {
            Error::ControlNotInteractable {
                control: control.to_string(),
                reason: msg,
            }
        } else {
            Error::WebDriver(err)
        }
    }
}

/// Whether a WebDriver error message describes a target that exists but
/// cannot be activated. Covers the phrasings geckodriver and chromedriver
/// use for hidden, disabled, and obstructed elements.
fn is_interactability_failure(msg: &str) -> bool {
    msg.contains("not interactable")
        || msg.contains("intercepted")
        || msg.contains("not visible")
        || msg.contains("not clickable")
}

#[cfg(test)]
#[path = "errors_test.rs"]
mod errors_test;
