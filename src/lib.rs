//! # sitecheck
#![allow(clippy::uninlined_format_args)]
//!
//! End-to-end UI verification suite for the marketing site, driving real
//! browsers over the WebDriver protocol.
//!
//! Scenario code talks to two things: a [`UiModel`] that names the site's
//! controls and orchestrates interactions (consent banner, locale
//! dropdown, registration and shop links, back-to-top), and the viewport
//! probe [`probe::is_in_viewport`], which answers whether one element is
//! currently inside the rendered viewport by running a one-shot
//! `IntersectionObserver` payload inside the page itself.
//!
//! Element references resolve lazily at each interaction, so navigation
//! never leaves a reference stale, and the selectors live in exactly one
//! place — the [`Catalogue`]. Scenarios are pure consumers.
//!
//! ## Usage
//!
//! ```no_run
//! use sitecheck::{probe, BrowserKind, Page, UiModel};
//!
//! # async fn example() -> sitecheck::Result<()> {
//! let page = Page::launch(
//!     BrowserKind::Firefox,
//!     None, // default viewport
//!     true, // headless
//! )
//! .await?;
//!
//! let base = url::Url::parse("https://www.tapio.one/").expect("static url");
//! let model = UiModel::new(&page, base);
//!
//! model.goto().await?;
//! model.accept_all_cookies().await?;
//!
//! model.open_locale_menu().await?;
//! model.switch_to_locale("de").await?;
//! assert!(page.current_url().await?.path().starts_with("/de/"));
//!
//! model.scroll_to_top().await?;
//! assert!(probe::is_in_viewport(&page, &model.catalogue.header).await?);
//!
//! page.close().await?;
//! # Ok(())
//! # }
//! ```
//!
//! Every interaction suspends while the browser works; drive one [`Page`]
//! from one logical thread of control at a time. Failures surface as one
//! of the typed [`Error`] conditions — nothing is retried internally, so
//! the scenario runner stays in charge of retry policy.

/// Failure taxonomy surfaced to scenario code
pub mod errors;

/// Control catalogue and composite interaction operations
pub mod page_object;

/// In-viewport detection via an in-page observation payload
pub mod probe;

/// Lazily resolved element references
pub mod selector;

/// Shared value types (viewport sizes, cookie snapshots)
pub mod types;

/// WebDriver page handle and browser control
pub mod webdriver;

/// Automatic WebDriver process management
pub mod webdriver_manager;

pub use errors::{Error, Result};
pub use page_object::{Catalogue, UiModel};
pub use selector::{ElementRef, TextMatch};
pub use types::{CookieRecord, CookieSnapshot, ViewportSize};
pub use webdriver::{BrowserKind, Page};
