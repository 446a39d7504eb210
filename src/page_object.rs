//! Declarative page-object layer for the marketing site.
//!
//! The catalogue gives scenario code stable semantic names for UI
//! controls; composite operations orchestrate catalogue lookups, clicks,
//! and the viewport probe. Scenarios never touch raw selectors: when the
//! site's markup churns, only the catalogue changes.

use std::collections::BTreeMap;

use fantoccini::wd::WindowHandle;
use tracing::{debug, info};
use url::Url;

use crate::errors::{Error, Result};
use crate::probe;
use crate::selector::ElementRef;
use crate::types::CookieSnapshot;
use crate::webdriver::Page;

/// Fixed mapping from semantic control names to element references.
///
/// Built once per [`UiModel`] and immutable thereafter; constructing it
/// touches no DOM. Every name maps to exactly one reference, and no two
/// entries alias the same element except where deliberately selected by
/// nth-occurrence (the shop link, which is the second "Shop" text match
/// on the page).
#[derive(Debug, Clone)]
pub struct Catalogue {
    /// Consent banner: accept every category.
    pub accept_all_cookies: ElementRef,
    /// Consent banner: save the preselected default categories.
    pub accept_default_cookies: ElementRef,
    /// Consent banner: deny every optional category.
    pub deny_all_cookies: ElementRef,
    /// Floating back-to-top affordance.
    pub scroll_to_top: ElementRef,
    /// Nav toggle that opens the locale dropdown.
    pub locale_menu: ElementRef,
    /// Nav toggle that opens the account dropdown.
    pub account_menu: ElementRef,
    /// Registration entry inside the account dropdown.
    pub registration: ElementRef,
    /// Shop link; deliberately the second "Shop" text match.
    pub shop: ElementRef,
    /// Analytics script element injected after consent.
    pub analytics_script: ElementRef,
    /// Page header.
    pub header: ElementRef,
    /// Page footer.
    pub footer: ElementRef,
    locales: BTreeMap<&'static str, ElementRef>,
}

impl Catalogue {
    /// The control catalogue for the marketing site under test.
    pub fn for_marketing_site() -> Self {
        let mut locales = BTreeMap::new();
        locales.insert("de", ElementRef::new("button").with_text("DE"));
        locales.insert("en", ElementRef::new("button").with_text("EN"));

        Catalogue {
            accept_all_cookies: ElementRef::new(r#"[data-testid="uc-accept-all-button"]"#),
            accept_default_cookies: ElementRef::new(r#"[data-testid="uc-save-button"]"#),
            deny_all_cookies: ElementRef::new(r#"[data-testid="uc-deny-all-button"]"#),
            scroll_to_top: ElementRef::new(".back-to-top"),
            locale_menu: ElementRef::new(".nav-link").with_text("language"),
            account_menu: ElementRef::new(".nav-link").with_text("My tapio"),
            registration: ElementRef::new(".dropdown-item")
                .with_text_any(["Registrieren", "Register"]),
            shop: ElementRef::new("a").with_text("Shop").nth(1),
            analytics_script: ElementRef::new(
                r#"script[src="https://www.google-analytics.com/analytics.js"]"#,
            ),
            header: ElementRef::new(".header"),
            footer: ElementRef::new("footer"),
            locales,
        }
    }

    /// The locale control for a code, if the site offers that locale.
    pub fn locale(&self, code: &str) -> Option<&ElementRef> {
        self.locales.get(code)
    }

    /// Locale codes the catalogue knows, in stable order.
    pub fn locale_codes(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.locales.keys().copied()
    }

    /// Every named entry, for invariant checks.
    pub fn entries(&self) -> Vec<(&'static str, &ElementRef)> {
        let mut entries = vec![
            ("accept_all_cookies", &self.accept_all_cookies),
            ("accept_default_cookies", &self.accept_default_cookies),
            ("deny_all_cookies", &self.deny_all_cookies),
            ("scroll_to_top", &self.scroll_to_top),
            ("locale_menu", &self.locale_menu),
            ("account_menu", &self.account_menu),
            ("registration", &self.registration),
            ("shop", &self.shop),
            ("analytics_script", &self.analytics_script),
            ("header", &self.header),
            ("footer", &self.footer),
        ];
        for (code, control) in self.locales.iter() {
            entries.push((*code, control));
        }
        entries
    }
}

/// Page-object model over one live [`Page`].
///
/// Borrows the page for the scenario's lifetime; the catalogue is built
/// once at construction and never mutated. Composite operations either
/// fully succeed or fail with one precise error naming the sub-step;
/// there are no internal retries and no compensating rollback — partial
/// interactions leave the page in whatever state they produced.
pub struct UiModel<'p> {
    page: &'p Page,
    base: Url,
    /// The control catalogue this model resolves against.
    pub catalogue: Catalogue,
}

impl<'p> UiModel<'p> {
    /// Build the model for a page, rooted at the site's base URL.
    /// Pure data; no DOM or network access happens here.
    pub fn new(page: &'p Page, base: Url) -> Self {
        UiModel {
            page,
            base,
            catalogue: Catalogue::for_marketing_site(),
        }
    }

    /// The page this model drives.
    pub fn page(&self) -> &Page {
        self.page
    }

    /// Navigate to the site's landing document.
    pub async fn goto(&self) -> Result<()> {
        self.page.navigate(self.base.as_str()).await
    }

    /// Resolve a catalogue control and perform a single activation.
    ///
    /// Hidden or disabled controls fail before any click is dispatched;
    /// obstructed clicks are classified from the driver's response.
    async fn activate(&self, control: &str, target: &ElementRef) -> Result<()> {
        let element = self.page.resolve(target).await?;

        if !element.is_displayed().await? {
            return Err(Error::ControlNotInteractable {
                control: control.to_string(),
                reason: "control is not visible".to_string(),
            });
        }
        if !element.is_enabled().await? {
            return Err(Error::ControlNotInteractable {
                control: control.to_string(),
                reason: "control is disabled".to_string(),
            });
        }

        debug!("Activating '{}' via {}", control, target);
        element
            .click()
            .await
            .map_err(|e| Error::from_activation(control, e))
    }

    /// Accept every cookie category on the consent banner.
    pub async fn accept_all_cookies(&self) -> Result<()> {
        self.activate("accept all cookies", &self.catalogue.accept_all_cookies)
            .await
    }

    /// Save the preselected default consent categories.
    pub async fn accept_default_cookies(&self) -> Result<()> {
        self.activate(
            "accept default cookies",
            &self.catalogue.accept_default_cookies,
        )
        .await
    }

    /// Deny every optional cookie category.
    pub async fn deny_all_cookies(&self) -> Result<()> {
        self.activate("deny all cookies", &self.catalogue.deny_all_cookies)
            .await
    }

    /// Open the locale dropdown in the nav.
    pub async fn open_locale_menu(&self) -> Result<()> {
        self.activate("locale menu", &self.catalogue.locale_menu).await
    }

    /// Switch the document locale.
    ///
    /// Opens the locale menu first when the target control is not yet
    /// visible, then activates the control matching `code`. Fails with
    /// [`Error::LocaleNotSupported`] when no control matches the code.
    pub async fn switch_to_locale(&self, code: &str) -> Result<()> {
        let Some(control) = self.catalogue.locale(code) else {
            return Err(Error::LocaleNotSupported(code.to_string()));
        };

        let element = match self.page.resolve(control).await {
            Ok(element) => element,
            Err(Error::ElementNotFound { .. }) => {
                return Err(Error::LocaleNotSupported(code.to_string()));
            }
            Err(e) => return Err(e),
        };

        if !element.is_displayed().await? {
            // Locale buttons only become interactable once the menu is open
            self.open_locale_menu().await?;
        }

        info!("Switching locale to '{}'", code);
        self.activate(&format!("locale '{code}'"), control).await
    }

    /// Activate the back-to-top affordance.
    ///
    /// Does not verify the scroll completed; position verification is the
    /// caller's job via [`probe::is_in_viewport`].
    pub async fn scroll_to_top(&self) -> Result<()> {
        self.activate("back to top", &self.catalogue.scroll_to_top)
            .await
    }

    /// Open the account dropdown in the nav.
    pub async fn open_account_menu(&self) -> Result<()> {
        self.activate("account menu", &self.catalogue.account_menu)
            .await
    }

    /// Activate the registration entry in the open account menu and wait
    /// for the tab it spawns, returning the new window's handle.
    pub async fn press_registration(&self) -> Result<WindowHandle> {
        let known = self.page.window_handles().await?;
        self.activate("registration link", &self.catalogue.registration)
            .await?;
        self.page.wait_for_new_page(&known).await
    }

    /// Activate the shop link and wait for the tab it spawns, returning
    /// the new window's handle.
    pub async fn open_shop(&self) -> Result<WindowHandle> {
        let known = self.page.window_handles().await?;
        self.activate("shop link", &self.catalogue.shop).await?;
        self.page.wait_for_new_page(&known).await
    }

    /// The shop link's href attribute, read from the live page.
    pub async fn shop_link_href(&self) -> Result<Option<String>> {
        self.page.attr(&self.catalogue.shop, "href").await
    }

    /// How many analytics script elements the document carries right now.
    pub async fn analytics_script_count(&self) -> Result<usize> {
        self.page.count(&self.catalogue.analytics_script).await
    }

    /// Fresh snapshot of the browsing context's cookies. Never cached.
    pub async fn cookies(&self) -> Result<CookieSnapshot> {
        self.page.cookies().await
    }

    /// Whether a catalogue control currently intersects the viewport.
    pub async fn is_in_viewport(&self, target: &ElementRef) -> Result<bool> {
        probe::is_in_viewport(self.page, target).await
    }
}

#[cfg(test)]
#[path = "page_object_test.rs"]
mod page_object_test;
