use std::fmt;

/// Text predicate applied to candidates after CSS matching.
///
/// Matching runs against `textContent`, not the rendered text, so a
/// control inside a closed dropdown still matches its reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TextMatch {
    /// Element text must contain the fragment.
    Contains(String),
    /// Element text must contain at least one of the fragments.
    AnyOf(Vec<String>),
}

impl TextMatch {
    /// Whether the given element text satisfies this predicate.
    pub fn matches(&self, text: &str) -> bool {
        match self {
            TextMatch::Contains(fragment) => text.contains(fragment.as_str()),
            TextMatch::AnyOf(fragments) => fragments.iter().any(|f| text.contains(f.as_str())),
        }
    }
}

/// A lazily resolved reference to one element on the page.
///
/// An `ElementRef` is a CSS selector plus optional disambiguation (a text
/// predicate, an nth-match index, or both). It never holds a live DOM
/// node: resolution happens against the page at the moment of each
/// interaction, so a navigation can never leave a reference stale.
///
/// Immutable once constructed; the builder methods consume and return.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElementRef {
    selector: String,
    text: Option<TextMatch>,
    nth: Option<usize>,
}

impl ElementRef {
    /// Reference the first element matching a CSS selector.
    pub fn new(selector: impl Into<String>) -> Self {
        ElementRef {
            selector: selector.into(),
            text: None,
            nth: None,
        }
    }

    /// Narrow to elements whose text contains the fragment.
    pub fn with_text(mut self, fragment: impl Into<String>) -> Self {
        self.text = Some(TextMatch::Contains(fragment.into()));
        self
    }

    /// Narrow to elements whose text contains any of the fragments.
    pub fn with_text_any<I, S>(mut self, fragments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.text = Some(TextMatch::AnyOf(
            fragments.into_iter().map(Into::into).collect(),
        ));
        self
    }

    /// Pick the nth element (0-based) among the filtered matches.
    pub fn nth(mut self, index: usize) -> Self {
        self.nth = Some(index);
        self
    }

    /// The underlying CSS selector.
    pub fn selector(&self) -> &str {
        &self.selector
    }

    /// The text predicate, if any.
    pub fn text(&self) -> Option<&TextMatch> {
        self.text.as_ref()
    }

    /// Which match to pick; defaults to the first.
    pub fn index(&self) -> usize {
        self.nth.unwrap_or(0)
    }

    /// Whether this reference deliberately aliases a later match.
    pub fn is_disambiguated(&self) -> bool {
        self.nth.is_some()
    }
}

impl fmt::Display for ElementRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "'{}'", self.selector)?;
        match &self.text {
            Some(TextMatch::Contains(fragment)) => write!(f, " with text \"{}\"", fragment)?,
            Some(TextMatch::AnyOf(fragments)) => {
                write!(f, " with text in {:?}", fragments)?;
            }
            None => {}
        }
        if let Some(nth) = self.nth {
            write!(f, " (match #{})", nth)?;
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "selector_test.rs"]
mod selector_test;
