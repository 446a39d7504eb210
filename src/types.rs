use anyhow::Result;
use serde::{Deserialize, Serialize};

/// Browser viewport dimensions
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ViewportSize {
    /// Viewport width in pixels
    pub width: u32,
    /// Viewport height in pixels
    pub height: u32,
}

impl ViewportSize {
    /// Parse viewport size from "WIDTHxHEIGHT" format (e.g., "1920x1080")
    pub fn parse(s: &str) -> Result<Self> {
        let parts: Vec<&str> = s.split('x').collect();
        if parts.len() != 2 {
            anyhow::bail!("Invalid viewport format. Use WIDTHxHEIGHT (e.g., 1920x1080)");
        }

        let width = parts[0]
            .parse::<u32>()
            .map_err(|_| anyhow::anyhow!("Invalid width in viewport size"))?;
        let height = parts[1]
            .parse::<u32>()
            .map_err(|_| anyhow::anyhow!("Invalid height in viewport size"))?;

        Ok(ViewportSize { width, height })
    }
}

/// One cookie as reported by the browsing context.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CookieRecord {
    /// Cookie name
    pub name: String,
    /// Cookie value
    pub value: String,
    /// Domain the cookie applies to, if the browser reports one
    pub domain: Option<String>,
    /// Path the cookie applies to, if the browser reports one
    pub path: Option<String>,
    /// Whether the cookie is restricted to secure transports
    pub secure: bool,
    /// Whether the cookie is hidden from page script
    pub http_only: bool,
}

impl From<&fantoccini::cookies::Cookie<'_>> for CookieRecord {
    fn from(cookie: &fantoccini::cookies::Cookie<'_>) -> Self {
        CookieRecord {
            name: cookie.name().to_string(),
            value: cookie.value().to_string(),
            domain: cookie.domain().map(str::to_string),
            path: cookie.path().map(str::to_string),
            secure: cookie.secure().unwrap_or(false),
            http_only: cookie.http_only().unwrap_or(false),
        }
    }
}

/// Ordered cookies retrieved from the browsing context at a point in time.
///
/// Used only for equality and count assertions; never mutated, never
/// cached. Each retrieval re-queries the live context.
pub type CookieSnapshot = Vec<CookieRecord>;

#[cfg(test)]
#[path = "types_test.rs"]
mod types_test;
