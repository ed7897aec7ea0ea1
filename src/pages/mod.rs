// 🌐 Page Sources + Extractors
//
// A PageSource hands back a parsed document for a URL, or fails when the
// content lacks the markers the page type must carry. Extractors (one module
// per page type) read raw field values out of a Page and know nothing about
// the other pages of the season.

pub mod gamecenter;
pub mod standings;

use crate::error::{LeagueError, Result};
use scraper::{ElementRef, Html, Selector};
use std::fs;
use std::path::{Path, PathBuf};

// ============================================================================
// PAGE
// ============================================================================

/// A fetched page: raw HTML plus its parsed tree
pub struct Page {
    pub url: String,
    html: String,
    document: Html,
}

impl Page {
    pub fn parse(url: impl Into<String>, html: impl Into<String>) -> Self {
        let html = html.into();
        let document = Html::parse_document(&html);
        Page {
            url: url.into(),
            html,
            document,
        }
    }

    pub fn document(&self) -> &Html {
        &self.document
    }

    pub fn html(&self) -> &str {
        &self.html
    }

    /// First 300 characters of visible text, for error messages
    pub fn snippet(&self) -> String {
        let text = self
            .document
            .root_element()
            .text()
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .collect::<Vec<_>>()
            .join(" ");
        text.chars().take(300).collect()
    }

    pub fn select_all<'a>(&'a self, css: &str) -> Result<Vec<ElementRef<'a>>> {
        let sel = selector(css)?;
        Ok(self.document.select(&sel).collect())
    }

    pub fn select_first<'a>(&'a self, css: &str) -> Result<Option<ElementRef<'a>>> {
        let sel = selector(css)?;
        Ok(self.document.select(&sel).next())
    }
}

// ============================================================================
// QUERY HELPERS
// ============================================================================

pub fn selector(css: &str) -> Result<Selector> {
    Selector::parse(css).map_err(|e| LeagueError::Selector {
        selector: css.to_string(),
        message: e.to_string(),
    })
}

/// Text nodes joined with a single space, whitespace collapsed
pub fn element_text(element: &ElementRef) -> String {
    element
        .text()
        .flat_map(str::split_whitespace)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Text nodes concatenated without separators, trimmed
pub fn element_text_tight(element: &ElementRef) -> String {
    element
        .text()
        .map(str::trim)
        .collect::<String>()
}

pub fn first_within<'a>(element: &ElementRef<'a>, css: &str) -> Result<Option<ElementRef<'a>>> {
    let sel = selector(css)?;
    Ok(element.select(&sel).next())
}

pub fn all_within<'a>(element: &ElementRef<'a>, css: &str) -> Result<Vec<ElementRef<'a>>> {
    let sel = selector(css)?;
    Ok(element.select(&sel).collect())
}

pub fn href(element: &ElementRef) -> String {
    element.value().attr("href").unwrap_or_default().to_string()
}

// ============================================================================
// SOURCE CONTRACT
// ============================================================================

/// Phrases that mean we were served a login wall or a block page
const BLOCK_PHRASES: &[&str] = &[
    "sign in",
    "log in",
    "login",
    "access denied",
    "forbidden",
    "blocked",
    "captcha",
    "consent",
    "verify you are human",
];

pub fn looks_like_login_or_block(html: &str) -> bool {
    let lower = html.to_lowercase();
    BLOCK_PHRASES.iter().any(|phrase| lower.contains(phrase))
}

/// Every marker must appear in the raw HTML, otherwise the page is unusable
pub fn require_markers(url: &str, html: &str, must_contain: &[&str]) -> Result<()> {
    let missing: Vec<String> = must_contain
        .iter()
        .filter(|marker| !html.contains(**marker))
        .map(|marker| marker.to_string())
        .collect();

    if missing.is_empty() {
        return Ok(());
    }

    let blocked = if looks_like_login_or_block(html) {
        "; page looks like login/block content".to_string()
    } else {
        String::new()
    };

    Err(LeagueError::PageUnusable {
        url: url.to_string(),
        missing,
        blocked,
    })
}

pub trait PageSource {
    /// Fetch and parse a page, failing if any marker is absent
    fn fetch(&self, url: &str, must_contain: &[&str]) -> Result<Page>;
}

// ============================================================================
// DIRECTORY SOURCE
// ============================================================================

/// Serves pages previously saved to disk, one file per URL
pub struct DirectoryPageSource {
    root: PathBuf,
}

impl DirectoryPageSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        DirectoryPageSource { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Deterministic file name for a URL
    pub fn cache_path(&self, url: &str) -> PathBuf {
        let filename = url
            .replace("https://", "")
            .replace("http://", "")
            .replace(['/', '?', '&', '='], "_")
            + ".html";
        self.root.join(filename)
    }

    /// Save a page so later runs can read it back
    pub fn store(&self, url: &str, html: &str) -> Result<PathBuf> {
        let path = self.cache_path(url);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, html)?;
        log::debug!("Saved page: {}", path.display());
        Ok(path)
    }
}

impl PageSource for DirectoryPageSource {
    fn fetch(&self, url: &str, must_contain: &[&str]) -> Result<Page> {
        let path = self.cache_path(url);
        if !path.exists() {
            return Err(LeagueError::PageMissing {
                url: url.to_string(),
                path,
            });
        }
        let html = fs::read_to_string(&path)?;
        require_markers(url, &html, must_contain)?;
        log::debug!("Loaded page: {}", path.display());
        Ok(Page::parse(url, html))
    }
}

// ============================================================================
// TESTS
// ============================================================================
