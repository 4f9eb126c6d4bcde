//! HTML extractor for the references a page needs mirrored
//!
//! This module parses fetched HTML and collects, in document order:
//! - Script sources (`<script src>`)
//! - Stylesheet and other link targets (`<link href>`)
//! - Image sources (`<img src>`)
//! - Anchors to follow (`<a href>`), scoped by page region

use crate::config::ScopeConfig;
use crate::ConfigError;
use scraper::node::Element;
use scraper::{ElementRef, Html, Selector};

/// How many leading bytes are inspected when sniffing for binary content
const SNIFF_LEN: usize = 1024;

/// One reference found in a page, tagged with what kind of element held it
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExtractedReference {
    Script(String),
    Stylesheet(String),
    Image(String),
    Anchor(String),
}

impl ExtractedReference {
    /// The reference exactly as it appeared in the markup
    pub fn raw(&self) -> &str {
        match self {
            Self::Script(raw) | Self::Stylesheet(raw) | Self::Image(raw) | Self::Anchor(raw) => {
                raw
            }
        }
    }

    /// Short name used in log output
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Script(_) => "script",
            Self::Stylesheet(_) => "link",
            Self::Image(_) => "image",
            Self::Anchor(_) => "anchor",
        }
    }
}

/// References extracted from one page
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractedPage {
    pub scripts: Vec<String>,
    pub stylesheets: Vec<String>,
    pub images: Vec<String>,
    pub anchors: Vec<String>,
}

impl ExtractedPage {
    /// Scripts, then stylesheets, then images
    pub fn assets(&self) -> impl Iterator<Item = ExtractedReference> + '_ {
        let scripts = self.scripts.iter().cloned().map(ExtractedReference::Script);
        let stylesheets = self
            .stylesheets
            .iter()
            .cloned()
            .map(ExtractedReference::Stylesheet);
        let images = self.images.iter().cloned().map(ExtractedReference::Image);

        scripts.chain(stylesheets).chain(images)
    }

    /// Total number of references
    pub fn len(&self) -> usize {
        self.scripts.len() + self.stylesheets.len() + self.images.len() + self.anchors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A simple element rule: `tag`, `.class`, or `tag.class[.class…]`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegionRule {
    tag: Option<String>,
    classes: Vec<String>,
}

impl RegionRule {
    /// Parses a rule string
    ///
    /// # Examples
    ///
    /// ```
    /// use site_mirror::crawler::RegionRule;
    ///
    /// assert!(RegionRule::parse(".sidebar").is_ok());
    /// assert!(RegionRule::parse("article.product_page").is_ok());
    /// assert!(RegionRule::parse("div > a").is_err());
    /// ```
    pub fn parse(rule: &str) -> Result<Self, ConfigError> {
        let rule = rule.trim();
        let mut parts = rule.split('.');

        let tag = match parts.next() {
            Some("") => None,
            Some(tag) => Some(tag.to_ascii_lowercase()),
            None => None,
        };
        let classes: Vec<String> = parts.map(str::to_string).collect();

        let identifiers = tag.iter().chain(classes.iter());
        let mut seen_any = false;
        for ident in identifiers {
            seen_any = true;
            if ident.is_empty()
                || !ident
                    .chars()
                    .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
            {
                return Err(ConfigError::InvalidRule(format!(
                    "'{}' must be a tag, .class or tag.class",
                    rule
                )));
            }
        }

        if !seen_any {
            return Err(ConfigError::InvalidRule("rule cannot be empty".to_string()));
        }

        Ok(Self { tag, classes })
    }

    /// Returns true if the element satisfies this rule
    pub fn matches(&self, element: &Element) -> bool {
        let tag_matches = self
            .tag
            .as_deref()
            .map_or(true, |tag| element.name().eq_ignore_ascii_case(tag));

        tag_matches
            && self
                .classes
                .iter()
                .all(|class| element.classes().any(|c| c == class.as_str()))
    }
}

/// Decides which anchors on a page are followed
///
/// An anchor is followed when it sits inside the sidebar region, or when it
/// sits outside the main-content region. Anchors inside the main content
/// (for example a "recently viewed" rail on a product page) are ignored
/// unless they are also inside the sidebar.
#[derive(Debug, Clone)]
pub struct AnchorScope {
    sidebar: RegionRule,
    main_content: RegionRule,
}

impl AnchorScope {
    pub fn new(sidebar: RegionRule, main_content: RegionRule) -> Self {
        Self {
            sidebar,
            main_content,
        }
    }

    /// Builds the scope from the `[scope]` configuration section
    pub fn from_config(config: &ScopeConfig) -> Result<Self, ConfigError> {
        Ok(Self::new(
            RegionRule::parse(&config.sidebar)?,
            RegionRule::parse(&config.main_content)?,
        ))
    }

    /// True if any ancestor of `element` is in the sidebar region
    pub fn in_sidebar(&self, element: ElementRef<'_>) -> bool {
        has_ancestor(element, &self.sidebar)
    }

    /// True if any ancestor of `element` is in the main-content region
    pub fn in_main_content(&self, element: ElementRef<'_>) -> bool {
        has_ancestor(element, &self.main_content)
    }

    /// True if the anchor should be followed
    pub fn follows(&self, element: ElementRef<'_>) -> bool {
        self.in_sidebar(element) || !self.in_main_content(element)
    }
}

impl Default for AnchorScope {
    fn default() -> Self {
        Self::new(
            RegionRule {
                tag: None,
                classes: vec!["sidebar".to_string()],
            },
            RegionRule {
                tag: Some("article".to_string()),
                classes: vec!["product_page".to_string()],
            },
        )
    }
}

fn has_ancestor(element: ElementRef<'_>, rule: &RegionRule) -> bool {
    element
        .ancestors()
        .filter_map(ElementRef::wrap)
        .any(|ancestor| rule.matches(ancestor.value()))
}

/// Parses pages and extracts the references the crawl acts on
#[derive(Debug, Clone, Default)]
pub struct PageExtractor {
    scope: AnchorScope,
}

impl PageExtractor {
    pub fn new(scope: AnchorScope) -> Self {
        Self { scope }
    }

    /// Parses `bytes` as the HTML document found at `url`
    ///
    /// # Returns
    ///
    /// * `Some(ExtractedPage)` - The document parsed; references are in document order
    /// * `None` - The bytes are empty, blank, or binary and yield no usable document
    ///
    /// # Example
    ///
    /// ```
    /// use site_mirror::crawler::PageExtractor;
    ///
    /// let html = br#"<html><body><img src="a.png"><a href="b.html">B</a></body></html>"#;
    /// let page = PageExtractor::default().extract(html, "http://site/index.html").unwrap();
    /// assert_eq!(page.images, vec!["a.png"]);
    /// assert_eq!(page.anchors, vec!["b.html"]);
    /// ```
    pub fn extract(&self, bytes: &[u8], url: &str) -> Option<ExtractedPage> {
        if !is_usable_document(bytes) {
            tracing::debug!("No usable document at {}", url);
            return None;
        }

        let text = String::from_utf8_lossy(bytes);
        let document = Html::parse_document(&text);

        let page = ExtractedPage {
            scripts: collect_attr(&document, "script[src]", "src"),
            stylesheets: collect_attr(&document, "link[href]", "href"),
            images: collect_attr(&document, "img[src]", "src"),
            anchors: self.collect_anchors(&document),
        };

        tracing::debug!(
            "Extracted from {}: {} scripts, {} links, {} images, {} anchors",
            url,
            page.scripts.len(),
            page.stylesheets.len(),
            page.images.len(),
            page.anchors.len()
        );

        Some(page)
    }

    fn collect_anchors(&self, document: &Html) -> Vec<String> {
        let mut anchors = Vec::new();

        if let Ok(selector) = Selector::parse("a[href]") {
            for element in document.select(&selector) {
                if !self.scope.follows(element) {
                    continue;
                }
                if let Some(href) = element.value().attr("href") {
                    if is_fetchable(href) {
                        anchors.push(href.trim().to_string());
                    }
                }
            }
        }

        anchors
    }
}

/// Collects one attribute from every element matching `selector`
fn collect_attr(document: &Html, selector: &str, attr: &str) -> Vec<String> {
    let mut values = Vec::new();

    if let Ok(selector) = Selector::parse(selector) {
        for element in document.select(&selector) {
            if let Some(value) = element.value().attr(attr) {
                if is_fetchable(value) {
                    values.push(value.trim().to_string());
                }
            }
        }
    }

    values
}

/// Empty, blank, or binary bodies are not documents
fn is_usable_document(bytes: &[u8]) -> bool {
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return false;
    }

    !bytes.iter().take(SNIFF_LEN).any(|b| *b == 0)
}

/// Returns false for references that never name a downloadable resource:
/// empty values, same-page fragments, and `javascript:`, `mailto:`, `tel:`
/// and `data:` URIs
fn is_fetchable(reference: &str) -> bool {
    let reference = reference.trim();

    if reference.is_empty() || reference.starts_with('#') {
        return false;
    }

    let lower = reference.to_ascii_lowercase();
    !(lower.starts_with("javascript:")
        || lower.starts_with("mailto:")
        || lower.starts_with("tel:")
        || lower.starts_with("data:"))
}
