//! HTML link extraction
//!
//! Given markup, a CSS selector and an attribute name, this module returns
//! the attribute values of every matching element in document order.
//! Elements that lack the attribute are skipped.

use crate::crawler::decode::decode_markup;
use crate::crawler::fetcher::Page;
use crate::{ExtractError, ExtractResult};
use scraper::{Html, Selector};

/// A compiled selector/attribute pair
///
/// Compiling once and sharing the result keeps the harvest tasks from
/// re-parsing the selector for every page.
#[derive(Debug, Clone)]
pub struct LinkSelector {
    css: String,
    selector: Selector,
    attribute: String,
}

impl LinkSelector {
    /// Compiles a CSS selector for extraction of `attribute`
    ///
    /// # Returns
    ///
    /// * `Ok(LinkSelector)` - The selector compiled
    /// * `Err(ExtractError::InvalidSelector)` - The CSS could not be parsed
    pub fn new(css: &str, attribute: &str) -> ExtractResult<Self> {
        let selector = Selector::parse(css).map_err(|e| ExtractError::InvalidSelector {
            selector: css.to_string(),
            message: format!("{:?}", e),
        })?;

        Ok(Self {
            css: css.to_string(),
            selector,
            attribute: attribute.to_string(),
        })
    }

    /// The CSS source this selector was compiled from
    pub fn css(&self) -> &str {
        &self.css
    }

    /// The attribute read from matched elements
    pub fn attribute(&self) -> &str {
        &self.attribute
    }

    /// Extracts attribute values from a raw body with no declared charset
    ///
    /// The body is read as UTF-8 unless it starts with a byte order mark.
    /// A body that does not decode is not parseable markup and fails the
    /// whole extraction; nothing is partially extracted.
    pub fn extract(&self, markup: &[u8]) -> ExtractResult<Vec<String>> {
        let text = decode_markup(markup, None)?;
        Ok(self.extract_str(&text))
    }

    /// Extracts attribute values from a fetched page, honouring its charset
    pub fn extract_page(&self, page: &Page) -> ExtractResult<Vec<String>> {
        let text = decode_markup(&page.body, page.content_type.as_deref())?;
        Ok(self.extract_str(&text))
    }

    /// Extracts attribute values from markup that is already text
    pub fn extract_str(&self, markup: &str) -> Vec<String> {
        let document = Html::parse_document(markup);

        document
            .select(&self.selector)
            .filter_map(|element| element.value().attr(&self.attribute))
            .map(str::to_string)
            .collect()
    }
}

/// Extracts `attribute` from every element matching `selector`
///
/// Convenience wrapper compiling the selector for a single document.
///
/// # Example
///
/// ```
/// use link_harvest::crawler::extract;
///
/// let html = r#"<a class="btn-default btn-thongso" href="/x">Specs</a>"#;
/// let links = extract(html.as_bytes(), ".btn-default.btn-thongso", "href").unwrap();
/// assert_eq!(links, vec!["/x".to_string()]);
/// ```
pub fn extract(markup: &[u8], selector: &str, attribute: &str) -> ExtractResult<Vec<String>> {
    LinkSelector::new(selector, attribute)?.extract(markup)
}
