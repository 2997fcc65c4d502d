//! DomQuery: element lookup and text accessors over a parsed document

use scraper::{ElementRef, Html, Selector};

use crate::dom::SelectorSpec;

/// Returns the first element in document order matching `spec`
pub fn find<'a>(html: &'a Html, spec: &SelectorSpec) -> Option<ElementRef<'a>> {
    elements(html.root_element()).find(|e| spec.matches(e.value()))
}

/// Returns every element matching `spec`, optionally only those carrying `require_attr`
pub fn find_all<'a>(
    html: &'a Html,
    spec: &SelectorSpec,
    require_attr: Option<&str>,
) -> Vec<ElementRef<'a>> {
    elements(html.root_element())
        .filter(|e| spec.matches(e.value()))
        .filter(|e| require_attr.map_or(true, |attr| e.value().attr(attr).is_some()))
        .collect()
}

/// Returns the descendants of `scope` (excluding `scope` itself) matching `spec`
pub fn find_within<'a>(scope: ElementRef<'a>, spec: &SelectorSpec) -> Vec<ElementRef<'a>> {
    elements(scope)
        .skip(1)
        .filter(|e| spec.matches(e.value()))
        .collect()
}

/// The first element of the document, i.e. its root
pub fn first_element(html: &Html) -> ElementRef<'_> {
    html.root_element()
}

/// Text of the document's `<title>` element, trimmed
///
/// Returns None when the document has no title element.
pub fn document_title(html: &Html) -> Option<String> {
    let selector = Selector::parse("title").ok()?;
    html.select(&selector)
        .next()
        .map(|element| element.text().collect::<String>().trim().to_string())
}

/// Every non-blank text fragment below `element`, trimmed
pub fn stripped_strings<'a>(element: ElementRef<'a>) -> Vec<&'a str> {
    element
        .text()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect()
}

/// Full text below `element` collapsed to single-space separated tokens
pub fn token_text(element: ElementRef<'_>) -> String {
    let text = element.text().collect::<String>();
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn elements(scope: ElementRef<'_>) -> impl Iterator<Item = ElementRef<'_>> {
    scope.descendants().filter_map(ElementRef::wrap)
}
