use crate::url::PageIndex;

const PLACEHOLDER: &str = "{0}";

/// A listing URL with a `{0}` slot for the page index
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UrlTemplate {
    raw: String,
}

impl UrlTemplate {
    pub fn new(raw: impl Into<String>) -> Self {
        Self { raw: raw.into() }
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Returns true if the template contains at least one `{0}` slot
    pub fn has_placeholder(&self) -> bool {
        self.raw.contains(PLACEHOLDER)
    }

    /// Substitutes `index` into every `{0}` slot
    ///
    /// # Example
    ///
    /// ```
    /// use article_harvest::url::{PageIndex, UrlTemplate};
    ///
    /// let template = UrlTemplate::new("https://example.com/news?page={0}");
    /// assert_eq!(
    ///     template.expand(&PageIndex::Number(3)),
    ///     "https://example.com/news?page=3"
    /// );
    /// ```
    pub fn expand(&self, index: &PageIndex) -> String {
        self.raw.replace(PLACEHOLDER, &index.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expand_number() {
        let template = UrlTemplate::new("https://x/p-{0}");
        assert_eq!(template.expand(&PageIndex::Number(2)), "https://x/p-2");
    }

    #[test]
    fn test_expand_text() {
        let template = UrlTemplate::new("https://x/archive/{0}/");
        assert_eq!(
            template.expand(&PageIndex::Text("2021".to_string())),
            "https://x/archive/2021/"
        );
    }

    #[test]
    fn test_expand_repeated_slot() {
        let template = UrlTemplate::new("https://x/{0}?p={0}");
        assert_eq!(template.expand(&PageIndex::Number(5)), "https://x/5?p=5");
    }

    #[test]
    fn test_placeholder_detection() {
        assert!(UrlTemplate::new("https://x/p-{0}").has_placeholder());
        assert!(!UrlTemplate::new("https://x/p-1").has_placeholder());
    }
}
