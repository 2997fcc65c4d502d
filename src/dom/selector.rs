use scraper::node::Element;
use serde::Deserialize;
use std::fmt;

use crate::dom::DomError;

/// Attribute condition for a selector: presence, or an exact value
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AttrFilter {
    pub name: String,

    #[serde(default)]
    pub value: Option<String>,
}

/// A `(tag, class-or-attribute)` pair naming one DOM region
///
/// `class` may hold several whitespace-separated class names; an element
/// matches when it carries all of them, in any order. A missing `tag`
/// matches any element.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct SelectorSpec {
    #[serde(default)]
    pub tag: Option<String>,

    #[serde(default)]
    pub class: Option<String>,

    #[serde(default)]
    pub attr: Option<AttrFilter>,
}

impl SelectorSpec {
    /// Selector matching every element with the given tag name
    pub fn tag(tag: &str) -> Self {
        Self {
            tag: Some(tag.to_string()),
            ..Self::default()
        }
    }

    /// Adds a class condition
    pub fn with_class(mut self, class: &str) -> Self {
        self.class = Some(class.to_string());
        self
    }

    /// Adds an attribute condition
    pub fn with_attr(mut self, name: &str, value: Option<&str>) -> Self {
        self.attr = Some(AttrFilter {
            name: name.to_string(),
            value: value.map(str::to_string),
        });
        self
    }

    /// Checks the selector is well formed
    pub fn validate(&self) -> Result<(), DomError> {
        if let Some(tag) = &self.tag {
            if tag.is_empty() || !tag.chars().all(|c| c.is_ascii_alphanumeric() || c == '-') {
                return Err(DomError::InvalidSelector(format!(
                    "tag '{}' must be a plain element name",
                    tag
                )));
            }
        }

        if self.class.is_some() && self.attr.is_some() {
            return Err(DomError::InvalidSelector(format!(
                "{} sets both class and attr",
                self
            )));
        }

        if matches!(&self.class, Some(class) if class.split_whitespace().next().is_none()) {
            return Err(DomError::InvalidSelector(format!(
                "{} has an empty class",
                self
            )));
        }

        if matches!(&self.attr, Some(attr) if attr.name.trim().is_empty()) {
            return Err(DomError::InvalidSelector(format!(
                "{} has an empty attribute name",
                self
            )));
        }

        Ok(())
    }

    /// Returns true if `element` satisfies every condition of this selector
    pub fn matches(&self, element: &Element) -> bool {
        if let Some(tag) = &self.tag {
            if !element.name().eq_ignore_ascii_case(tag) {
                return false;
            }
        }

        if let Some(class) = &self.class {
            let wanted = class.split_whitespace();
            if !wanted.into_iter().all(|c| element.classes().any(|have| have == c)) {
                return false;
            }
        }

        if let Some(attr) = &self.attr {
            match (element.attr(&attr.name), &attr.value) {
                (None, _) => return false,
                (Some(have), Some(want)) if have != want => return false,
                _ => {}
            }
        }

        true
    }
}

impl fmt::Display for SelectorSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag.as_deref().unwrap_or("*"))?;
        if let Some(class) = &self.class {
            for c in class.split_whitespace() {
                write!(f, ".{}", c)?;
            }
        }
        if let Some(attr) = &self.attr {
            match &attr.value {
                Some(value) => write!(f, "[{}=\"{}\"]", attr.name, value)?,
                None => write!(f, "[{}]", attr.name)?,
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scraper::{ElementRef, Html};

    fn first_element<'a>(html: &'a Html, name: &str) -> ElementRef<'a> {
        html.root_element()
            .descendants()
            .filter_map(ElementRef::wrap)
            .find(|e| e.value().name() == name)
            .unwrap()
    }

    #[test]
    fn test_tag_only() {
        let html = Html::parse_fragment(r#"<h1 class="title">Hi</h1>"#);
        let h1 = first_element(&html, "h1");
        assert!(SelectorSpec::tag("h1").matches(h1.value()));
        assert!(SelectorSpec::tag("H1").matches(h1.value()));
        assert!(!SelectorSpec::tag("h2").matches(h1.value()));
    }

    #[test]
    fn test_multi_class_any_order() {
        let html =
            Html::parse_fragment(r#"<div class="_dp-f _fdrt-cl _mgbt-32px">x</div>"#);
        let div = first_element(&html, "div");

        assert!(SelectorSpec::tag("div")
            .with_class("_fdrt-cl _dp-f")
            .matches(div.value()));
        assert!(SelectorSpec::tag("div")
            .with_class("_mgbt-32px")
            .matches(div.value()));
        assert!(!SelectorSpec::tag("div")
            .with_class("_dp-f missing")
            .matches(div.value()));
    }

    #[test]
    fn test_class_with_colon() {
        let html = Html::parse_fragment(r#"<div class="grid md:grid-cols-2">x</div>"#);
        let div = first_element(&html, "div");
        assert!(SelectorSpec::default()
            .with_class("md:grid-cols-2")
            .matches(div.value()));
    }

    #[test]
    fn test_attr_filter() {
        let html = Html::parse_fragment(r#"<section id="main" data-x="1">x</section>"#);
        let section = first_element(&html, "section");

        assert!(SelectorSpec::tag("section")
            .with_attr("id", Some("main"))
            .matches(section.value()));
        assert!(SelectorSpec::tag("section")
            .with_attr("data-x", None)
            .matches(section.value()));
        assert!(!SelectorSpec::tag("section")
            .with_attr("id", Some("other"))
            .matches(section.value()));
        assert!(!SelectorSpec::tag("section")
            .with_attr("role", None)
            .matches(section.value()));
    }

    #[test]
    fn test_validate() {
        assert!(SelectorSpec::tag("div").with_class("a b").validate().is_ok());
        assert!(SelectorSpec::tag("div > p").validate().is_err());
        assert!(SelectorSpec::tag("div").with_class("   ").validate().is_err());
        assert!(SelectorSpec::tag("div")
            .with_class("a")
            .with_attr("id", None)
            .validate()
            .is_err());
    }

    #[test]
    fn test_display() {
        assert_eq!(
            SelectorSpec::tag("div").with_class("a b").to_string(),
            "div.a.b"
        );
        assert_eq!(
            SelectorSpec::default().with_attr("id", Some("x")).to_string(),
            "*[id=\"x\"]"
        );
    }
}
