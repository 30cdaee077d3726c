/// Typed element selector.
///
/// Covers the subset of CSS selectors the page features need; [`Query::to_css`]
/// renders the equivalent selector string for hosts backed by a real DOM.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Query {
    Tag(String),
    Id(String),
    Class(String),
    HasAttr(String),
    AttrEquals(String, String),
    AttrPrefix(String, String),
    AttrContains(String, String),
    /// Compound selector: every part must match the same element.
    All(Vec<Query>),
    /// Selector list: any part may match.
    Any(Vec<Query>),
}

/// Element data a [`Query`] is matched against.
pub trait Matchable {
    fn tag(&self) -> &str;
    fn attribute(&self, name: &str) -> Option<&str>;
    fn has_class(&self, class: &str) -> bool;
}

impl Query {
    pub fn tag(name: impl Into<String>) -> Self {
        Self::Tag(name.into())
    }

    pub fn id(id: impl Into<String>) -> Self {
        Self::Id(id.into())
    }

    pub fn class(class: impl Into<String>) -> Self {
        Self::Class(class.into())
    }

    pub fn has_attr(name: impl Into<String>) -> Self {
        Self::HasAttr(name.into())
    }

    pub fn attr_equals(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self::AttrEquals(name.into(), value.into())
    }

    pub fn attr_prefix(name: impl Into<String>, prefix: impl Into<String>) -> Self {
        Self::AttrPrefix(name.into(), prefix.into())
    }

    pub fn attr_contains(name: impl Into<String>, needle: impl Into<String>) -> Self {
        Self::AttrContains(name.into(), needle.into())
    }

    pub fn any(parts: impl IntoIterator<Item = Query>) -> Self {
        Self::Any(parts.into_iter().collect())
    }

    /// Narrows this selector to elements also matching `other`.
    pub fn and(self, other: Query) -> Self {
        match self {
            Self::All(mut parts) => {
                parts.push(other);
                Self::All(parts)
            }
            first => Self::All(vec![first, other]),
        }
    }

    pub fn matches(&self, element: &impl Matchable) -> bool {
        match self {
            Query::Tag(name) => element.tag().eq_ignore_ascii_case(name),
            Query::Id(id) => element.attribute("id") == Some(id.as_str()),
            Query::Class(class) => element.has_class(class),
            Query::HasAttr(name) => element.attribute(name).is_some(),
            Query::AttrEquals(name, value) => element.attribute(name) == Some(value.as_str()),
            Query::AttrPrefix(name, prefix) => element
                .attribute(name)
                .is_some_and(|value| value.starts_with(prefix.as_str())),
            Query::AttrContains(name, needle) => element
                .attribute(name)
                .is_some_and(|value| value.contains(needle.as_str())),
            Query::All(parts) => parts.iter().all(|part| part.matches(element)),
            Query::Any(parts) => parts.iter().any(|part| part.matches(element)),
        }
    }

    pub fn to_css(&self) -> String {
        match self {
            Query::Tag(name) => name.clone(),
            Query::Id(id) => format!("#{id}"),
            Query::Class(class) => format!(".{class}"),
            Query::HasAttr(name) => format!("[{name}]"),
            Query::AttrEquals(name, value) => format!("[{name}=\"{value}\"]"),
            Query::AttrPrefix(name, prefix) => format!("[{name}^=\"{prefix}\"]"),
            Query::AttrContains(name, needle) => format!("[{name}*=\"{needle}\"]"),
            Query::All(parts) => {
                // Type selectors must lead a compound selector.
                let mut ordered = parts.iter().collect::<Vec<_>>();
                ordered.sort_by_key(|part| !matches!(part, Query::Tag(_)));
                ordered.into_iter().map(Query::to_css).collect::<String>()
            }
            Query::Any(parts) => parts
                .iter()
                .map(Query::to_css)
                .collect::<Vec<_>>()
                .join(", "),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    struct Fixture {
        tag: &'static str,
        attributes: BTreeMap<&'static str, &'static str>,
        classes: Vec<&'static str>,
    }

    impl Matchable for Fixture {
        fn tag(&self) -> &str {
            self.tag
        }

        fn attribute(&self, name: &str) -> Option<&str> {
            self.attributes.get(name).copied()
        }

        fn has_class(&self, class: &str) -> bool {
            self.classes.contains(&class)
        }
    }

    fn anchor(href: &'static str) -> Fixture {
        Fixture {
            tag: "a",
            attributes: BTreeMap::from([("href", href)]),
            classes: vec!["nav-link"],
        }
    }

    #[test]
    fn compound_selector_requires_every_part() {
        let query = Query::class("nav-link").and(Query::attr_prefix("href", "#"));
        assert!(query.matches(&anchor("#about")));
        assert!(!query.matches(&anchor("/about.html")));
    }

    #[test]
    fn renders_css_equivalent() {
        let query = Query::any([
            Query::class("nav-link").and(Query::attr_prefix("href", "#")),
            Query::tag("section").and(Query::has_attr("id")),
        ]);
        assert_eq!(query.to_css(), ".nav-link[href^=\"#\"], section[id]");
        assert_eq!(
            Query::has_attr("id").and(Query::tag("section")).to_css(),
            "section[id]"
        );
    }

    #[test]
    fn tag_match_ignores_case() {
        assert!(Query::tag("A").matches(&anchor("#")));
        assert!(Query::attr_contains("href", "priv").matches(&anchor("/privacy.html")));
    }
}
