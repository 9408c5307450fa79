use crate::Node;

/// A culture that selects language-tagged literals.
///
/// The invariant culture selects literals without a language tag. Any other culture selects
/// literals whose language tag equals the two-letter code of the culture (e.g., `en` for `en-US`).
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Culture {
    tag: Option<String>,
}

impl Culture {
    /// Returns the invariant culture.
    pub fn invariant() -> Self {
        Self { tag: None }
    }

    /// Creates a culture from a language tag such as `en` or `en-US`.
    ///
    /// An empty tag creates the invariant culture.
    pub fn new(tag: impl Into<String>) -> Self {
        let tag = tag.into();
        if tag.is_empty() {
            Self::invariant()
        } else {
            Self { tag: Some(tag) }
        }
    }

    pub fn tag(&self) -> Option<&str> {
        self.tag.as_deref()
    }

    pub fn is_invariant(&self) -> bool {
        self.tag.is_none()
    }

    /// Returns the primary language subtag of this culture.
    pub fn two_letter_code(&self) -> Option<&str> {
        self.tag
            .as_deref()
            .and_then(|tag| tag.split(['-', '_']).next())
    }

    /// Whether a literal with the given `language` tag belongs to this culture.
    pub fn matches_language(&self, language: Option<&str>) -> bool {
        match (self.two_letter_code(), language) {
            (None, None) => true,
            (Some(code), Some(language)) => code.eq_ignore_ascii_case(language),
            _ => false,
        }
    }

    /// Whether `node` is a literal that belongs to this culture.
    pub fn matches(&self, node: &Node) -> bool {
        node.as_literal()
            .is_some_and(|literal| self.matches_language(literal.language()))
    }
}
