use itertools::Itertools;
use std::collections::BTreeSet;
use std::fmt;

/// CSS classes attached to table cells and tree labels.
///
/// Declaration order is the order classes are written into `class="…"`.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub enum StyleTag {
    Basic,
    Related,
    Red,
    Blue,
    Magenta,
    Green,
}

impl StyleTag {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Basic => "basic",
            Self::Related => "related",
            Self::Red => "red",
            Self::Blue => "blue",
            Self::Magenta => "magenta",
            Self::Green => "green",
        }
    }
}

impl fmt::Display for StyleTag {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct StyleTags(BTreeSet<StyleTag>);

impl StyleTags {
    pub fn insert(&mut self, tag: StyleTag) {
        self.0.insert(tag);
    }

    pub fn contains(&self, tag: StyleTag) -> bool {
        self.0.contains(&tag)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Space separated class list, empty when no tag applies.
    pub fn class_attr(&self) -> String {
        self.0.iter().map(|tag| tag.as_str()).join(" ")
    }
}

impl FromIterator<StyleTag> for StyleTags {
    fn from_iter<I: IntoIterator<Item = StyleTag>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}
