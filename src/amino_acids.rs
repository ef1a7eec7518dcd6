//! Clustal-style residue coloring.
//!
//! The groups are not a partition: histidine sits in both the basic (magenta)
//! and the polar (green) group and receives both colors.

use crate::style::StyleTag;

#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum AminoAcidColor {
    Red,
    Blue,
    Magenta,
    Green,
}

impl AminoAcidColor {
    pub const ALL: [AminoAcidColor; 4] = [Self::Red, Self::Blue, Self::Magenta, Self::Green];

    pub fn residues(self) -> &'static [char] {
        match self {
            Self::Red => &['A', 'V', 'F', 'P', 'M', 'I', 'L', 'W'],
            Self::Blue => &['D', 'E'],
            Self::Magenta => &['R', 'H', 'K'],
            Self::Green => &['S', 'T', 'Y', 'H', 'C', 'N', 'G', 'Q'],
        }
    }

    pub fn style_tag(self) -> StyleTag {
        match self {
            Self::Red => StyleTag::Red,
            Self::Blue => StyleTag::Blue,
            Self::Magenta => StyleTag::Magenta,
            Self::Green => StyleTag::Green,
        }
    }

    /// CSS color used for the matching style class.
    pub fn css_color(self) -> &'static str {
        match self {
            Self::Red => "#e5331a",
            Self::Blue => "#1a4de5",
            Self::Magenta => "#cc33cc",
            Self::Green => "#1a991a",
        }
    }

    pub fn contains(self, residue: char) -> bool {
        self.residues().contains(&residue)
    }
}

/// Colors for a cell. Only a cell consisting of exactly one residue code
/// matches; everything else (gaps, labels, counts) gets no color.
pub fn colors_for_cell(text: &str) -> Vec<AminoAcidColor> {
    let mut chars = text.chars();
    let (Some(residue), None) = (chars.next(), chars.next()) else {
        return vec![];
    };
    AminoAcidColor::ALL
        .into_iter()
        .filter(|color| color.contains(residue))
        .collect()
}

/// Number of distinct residues in a column, ignoring gaps.
pub fn count_unique_residues<'a>(column: impl IntoIterator<Item = &'a str>) -> usize {
    let mut seen = std::collections::HashSet::new();
    for cell in column {
        if cell != "-" && !cell.trim().is_empty() {
            seen.insert(cell);
        }
    }
    seen.len()
}
