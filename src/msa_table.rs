//! Annotated alignment table.
//!
//! Every cell is classified independently: row label substitution first, then
//! dataset membership, residue color and the optimal segment highlight. The
//! predicates compose, so one cell may carry several classes.

use crate::alignment::{AlignmentMatrix, MARKINGS_LABEL, NUM_UNIQUE_LABEL};
use crate::amino_acids::colors_for_cell;
use crate::style::{StyleTag, StyleTags};
use html_escape::{encode_double_quoted_attribute, encode_text};
use msa_protocol::{DatasetInfo, NameSets, OptimalSegment};
use std::fmt::Write;

pub const DEFAULT_HIGHLIGHT_COLOR: &str = "#eee8aa";

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TableCell {
    pub text: String,
    pub tags: StyleTags,
    pub highlighted: bool,
}

#[derive(Clone, Debug, Default)]
pub struct MsaTable {
    rows: Vec<Vec<TableCell>>,
}

/// Human readable text for the synthetic row labels; other values pass through.
pub fn display_text(raw: &str) -> &str {
    match raw {
        MARKINGS_LABEL => "Clustal Omega Markings",
        NUM_UNIQUE_LABEL => "Number of Unique Amino Acids",
        _ => raw,
    }
}

fn classify_cell(raw: &str, column: usize, names: &NameSets, segment: &OptimalSegment) -> TableCell {
    // Membership is checked against the substituted text.
    let text = display_text(raw);
    let mut tags = StyleTags::default();
    if names.is_basic(text) {
        tags.insert(StyleTag::Basic);
    }
    if names.is_related(text) {
        tags.insert(StyleTag::Related);
    }
    for color in colors_for_cell(text) {
        tags.insert(color.style_tag());
    }
    TableCell {
        text: text.to_string(),
        tags,
        highlighted: segment.contains_column(column),
    }
}

pub fn build_msa_table(matrix: &AlignmentMatrix, info: &DatasetInfo) -> MsaTable {
    let names = info.name_sets();
    let segment = &info.optimal_segment;
    let rows = matrix
        .rows()
        .iter()
        .map(|row| {
            row.iter()
                .enumerate()
                .map(|(column, raw)| classify_cell(raw, column, &names, segment))
                .collect()
        })
        .collect();
    MsaTable { rows }
}

impl MsaTable {
    pub fn rows(&self) -> &[Vec<TableCell>] {
        &self.rows
    }

    pub fn cell(&self, row: usize, column: usize) -> Option<&TableCell> {
        self.rows.get(row)?.get(column)
    }

    pub fn highlighted_cells(&self) -> usize {
        self.rows
            .iter()
            .flatten()
            .filter(|cell| cell.highlighted)
            .count()
    }

    pub fn write_html(&self, html: &mut String, highlight_color: &str) -> std::fmt::Result {
        writeln!(html, "<table>")?;
        for row in &self.rows {
            write!(html, "<tr>")?;
            for cell in row {
                write!(html, "<td")?;
                if !cell.tags.is_empty() {
                    write!(html, " class=\"{}\"", cell.tags.class_attr())?;
                }
                if cell.highlighted {
                    write!(html, " bgcolor=\"{}\"", encode_double_quoted_attribute(highlight_color))?;
                }
                write!(html, ">{}</td>", encode_text(&cell.text))?;
            }
            writeln!(html, "</tr>")?;
        }
        writeln!(html, "</table>")
    }

    pub fn to_html(&self, highlight_color: &str) -> String {
        let mut html = String::new();
        // Writing into a String cannot fail.
        let _ = self.write_html(&mut html, highlight_color);
        html
    }
}
