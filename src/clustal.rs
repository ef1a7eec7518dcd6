//! Reader for Clustal formatted alignments (`clustalo --outfmt=clustal`).
//!
//! Each block lists one line per sequence followed by a conservation line
//! whose columns line up with the residues above it.

use crate::alignment::{AlignmentMatrix, MARKINGS_LABEL, NUM_UNIQUE_LABEL};
use crate::amino_acids::count_unique_residues;
use crate::error::{ReportError, Result};
use log::warn;
use regex::Regex;

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ClustalAlignment {
    /// Sequences in order of first appearance.
    pub sequences: Vec<(String, String)>,
    pub markings: String,
}

impl ClustalAlignment {
    pub fn parse(text: &str) -> Result<Self> {
        let sequence_line = Regex::new(r"^(\S+)\s+([-A-Z]+)")
            .map_err(|e| ReportError::String(e.to_string()))?;

        let mut lines = text.lines().enumerate();
        match lines.next() {
            Some((_, header)) if header.starts_with("CLUSTAL") => {}
            Some((_, header)) => warn!("Unexpected Clustal header: '{header}'"),
            None => {
                return Err(ReportError::Clustal {
                    line: 1,
                    message: "empty alignment".to_string(),
                });
            }
        }

        let mut ret = Self::default();
        // Column span of the residues in the current block.
        let mut span: Option<(usize, usize)> = None;
        for (line_no, line) in lines {
            if let Some((name, residues)) = sequence_line
                .captures(line)
                .and_then(|caps| Some((caps.get(1)?, caps.get(2)?)))
            {
                span = Some((residues.start(), residues.end()));
                ret.append(name.as_str(), residues.as_str());
                continue;
            }
            // The first other line after a block is its conservation line,
            // even when nothing is conserved and it is blank.
            if let Some((start, end)) = span.take() {
                let width = end - start;
                let marks = line.get(start..end.min(line.len())).unwrap_or("");
                ret.markings.push_str(&format!("{marks:<width$}"));
                continue;
            }
            if !line.trim().is_empty() {
                return Err(ReportError::Clustal {
                    line: line_no + 1,
                    message: format!("unrecognised line '{}'", line.trim()),
                });
            }
        }
        if let Some((start, end)) = span {
            ret.markings.push_str(&" ".repeat(end - start));
        }
        ret.check_lengths()?;
        Ok(ret)
    }

    fn append(&mut self, name: &str, residues: &str) {
        match self.sequences.iter_mut().find(|(n, _)| n == name) {
            Some((_, seq)) => seq.push_str(residues),
            None => self.sequences.push((name.to_string(), residues.to_string())),
        }
    }

    fn check_lengths(&self) -> Result<()> {
        let width = self.markings.len();
        for (name, seq) in &self.sequences {
            if seq.len() != width {
                return Err(ReportError::Clustal {
                    line: 0,
                    message: format!(
                        "sequence '{name}' has {} columns, alignment has {width}",
                        seq.len()
                    ),
                });
            }
        }
        Ok(())
    }

    pub fn width(&self) -> usize {
        self.markings.len()
    }

    pub fn sequence(&self, name: &str) -> Option<&str> {
        self.sequences
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, s)| s.as_str())
    }

    /// Distinct residues per column over all sequences, gaps excluded.
    pub fn unique_counts(&self) -> Vec<usize> {
        (0..self.width())
            .map(|pos| {
                count_unique_residues(
                    self.sequences
                        .iter()
                        .filter_map(|(_, seq)| seq.get(pos..pos + 1)),
                )
            })
            .collect()
    }

    /// Table with one row per sequence, then the `markings` and `num_unique` rows.
    pub fn to_matrix(&self) -> AlignmentMatrix {
        let split = |label: &str, text: &str| -> Vec<String> {
            std::iter::once(label.to_string())
                .chain(text.chars().map(String::from))
                .collect()
        };
        let mut rows: Vec<Vec<String>> = self
            .sequences
            .iter()
            .map(|(name, seq)| split(name, seq))
            .collect();
        rows.push(split(MARKINGS_LABEL, &self.markings));
        rows.push(
            std::iter::once(NUM_UNIQUE_LABEL.to_string())
                .chain(self.unique_counts().into_iter().map(|n| n.to_string()))
                .collect(),
        );
        AlignmentMatrix::new(rows)
    }
}
