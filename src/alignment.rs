use crate::error::{ReportError, Result};
use csv::{ReaderBuilder, WriterBuilder};

pub const MARKINGS_LABEL: &str = "markings";
pub const NUM_UNIQUE_LABEL: &str = "num_unique";

/// Alignment table as written by the importer: one row per sequence plus the
/// `markings` and `num_unique` rows. Column 0 is the row label.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AlignmentMatrix {
    rows: Vec<Vec<String>>,
}

impl AlignmentMatrix {
    pub fn new(rows: Vec<Vec<String>>) -> Self {
        Self { rows }
    }

    /// Parses comma separated text. Trailing whitespace is dropped first and
    /// rows of unequal length are kept as they are.
    pub fn from_csv_str(text: &str) -> Result<Self> {
        let text = text.trim_end();
        if text.is_empty() {
            return Ok(Self::default());
        }
        let mut rdr = ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_reader(text.as_bytes());
        let mut rows = vec![];
        for record in rdr.records() {
            let record = record.map_err(|source| ReportError::Csv {
                artifact: "alignment table".to_string(),
                source,
            })?;
            rows.push(record.iter().map(|cell| cell.to_string()).collect());
        }
        Ok(Self { rows })
    }

    pub fn to_csv_string(&self) -> Result<String> {
        let mut wtr = WriterBuilder::new().flexible(true).from_writer(vec![]);
        for row in &self.rows {
            wtr.write_record(row).map_err(|source| ReportError::Csv {
                artifact: "alignment table".to_string(),
                source,
            })?;
        }
        let bytes = wtr
            .into_inner()
            .map_err(|e| ReportError::String(format!("Could not flush CSV: {e}")))?;
        String::from_utf8(bytes).map_err(|e| ReportError::String(e.to_string()))
    }

    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn row(&self, label: &str) -> Option<&[String]> {
        self.rows
            .iter()
            .find(|row| row.first().map(String::as_str) == Some(label))
            .map(|row| &row[1..])
    }
}
