use thiserror::Error;

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("{0}")]
    String(String),

    #[error("I/O error on '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("could not fetch '{url}': {source}")]
    Fetch {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("malformed CSV in {artifact}: {source}")]
    Csv {
        artifact: String,
        #[source]
        source: csv::Error,
    },

    #[error("invalid {artifact}: {source}")]
    Schema {
        artifact: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Newick syntax error at byte {offset}: {message}")]
    Newick { offset: usize, message: String },

    #[error("Clustal alignment line {line}: {message}")]
    Clustal { line: usize, message: String },

    #[error(transparent)]
    Fmt(#[from] std::fmt::Error),
}

impl ReportError {
    pub fn io(path: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub fn schema(artifact: impl Into<String>, source: serde_json::Error) -> Self {
        Self::Schema {
            artifact: artifact.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, ReportError>;
