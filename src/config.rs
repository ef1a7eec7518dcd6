use crate::error::{ReportError, Result};
use crate::msa_table::DEFAULT_HIGHLIGHT_COLOR;
use crate::phylo_tree::{
    DEFAULT_HEIGHT, DEFAULT_LABEL_MARGIN, DEFAULT_LABEL_OFFSET, DEFAULT_NODE_RADIUS, DEFAULT_WIDTH,
    TreeCanvas,
};
use serde::Deserialize;
use std::fmt;
use std::fs;
use std::path::Path;

pub const DEFAULT_ALIGNMENT: &str = "static/data/clustalo_alignment.csv";
pub const DEFAULT_INFO: &str = "static/data/dataset_info.json";
pub const DEFAULT_TREE: &str = "static/data/clustalo_phylotree.json";
pub const DEFAULT_OUTPUT: &str = "report.html";
pub const DEFAULT_ACTIVE_TAB: &str = "msa";

/// Where an artifact comes from: a local file or an http(s) URL.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ArtifactSource {
    Path(String),
    Url(String),
}

impl ArtifactSource {
    pub fn parse(text: &str) -> Self {
        let text = text.trim();
        if text.starts_with("http://") || text.starts_with("https://") {
            Self::Url(text.to_string())
        } else {
            Self::Path(text.to_string())
        }
    }
}

impl fmt::Display for ArtifactSource {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Path(p) => write!(f, "{p}"),
            Self::Url(u) => write!(f, "{u}"),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    pub alignment: String,
    pub info: String,
    pub tree: String,
    pub output: String,
    pub title: String,
    pub active_tab: String,
    pub highlight_color: String,
    pub tree_width: f64,
    pub tree_height: f64,
    pub label_margin: f64,
    pub label_offset: f64,
    pub node_radius: f64,
    pub fetch_timeout_secs: u64,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            alignment: DEFAULT_ALIGNMENT.to_string(),
            info: DEFAULT_INFO.to_string(),
            tree: DEFAULT_TREE.to_string(),
            output: DEFAULT_OUTPUT.to_string(),
            title: "Hemoglobin subunit beta: alignment and guide tree".to_string(),
            active_tab: DEFAULT_ACTIVE_TAB.to_string(),
            highlight_color: DEFAULT_HIGHLIGHT_COLOR.to_string(),
            tree_width: DEFAULT_WIDTH,
            tree_height: DEFAULT_HEIGHT,
            label_margin: DEFAULT_LABEL_MARGIN,
            label_offset: DEFAULT_LABEL_OFFSET,
            node_radius: DEFAULT_NODE_RADIUS,
            fetch_timeout_secs: 30,
        }
    }
}

impl ReportConfig {
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text =
            fs::read_to_string(path).map_err(|e| ReportError::io(path.display().to_string(), e))?;
        serde_json::from_str(&text)
            .map_err(|e| ReportError::schema(format!("report config '{}'", path.display()), e))
    }

    pub fn alignment_source(&self) -> ArtifactSource {
        ArtifactSource::parse(&self.alignment)
    }

    pub fn info_source(&self) -> ArtifactSource {
        ArtifactSource::parse(&self.info)
    }

    pub fn tree_source(&self) -> ArtifactSource {
        ArtifactSource::parse(&self.tree)
    }

    pub fn tree_canvas(&self) -> TreeCanvas {
        TreeCanvas {
            width: self.tree_width,
            height: self.tree_height,
            label_margin: self.label_margin,
            label_offset: self.label_offset,
            node_radius: self.node_radius,
        }
    }
}
