//! Fetches the three report artifacts concurrently and joins them into one
//! immutable [`ReportData`].

use crate::alignment::AlignmentMatrix;
use crate::config::{ArtifactSource, ReportConfig};
use crate::error::{ReportError, Result};
use log::{debug, info, warn};
use msa_protocol::{DatasetInfo, PhyloNode};
use std::fs;
use std::time::Duration;

#[derive(Clone, Debug)]
pub struct ReportData {
    pub alignment: AlignmentMatrix,
    pub info: DatasetInfo,
    pub tree: PhyloNode,
}

pub fn fetch_text(source: &ArtifactSource, timeout: Duration) -> Result<String> {
    let text = match source {
        ArtifactSource::Path(path) => {
            fs::read_to_string(path).map_err(|e| ReportError::io(path.clone(), e))?
        }
        ArtifactSource::Url(url) => {
            let fetch_err = |source| ReportError::Fetch {
                url: url.clone(),
                source,
            };
            let client = reqwest::blocking::Client::builder()
                .timeout(timeout)
                .build()
                .map_err(fetch_err)?;
            client
                .get(url)
                .send()
                .and_then(|r| r.error_for_status())
                .and_then(|r| r.text())
                .map_err(fetch_err)?
        }
    };
    debug!("Fetched {} bytes from '{source}'", text.len());
    Ok(text)
}

pub fn load_alignment(source: &ArtifactSource, timeout: Duration) -> Result<AlignmentMatrix> {
    let matrix = AlignmentMatrix::from_csv_str(&fetch_text(source, timeout)?)?;
    info!("Alignment '{source}': {} rows", matrix.len());
    Ok(matrix)
}

pub fn load_dataset_info(source: &ArtifactSource, timeout: Duration) -> Result<DatasetInfo> {
    let text = fetch_text(source, timeout)?;
    let info = DatasetInfo::from_json_str(&text)
        .map_err(|e| ReportError::schema(format!("dataset info '{source}'"), e))?;
    if info.optimal_segment.is_empty() {
        warn!(
            "Optimal segment {}..{} in '{source}' is empty, nothing will be highlighted",
            info.optimal_segment.start, info.optimal_segment.end
        );
    }
    Ok(info)
}

pub fn load_tree(source: &ArtifactSource, timeout: Duration) -> Result<PhyloNode> {
    let text = fetch_text(source, timeout)?;
    let tree = PhyloNode::from_json_str(&text)
        .map_err(|e| ReportError::schema(format!("guide tree '{source}'"), e))?;
    info!("Guide tree '{source}': {} nodes", tree.node_count());
    Ok(tree)
}

/// Loads all artifacts in parallel; the first failure wins.
pub fn load_report_data(config: &ReportConfig) -> Result<ReportData> {
    let timeout = Duration::from_secs(config.fetch_timeout_secs);
    let (alignment_source, info_source, tree_source) = (
        config.alignment_source(),
        config.info_source(),
        config.tree_source(),
    );
    let (alignment, (info, tree)) = rayon::join(
        || load_alignment(&alignment_source, timeout),
        || {
            rayon::join(
                || load_dataset_info(&info_source, timeout),
                || load_tree(&tree_source, timeout),
            )
        },
    );
    Ok(ReportData {
        alignment: alignment?,
        info: info?,
        tree: tree?,
    })
}
