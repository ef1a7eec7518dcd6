//! Machine-readable contracts shared by the report renderer and the importers.
//!
//! These types mirror the JSON artifacts produced upstream of the report:
//! `dataset_info.json` and `clustalo_phylotree.json`.

use serde::{Deserialize, Deserializer, Serialize};
use std::collections::HashSet;

pub const BASIC_DATASET: &str = "basic_dataset";
pub const RELATED_DATASET: &str = "related_dataset";

/// Deepest guide tree accepted, counting the root as level 1.
pub const MAX_TREE_DEPTH: usize = 1024;

/// Sequence names of the two input datasets, in input order.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeqNames {
    pub basic_dataset: Vec<String>,
    pub related_dataset: Vec<String>,
}

/// Alignment columns retained for the downstream model.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OptimalSegment {
    pub start: i64,
    pub end: i64,
    #[serde(default)]
    pub num_lowly_conserved: Option<usize>,
    #[serde(default)]
    pub num_highly_conserved: Option<usize>,
}

impl OptimalSegment {
    pub fn new(start: i64, end: i64) -> Self {
        Self {
            start,
            end,
            ..Default::default()
        }
    }

    /// Highlight rule for a table column; column 0 holds the row label.
    pub fn contains_column(&self, column: usize) -> bool {
        let column = column as i64;
        self.start < column && column <= self.end
    }

    pub fn is_empty(&self) -> bool {
        self.end <= self.start
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatasetInfo {
    pub seq_names: SeqNames,
    pub optimal_segment: OptimalSegment,
}

impl DatasetInfo {
    pub fn from_json_str(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }

    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    pub fn name_sets(&self) -> NameSets<'_> {
        NameSets {
            basic: self.seq_names.basic_dataset.iter().map(String::as_str).collect(),
            related: self
                .seq_names
                .related_dataset
                .iter()
                .map(String::as_str)
                .collect(),
        }
    }
}

/// Borrowed lookup sets over [`SeqNames`].
#[derive(Clone, Debug, Default)]
pub struct NameSets<'a> {
    basic: HashSet<&'a str>,
    related: HashSet<&'a str>,
}

impl NameSets<'_> {
    pub fn is_basic(&self, name: &str) -> bool {
        self.basic.contains(name)
    }

    pub fn is_related(&self, name: &str) -> bool {
        self.related.contains(name)
    }
}

/// One node of the guide tree. Leaves carry no children.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PhyloNode {
    pub name: String,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "deserialize_score"
    )]
    pub score: Option<f64>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<PhyloNode>,
}

impl PhyloNode {
    pub fn leaf(name: &str, score: Option<f64>) -> Self {
        Self {
            name: name.to_owned(),
            score,
            children: vec![],
        }
    }

    /// Parses a tree without serde_json's nesting limit, which caterpillar
    /// trees of a few dozen leaves already exceed. Trees deeper than
    /// [`MAX_TREE_DEPTH`] are rejected.
    pub fn from_json_str(text: &str) -> Result<Self, serde_json::Error> {
        let mut de = serde_json::Deserializer::from_str(text);
        de.disable_recursion_limit();
        let tree = Self::deserialize(serde_stacker::Deserializer::new(&mut de))?;
        de.end()?;
        let depth = tree.depth();
        if depth > MAX_TREE_DEPTH {
            return Err(serde::de::Error::custom(format!(
                "tree is {depth} levels deep, at most {MAX_TREE_DEPTH} are supported"
            )));
        }
        Ok(tree)
    }

    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Number of levels, a lone leaf being 1.
    pub fn depth(&self) -> usize {
        let mut deepest = 0;
        let mut stack = vec![(self, 1)];
        while let Some((node, depth)) = stack.pop() {
            deepest = deepest.max(depth);
            stack.extend(node.children.iter().map(|child| (child, depth + 1)));
        }
        deepest
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    pub fn node_count(&self) -> usize {
        1 + self.children.iter().map(PhyloNode::node_count).sum::<usize>()
    }

    pub fn leaf_names(&self) -> Vec<&str> {
        if self.is_leaf() {
            return vec![self.name.as_str()];
        }
        self.children.iter().flat_map(PhyloNode::leaf_names).collect()
    }
}

// Older tree files store branch lengths as strings.
fn deserialize_score<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawScore {
        Number(f64),
        Text(String),
    }

    match Option::<RawScore>::deserialize(deserializer)? {
        None => Ok(None),
        Some(RawScore::Number(n)) => Ok(Some(n)),
        Some(RawScore::Text(s)) => s
            .trim()
            .parse::<f64>()
            .map(Some)
            .map_err(|e| serde::de::Error::custom(format!("invalid score '{s}': {e}"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dataset_info_parses_upstream_file() {
        let text = r#"{
            "seq_names": {
                "basic_dataset": ["Homo_sapiens_HBB", "Pan_paniscus_HBB"],
                "related_dataset": ["Gallus_gallus_HBB"]
            },
            "optimal_segment": {
                "start": 12,
                "end": 112,
                "num_lowly_conserved": 14,
                "num_highly_conserved": 20
            }
        }"#;
        let info = DatasetInfo::from_json_str(text).unwrap();
        assert_eq!(info.seq_names.basic_dataset.len(), 2);
        assert_eq!(info.optimal_segment.start, 12);
        assert_eq!(info.optimal_segment.num_highly_conserved, Some(20));
        let sets = info.name_sets();
        assert!(sets.is_basic("Pan_paniscus_HBB"));
        assert!(sets.is_related("Gallus_gallus_HBB"));
        assert!(!sets.is_basic("Gallus_gallus_HBB"));
    }

    #[test]
    fn dataset_info_requires_segment() {
        let text = r#"{"seq_names": {"basic_dataset": [], "related_dataset": []}}"#;
        assert!(DatasetInfo::from_json_str(text).is_err());
    }

    #[test]
    fn segment_column_rule_skips_label_column() {
        let seg = OptimalSegment::new(0, 2);
        assert!(!seg.contains_column(0));
        assert!(seg.contains_column(1));
        assert!(seg.contains_column(2));
        assert!(!seg.contains_column(3));
        assert!(OptimalSegment::new(5, 5).is_empty());
    }

    #[test]
    fn tree_accepts_string_scores() {
        let text = r#"{
            "name": "a|b",
            "children": [
                {"name": "a", "score": "0.125"},
                {"name": "b", "score": 0.5}
            ]
        }"#;
        let tree = PhyloNode::from_json_str(text).unwrap();
        assert_eq!(tree.children[0].score, Some(0.125));
        assert_eq!(tree.children[1].score, Some(0.5));
        assert_eq!(tree.score, None);
        assert_eq!(tree.node_count(), 3);
        assert_eq!(tree.leaf_names(), vec!["a", "b"]);
    }

    fn caterpillar(leaves: usize) -> PhyloNode {
        let mut tree = PhyloNode::leaf(&format!("leaf{}", leaves - 1), Some(0.1));
        for i in (0..leaves - 1).rev() {
            tree = PhyloNode {
                name: format!("node{i}"),
                score: Some(0.1),
                children: vec![PhyloNode::leaf(&format!("leaf{i}"), Some(0.1)), tree],
            };
        }
        tree
    }

    #[test]
    fn deep_tree_survives_json_round_trip() {
        let tree = caterpillar(70);
        assert_eq!(tree.depth(), 70);
        let json = tree.to_json_pretty().unwrap();
        let reloaded = PhyloNode::from_json_str(&json).unwrap();
        assert_eq!(reloaded.node_count(), 139);
        assert_eq!(reloaded, tree);
    }

    #[test]
    fn tree_deeper_than_limit_is_rejected() {
        let levels = MAX_TREE_DEPTH + 1;
        let mut json = r#"{"name":"n","children":["#.repeat(levels - 1);
        json.push_str(r#"{"name":"leaf"}"#);
        json.push_str(&"]}".repeat(levels - 1));
        let err = PhyloNode::from_json_str(&json).unwrap_err();
        assert!(err.to_string().contains("levels deep"));
    }

    #[test]
    fn tree_rejects_trailing_input() {
        assert!(PhyloNode::from_json_str(r#"{"name":"a"} {"name":"b"}"#).is_err());
    }

    #[test]
    fn tree_rejects_bad_score() {
        let text = r#"{"name": "a", "score": "long"}"#;
        assert!(PhyloNode::from_json_str(text).is_err());
    }
}
