//! Guide tree dendrogram.
//!
//! Nodes are placed with a cluster layout (all leaves on the outer edge,
//! evenly spaced) and drawn left to right: depth runs along x, leaves are
//! spread along y. Links are elbows from the child to its parent.

use crate::style::StyleTag;
use msa_protocol::{DatasetInfo, NameSets, PhyloNode};
use svg::Document;
use svg::node::element::path::Data;
use svg::node::element::{Circle, Group, Path, Text};

pub const DEFAULT_WIDTH: f64 = 800.0;
pub const DEFAULT_HEIGHT: f64 = 2000.0;
pub const DEFAULT_LABEL_MARGIN: f64 = 200.0;
pub const DEFAULT_LABEL_OFFSET: f64 = 8.0;
pub const DEFAULT_NODE_RADIUS: f64 = 4.5;
const MARGIN_LEFT: f64 = 40.0;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TreeCanvas {
    pub width: f64,
    pub height: f64,
    /// Space kept free on the right for leaf labels.
    pub label_margin: f64,
    pub label_offset: f64,
    pub node_radius: f64,
}

impl Default for TreeCanvas {
    fn default() -> Self {
        Self {
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
            label_margin: DEFAULT_LABEL_MARGIN,
            label_offset: DEFAULT_LABEL_OFFSET,
            node_radius: DEFAULT_NODE_RADIUS,
        }
    }
}

impl TreeCanvas {
    /// Layout extent as (breadth, depth).
    fn layout_size(&self) -> (f64, f64) {
        (self.height, (self.width - self.label_margin - MARGIN_LEFT).max(0.0))
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct LayoutNode {
    pub name: String,
    pub parent: Option<usize>,
    pub children: Vec<usize>,
    /// Position across the leaves.
    pub breadth: f64,
    /// Distance from the root.
    pub depth: f64,
}

impl LayoutNode {
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }
}

/// Arena of laid out nodes in pre-order; index 0 is the root.
#[derive(Clone, Debug, Default)]
pub struct TreeLayout {
    nodes: Vec<LayoutNode>,
}

impl TreeLayout {
    pub fn nodes(&self) -> &[LayoutNode] {
        &self.nodes
    }

    pub fn root(&self) -> Option<&LayoutNode> {
        self.nodes.first()
    }

    pub fn leaves(&self) -> impl Iterator<Item = &LayoutNode> {
        self.nodes.iter().filter(|n| n.is_leaf())
    }

    fn push(&mut self, node: &PhyloNode, parent: Option<usize>) -> usize {
        let idx = self.nodes.len();
        self.nodes.push(LayoutNode {
            name: node.name.clone(),
            parent,
            children: vec![],
            breadth: 0.0,
            depth: 0.0,
        });
        for child in &node.children {
            let child_idx = self.push(child, Some(idx));
            self.nodes[idx].children.push(child_idx);
        }
        idx
    }

    fn post_order(&self, idx: usize, out: &mut Vec<usize>) {
        for &child in &self.nodes[idx].children {
            self.post_order(child, out);
        }
        out.push(idx);
    }

    fn separation(&self, a: usize, b: usize) -> f64 {
        if self.nodes[a].parent == self.nodes[b].parent {
            1.0
        } else {
            2.0
        }
    }

    fn outer_leaf(&self, mut idx: usize, leftmost: bool) -> usize {
        loop {
            let children = &self.nodes[idx].children;
            let next = if leftmost {
                children.first()
            } else {
                children.last()
            };
            match next {
                Some(&child) => idx = child,
                None => return idx,
            }
        }
    }
}

/// Cluster layout over `size` = (breadth, depth).
///
/// Leaves are spaced one unit apart from their siblings and two units from
/// cousins, internal nodes sit at the mean breadth of their children and one
/// level above their deepest child. The result is scaled so the root is at
/// depth 0 and every leaf at `size.1`.
pub fn cluster_layout(tree: &PhyloNode, size: (f64, f64)) -> TreeLayout {
    let mut layout = TreeLayout::default();
    layout.push(tree, None);

    let mut order = Vec::with_capacity(layout.nodes.len());
    layout.post_order(0, &mut order);

    let mut previous_leaf: Option<usize> = None;
    let mut cursor = 0.0;
    for &idx in &order {
        if layout.nodes[idx].is_leaf() {
            if let Some(prev) = previous_leaf {
                cursor += layout.separation(idx, prev);
            }
            layout.nodes[idx].breadth = cursor;
            layout.nodes[idx].depth = 0.0;
            previous_leaf = Some(idx);
        } else {
            let children = &layout.nodes[idx].children;
            let mean = children
                .iter()
                .map(|&c| layout.nodes[c].breadth)
                .sum::<f64>()
                / children.len() as f64;
            let height = children
                .iter()
                .map(|&c| layout.nodes[c].depth)
                .fold(0.0, f64::max)
                + 1.0;
            layout.nodes[idx].breadth = mean;
            layout.nodes[idx].depth = height;
        }
    }

    let left = layout.outer_leaf(0, true);
    let right = layout.outer_leaf(0, false);
    let x0 = layout.nodes[left].breadth - layout.separation(left, right) / 2.0;
    let x1 = layout.nodes[right].breadth + layout.separation(right, left) / 2.0;
    let root_height = layout.nodes[0].depth;
    let (dx, dy) = size;
    for node in &mut layout.nodes {
        node.breadth = (node.breadth - x0) / (x1 - x0) * dx;
        node.depth = if root_height > 0.0 {
            (1.0 - node.depth / root_height) * dy
        } else {
            0.0
        };
    }
    layout
}

/// Synthetic internal nodes are named by joining their children with `|`.
pub fn is_hidden_node(name: &str) -> bool {
    name.contains('|')
}

/// Labels are binary: anything outside the basic set counts as related.
pub fn label_tag(name: &str, names: &NameSets) -> StyleTag {
    if names.is_basic(name) {
        StyleTag::Basic
    } else {
        StyleTag::Related
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct TreeLink {
    pub from: (f64, f64),
    pub to: (f64, f64),
}

impl TreeLink {
    /// Horizontal leg to the parent's depth, then vertical to the parent.
    pub fn path_data(&self) -> Data {
        Data::new()
            .move_to((self.from.0 as f32, self.from.1 as f32))
            .horizontal_line_to(self.to.0 as f32)
            .vertical_line_to(self.to.1 as f32)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct TreeMark {
    pub name: String,
    pub x: f64,
    pub y: f64,
    pub tag: StyleTag,
}

/// Screen-space drawing of a tree: one link per non-root node, one mark per
/// visible node.
#[derive(Clone, Debug, Default)]
pub struct TreeDrawing {
    pub canvas: TreeCanvas,
    pub links: Vec<TreeLink>,
    pub marks: Vec<TreeMark>,
}

pub fn layout_tree_drawing(tree: &PhyloNode, info: &DatasetInfo, canvas: TreeCanvas) -> TreeDrawing {
    let layout = cluster_layout(tree, canvas.layout_size());
    let names = info.name_sets();
    let screen = |node: &LayoutNode| (node.depth + MARGIN_LEFT, node.breadth);

    let links = layout
        .nodes()
        .iter()
        .filter_map(|node| {
            let parent = &layout.nodes()[node.parent?];
            Some(TreeLink {
                from: screen(node),
                to: screen(parent),
            })
        })
        .collect();

    let marks = layout
        .nodes()
        .iter()
        .filter(|node| !is_hidden_node(&node.name))
        .map(|node| {
            let (x, y) = screen(node);
            TreeMark {
                name: node.name.clone(),
                x,
                y,
                tag: label_tag(&node.name, &names),
            }
        })
        .collect();

    TreeDrawing {
        canvas,
        links,
        marks,
    }
}

impl TreeDrawing {
    pub fn to_document(&self) -> Document {
        let canvas = &self.canvas;
        let mut doc = Document::new()
            .set("viewBox", (0, 0, canvas.width, canvas.height))
            .set("width", canvas.width)
            .set("height", canvas.height);

        let mut links = Group::new().set("class", "links");
        for link in &self.links {
            links = links.add(
                Path::new()
                    .set("class", "link")
                    .set("d", link.path_data())
                    .set("fill", "none")
                    .set("stroke", "#999999")
                    .set("stroke-width", 1.2),
            );
        }
        doc = doc.add(links);

        let mut nodes = Group::new().set("class", "nodes");
        for mark in &self.marks {
            nodes = nodes.add(
                Group::new()
                    .set("class", "node")
                    .set("transform", format!("translate({},{})", mark.x, mark.y))
                    .add(
                        Circle::new()
                            .set("r", canvas.node_radius)
                            .set("fill", "#ffffff")
                            .set("stroke", "#4682b4")
                            .set("stroke-width", 1.5),
                    )
                    .add(
                        Text::new(mark.name.clone())
                            .set("class", mark.tag.as_str())
                            .set("x", canvas.label_offset)
                            .set("dy", 3)
                            .set("font-family", "Helvetica, Arial, sans-serif")
                            .set("font-size", 10),
                    ),
            );
        }
        doc.add(nodes)
    }

    pub fn to_svg_string(&self) -> String {
        self.to_document().to_string()
    }
}

pub fn render_tree_svg(tree: &PhyloNode, info: &DatasetInfo, canvas: TreeCanvas) -> String {
    layout_tree_drawing(tree, info, canvas).to_svg_string()
}
