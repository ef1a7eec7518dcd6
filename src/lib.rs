pub mod about;
pub mod alignment;
pub mod amino_acids;
pub mod clustal;
pub mod config;
pub mod error;
pub mod import;
pub mod loader;
pub mod msa_table;
pub mod newick;
pub mod phylo_tree;
pub mod report;
pub mod segment;
pub mod style;
pub mod tabs;

pub use error::{ReportError, Result};
