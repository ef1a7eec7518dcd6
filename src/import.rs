//! Converts upstream Clustal Omega results into the report artifacts.

use crate::clustal::ClustalAlignment;
use crate::error::{ReportError, Result};
use crate::newick::parse_newick;
use crate::segment::{SegmentParams, find_optimal_segment};
use bio::io::fasta;
use log::{info, warn};
use msa_protocol::{BASIC_DATASET, DatasetInfo, OptimalSegment, PhyloNode, RELATED_DATASET, SeqNames};
use regex::Regex;
use std::fs::{self, File};
use std::path::{Path, PathBuf};

pub const ALIGNMENT_CSV: &str = "clustalo_alignment.csv";
pub const DATASET_INFO_JSON: &str = "dataset_info.json";
pub const PHYLOTREE_JSON: &str = "clustalo_phylotree.json";
pub const CLUSTALO_INPUT_FASTA: &str = "clustalo_input.fasta";

fn display(path: &Path) -> String {
    path.display().to_string()
}

/// Sequence identifiers (first word of each header) in file order.
pub fn read_fasta_names(path: &Path) -> Result<Vec<String>> {
    let file = File::open(path).map_err(|e| ReportError::io(display(path), e))?;
    fasta::Reader::new(file)
        .records()
        .map(|record| {
            record
                .map(|r| r.id().to_string())
                .map_err(|e| ReportError::io(display(path), e))
        })
        .collect()
}

/// Which Blastp hits make up a sample and how they are renamed.
#[derive(Clone, Debug)]
pub struct SampleSelection {
    /// Protein name following `Full=` in the hit description.
    pub gene: String,
    /// Appended to the organism name, `Homo_sapiens_HBB`.
    pub tag: String,
    pub max_sequences: usize,
}

impl Default for SampleSelection {
    fn default() -> Self {
        Self {
            gene: "Hemoglobin subunit beta".to_string(),
            tag: "HBB".to_string(),
            max_sequences: 25,
        }
    }
}

/// A Blastp FASTA reduced to the selected hits, headers renamed to
/// `<Organism>_<tag><gene suffix>`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CleanedFasta {
    pub names: Vec<String>,
    pub text: String,
}

/// Keeps the first `max_sequences` records whose description names the gene
/// and ends with a bracketed organism, e.g.
/// `>sp|P02112.2|HBB_CHICK RecName: Full=Hemoglobin subunit beta-A; ... [Gallus gallus]`
/// becomes `>Gallus_gallus_HBB-A`. Sequence lines are kept as they are.
pub fn clean_blastp_fasta(text: &str, selection: &SampleSelection) -> Result<CleanedFasta> {
    let pattern = format!(
        r">[^>]+Full={}([^ ;]+)?[^>]+\[([^\]]+)\]\r?(\n[^>]+)",
        regex::escape(&selection.gene)
    );
    let re = Regex::new(&pattern)
        .map_err(|e| ReportError::String(format!("Invalid gene name '{}': {e}", selection.gene)))?;

    let mut cleaned = CleanedFasta::default();
    for caps in re.captures_iter(text).take(selection.max_sequences) {
        let suffix = caps.get(1).map_or("", |m| m.as_str());
        let organism = caps[2].replace(' ', "_");
        let name = format!("{organism}_{}{suffix}", selection.tag);
        cleaned.text.push('>');
        cleaned.text.push_str(&name);
        cleaned.text.push_str(&caps[3]);
        if !cleaned.text.ends_with('\n') {
            cleaned.text.push('\n');
        }
        cleaned.names.push(name);
    }
    Ok(cleaned)
}

/// Builds the Clustal Omega input from the raw basic and related Blastp
/// downloads.
#[derive(Clone, Debug)]
pub struct SamplePrep {
    pub basic_fasta: PathBuf,
    pub related_fasta: PathBuf,
    pub out_dir: PathBuf,
    pub selection: SampleSelection,
}

#[derive(Clone, Debug)]
pub struct SamplePrepSummary {
    pub seq_names: SeqNames,
    pub written: Vec<PathBuf>,
}

impl SamplePrep {
    /// Writes `basic_dataset.fasta`, `related_dataset.fasta` and the combined
    /// `clustalo_input.fasta`.
    pub fn run(&self) -> Result<SamplePrepSummary> {
        fs::create_dir_all(&self.out_dir).map_err(|e| ReportError::io(display(&self.out_dir), e))?;
        let mut combined = String::new();
        let mut written = vec![];
        let mut seq_names = SeqNames::default();

        let datasets = [
            (BASIC_DATASET, &self.basic_fasta, &mut seq_names.basic_dataset),
            (RELATED_DATASET, &self.related_fasta, &mut seq_names.related_dataset),
        ];
        for (dataset, input, names) in datasets {
            let raw = fs::read_to_string(input).map_err(|e| ReportError::io(display(input), e))?;
            let cleaned = clean_blastp_fasta(&raw, &self.selection)?;
            if cleaned.names.is_empty() {
                warn!(
                    "No '{}' hits in '{}'",
                    self.selection.gene,
                    input.display()
                );
            }
            info!("{dataset}: kept {} sequences", cleaned.names.len());

            let path = self.out_dir.join(format!("{dataset}.fasta"));
            write_file(&path, &cleaned.text)?;
            written.push(path);
            combined.push_str(&cleaned.text);
            *names = cleaned.names;
        }

        let path = self.out_dir.join(CLUSTALO_INPUT_FASTA);
        write_file(&path, &combined)?;
        written.push(path);

        Ok(SamplePrepSummary { seq_names, written })
    }
}

#[derive(Clone, Debug)]
pub struct ClustalImport {
    pub alignment: PathBuf,
    pub basic_fasta: PathBuf,
    pub related_fasta: PathBuf,
    pub out_dir: PathBuf,
    pub segment: SegmentParams,
    /// Share of each dataset written to the training file; `None` skips the split.
    pub training_fraction: Option<f64>,
}

#[derive(Clone, Debug)]
pub struct ClustalImportSummary {
    pub sequences: usize,
    pub columns: usize,
    pub segment: OptimalSegment,
    pub written: Vec<PathBuf>,
}

impl ClustalImport {
    pub fn run(&self) -> Result<ClustalImportSummary> {
        let text = fs::read_to_string(&self.alignment)
            .map_err(|e| ReportError::io(display(&self.alignment), e))?;
        let aln = ClustalAlignment::parse(&text)?;
        let matrix = aln.to_matrix();
        let segment = find_optimal_segment(&matrix, &self.segment)?;
        info!(
            "Optimal segment {}..{} ({:?} lowly, {:?} highly conserved)",
            segment.start, segment.end, segment.num_lowly_conserved, segment.num_highly_conserved
        );

        let info = DatasetInfo {
            seq_names: SeqNames {
                basic_dataset: read_fasta_names(&self.basic_fasta)?,
                related_dataset: read_fasta_names(&self.related_fasta)?,
            },
            optimal_segment: segment.clone(),
        };

        fs::create_dir_all(&self.out_dir).map_err(|e| ReportError::io(display(&self.out_dir), e))?;
        let mut written = vec![];

        let csv_path = self.out_dir.join(ALIGNMENT_CSV);
        write_file(&csv_path, &matrix.to_csv_string()?)?;
        written.push(csv_path);

        let info_path = self.out_dir.join(DATASET_INFO_JSON);
        let json = info
            .to_json_pretty()
            .map_err(|e| ReportError::schema("dataset info", e))?;
        write_file(&info_path, &json)?;
        written.push(info_path);

        if let Some(fraction) = self.training_fraction {
            let datasets = [
                (BASIC_DATASET, &info.seq_names.basic_dataset),
                (RELATED_DATASET, &info.seq_names.related_dataset),
            ];
            for (dataset, names) in datasets {
                written.extend(write_split(
                    &self.out_dir,
                    dataset,
                    names,
                    &aln,
                    &segment,
                    fraction,
                )?);
            }
        }

        Ok(ClustalImportSummary {
            sequences: aln.sequences.len(),
            columns: aln.width(),
            segment,
            written,
        })
    }
}

fn write_file(path: &Path, text: &str) -> Result<()> {
    fs::write(path, text).map_err(|e| ReportError::io(display(path), e))?;
    info!("Wrote '{}'", path.display());
    Ok(())
}

fn trimmed<'a>(sequence: &'a str, segment: &OptimalSegment) -> &'a str {
    let start = (segment.start.max(0) as usize).min(sequence.len());
    let end = (segment.end.max(0) as usize).clamp(start, sequence.len());
    &sequence[start..end]
}

/// Writes `<dataset>_training.fasta` and `<dataset>_testing.fasta` holding
/// the segment of each named sequence; the first `fraction` of the names go
/// to training.
fn write_split(
    out_dir: &Path,
    dataset: &str,
    names: &[String],
    aln: &ClustalAlignment,
    segment: &OptimalSegment,
    fraction: f64,
) -> Result<Vec<PathBuf>> {
    let cutoff = names.len() as f64 * fraction;
    let training_path = out_dir.join(format!("{dataset}_training.fasta"));
    let testing_path = out_dir.join(format!("{dataset}_testing.fasta"));
    let create = |path: &Path| {
        File::create(path)
            .map(fasta::Writer::new)
            .map_err(|e| ReportError::io(display(path), e))
    };
    let mut training = create(&training_path)?;
    let mut testing = create(&testing_path)?;

    for (idx, name) in names.iter().enumerate() {
        let Some(sequence) = aln.sequence(name) else {
            warn!("Sequence '{name}' from {dataset} is not in the alignment");
            continue;
        };
        let (writer, path) = if (idx as f64) < cutoff {
            (&mut training, &training_path)
        } else {
            (&mut testing, &testing_path)
        };
        writer
            .write(name, None, trimmed(sequence, segment).as_bytes())
            .map_err(|e| ReportError::io(display(path), e))?;
    }
    for (writer, path) in [(&mut training, &training_path), (&mut testing, &testing_path)] {
        writer.flush().map_err(|e| ReportError::io(display(path), e))?;
    }
    info!("Wrote {dataset} training/testing split at {cutoff:.1} sequences");
    Ok(vec![training_path, testing_path])
}

/// Converts a Newick guide tree file into the tree JSON artifact.
pub fn import_newick(input: &Path, output: &Path) -> Result<PhyloNode> {
    let text = fs::read_to_string(input).map_err(|e| ReportError::io(display(input), e))?;
    let tree = parse_newick(&text)?;
    let json = tree
        .to_json_pretty()
        .map_err(|e| ReportError::schema("guide tree", e))?;
    write_file(output, &json)?;
    info!("Guide tree: {} nodes, {} leaves", tree.node_count(), tree.leaf_names().len());
    Ok(tree)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alignment::AlignmentMatrix;

    const ALN: &str = "CLUSTAL O(1.2.4) multiple sequence alignment

seqA        MVHLTPEEKS
seqB        MVHWTAEEKQ
seqC        MVEWTDAERA
            **.:*  *:
";

    const BLASTP_BASIC: &str = ">sp|P68871.2|HBB_HUMAN RecName: Full=Hemoglobin subunit beta; AltName: Full=Beta-globin [Homo sapiens]
MVHLTPEEKS
AVTALWGKVN
>sp|P02070.1|HBA_BOVIN RecName: Full=Hemoglobin subunit alpha [Bos taurus]
MVLSAADKGN
>sp|P02112.2|HBB_CHICK RecName: Full=Hemoglobin subunit beta-A; AltName: Full=Beta-A-globin [Gallus gallus]
MVHWTAEEKQ
>XP_003822.1 Full=Hemoglobin subunit beta [Pan paniscus]
MVHLTPEEKS";

    #[test]
    fn test_clean_blastp_fasta() {
        let cleaned = clean_blastp_fasta(BLASTP_BASIC, &SampleSelection::default()).unwrap();
        assert_eq!(
            cleaned.names,
            vec!["Homo_sapiens_HBB", "Gallus_gallus_HBB-A", "Pan_paniscus_HBB"]
        );
        assert_eq!(
            cleaned.text,
            ">Homo_sapiens_HBB\nMVHLTPEEKS\nAVTALWGKVN\n\
             >Gallus_gallus_HBB-A\nMVHWTAEEKQ\n\
             >Pan_paniscus_HBB\nMVHLTPEEKS\n"
        );
    }

    #[test]
    fn test_clean_blastp_fasta_caps_and_filters() {
        let selection = SampleSelection {
            max_sequences: 1,
            ..Default::default()
        };
        let cleaned = clean_blastp_fasta(BLASTP_BASIC, &selection).unwrap();
        assert_eq!(cleaned.names, vec!["Homo_sapiens_HBB"]);

        let alpha = SampleSelection {
            gene: "Hemoglobin subunit alpha".to_string(),
            tag: "HBA".to_string(),
            ..Default::default()
        };
        let cleaned = clean_blastp_fasta(BLASTP_BASIC, &alpha).unwrap();
        assert_eq!(cleaned.names, vec!["Bos_taurus_HBA"]);
    }

    #[test]
    fn test_sample_prep_names_match_fasta_ids() {
        let dir = tempfile::tempdir().unwrap();
        let basic = dir.path().join("basic_raw.fasta");
        let related = dir.path().join("related_raw.fasta");
        fs::write(&basic, BLASTP_BASIC).unwrap();
        fs::write(
            &related,
            ">sp|P02139.1|HBB_DANRE RecName: Full=Hemoglobin subunit beta-1 [Danio rerio]\nMVEWTDAERA\n",
        )
        .unwrap();

        let out_dir = dir.path().join("data");
        let summary = SamplePrep {
            basic_fasta: basic,
            related_fasta: related,
            out_dir: out_dir.clone(),
            selection: SampleSelection::default(),
        }
        .run()
        .unwrap();

        assert_eq!(summary.written.len(), 3);
        assert_eq!(summary.seq_names.related_dataset, vec!["Danio_rerio_HBB-1"]);
        let basic_ids = read_fasta_names(&out_dir.join("basic_dataset.fasta")).unwrap();
        assert_eq!(basic_ids, summary.seq_names.basic_dataset);
        let all_ids = read_fasta_names(&out_dir.join(CLUSTALO_INPUT_FASTA)).unwrap();
        assert_eq!(all_ids.len(), 4);
        assert_eq!(all_ids[3], "Danio_rerio_HBB-1");
    }

    #[test]
    fn test_trimmed() {
        assert_eq!(trimmed("ABCDEFG", &OptimalSegment::new(2, 5)), "CDE");
        assert_eq!(trimmed("ABC", &OptimalSegment::new(1, 10)), "BC");
        assert_eq!(trimmed("ABC", &OptimalSegment::new(5, 10)), "");
        assert_eq!(trimmed("ABC", &OptimalSegment::new(-3, 1)), "A");
    }

    #[test]
    fn test_clustal_import_writes_artifacts() {
        let dir = tempfile::tempdir().unwrap();
        let aln = dir.path().join("aln.txt");
        let basic = dir.path().join("basic.fasta");
        let related = dir.path().join("related.fasta");
        fs::write(&aln, ALN).unwrap();
        fs::write(&basic, ">seqA Homo sapiens\nMVHLTPEEKS\n>seqB\nMVHWTAEEKQ\n").unwrap();
        fs::write(&related, ">seqC Danio\nMVEWTDAERA\n").unwrap();

        let out_dir = dir.path().join("out");
        let summary = ClustalImport {
            alignment: aln,
            basic_fasta: basic,
            related_fasta: related,
            out_dir: out_dir.clone(),
            segment: SegmentParams {
                window_size: 4,
                diversity_min_aa: 3,
                diversity_lower_fraction: 0.25,
                diversity_upper_fraction: 0.5,
            },
            training_fraction: Some(0.5),
        }
        .run()
        .unwrap();

        assert_eq!(summary.sequences, 3);
        assert_eq!(summary.columns, 10);
        assert_eq!(summary.written.len(), 6);

        let info_text = fs::read_to_string(out_dir.join(DATASET_INFO_JSON)).unwrap();
        let info = DatasetInfo::from_json_str(&info_text).unwrap();
        assert_eq!(info.seq_names.basic_dataset, vec!["seqA", "seqB"]);
        assert_eq!(info.seq_names.related_dataset, vec!["seqC"]);
        assert_eq!(info.optimal_segment, summary.segment);

        let csv = fs::read_to_string(out_dir.join(ALIGNMENT_CSV)).unwrap();
        let matrix = AlignmentMatrix::from_csv_str(&csv).unwrap();
        assert_eq!(matrix.len(), 5);
        assert!(matrix.row("num_unique").is_some());

        let training = fs::read_to_string(out_dir.join("basic_dataset_training.fasta")).unwrap();
        let testing = fs::read_to_string(out_dir.join("basic_dataset_testing.fasta")).unwrap();
        assert!(training.starts_with(">seqA\n"));
        assert!(testing.starts_with(">seqB\n"));
        let related_training =
            fs::read_to_string(out_dir.join("related_dataset_training.fasta")).unwrap();
        assert!(related_training.starts_with(">seqC\n"));
    }

    #[test]
    fn test_newick_import() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("tree.dnd");
        let output = dir.path().join(PHYLOTREE_JSON);
        fs::write(&input, "((a:0.1,b:0.2):0.05,c:0.3);\n").unwrap();
        let tree = import_newick(&input, &output).unwrap();
        assert_eq!(tree.name, "a|b|c");
        let reloaded = PhyloNode::from_json_str(&fs::read_to_string(&output).unwrap()).unwrap();
        assert_eq!(reloaded, tree);
    }

    #[test]
    fn test_deep_newick_import_loads_back() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("caterpillar.dnd");
        let output = dir.path().join(PHYLOTREE_JSON);
        let mut newick = "leaf69:0.1".to_string();
        for i in (0..69).rev() {
            newick = format!("(leaf{i}:0.1,{newick}):0.1");
        }
        fs::write(&input, format!("{newick};\n")).unwrap();

        let tree = import_newick(&input, &output).unwrap();
        assert_eq!(tree.node_count(), 139);
        let source = crate::config::ArtifactSource::Path(output.to_string_lossy().to_string());
        let loaded = crate::loader::load_tree(&source, std::time::Duration::from_secs(1)).unwrap();
        assert_eq!(loaded.depth(), 70);
        assert_eq!(loaded, tree);
    }
}
