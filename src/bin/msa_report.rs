use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use log::{debug, info};
use msa_report::{
    about,
    config::ReportConfig,
    import::{ClustalImport, PHYLOTREE_JSON, SamplePrep, SampleSelection, import_newick},
    report::write_report,
    segment::SegmentParams,
};
use std::path::PathBuf;

/// Static report for a Clustal Omega alignment and guide tree
#[derive(Parser, Debug)]
#[command(name = "msa_report")]
#[command(version = about::MSA_REPORT_DISPLAY_VERSION)]
#[command(about = "Render alignment tables and guide trees into a static HTML report")]
struct Cli {
    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Fetch the artifacts and write the HTML report
    Render(RenderArgs),

    /// Select and rename Blastp hits into the Clustal Omega input FASTA
    Prepare(PrepareArgs),

    /// Convert a Clustal alignment into the alignment CSV and dataset info
    ImportClustal(ImportClustalArgs),

    /// Convert a Newick guide tree into the tree JSON
    ImportNewick(ImportNewickArgs),
}

#[derive(Parser, Debug)]
struct RenderArgs {
    /// JSON configuration file; flags below override it
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Alignment CSV (path or http(s) URL)
    #[arg(long)]
    alignment: Option<String>,

    /// Dataset info JSON (path or http(s) URL)
    #[arg(long)]
    info: Option<String>,

    /// Guide tree JSON (path or http(s) URL)
    #[arg(long)]
    tree: Option<String>,

    /// Output HTML file
    #[arg(short, long)]
    output: Option<String>,

    /// Tab shown when the page opens (msa or phylotree)
    #[arg(long)]
    active_tab: Option<String>,
}

#[derive(Parser, Debug)]
struct PrepareArgs {
    /// Blastp FASTA download for the basic dataset
    #[arg(long)]
    basic: PathBuf,

    /// Blastp FASTA download for the related dataset
    #[arg(long)]
    related: PathBuf,

    /// Directory receiving the cleaned FASTA files
    #[arg(long, default_value = "static/data")]
    out_dir: PathBuf,

    /// Protein name to keep, as written after `Full=`
    #[arg(long, default_value = "Hemoglobin subunit beta")]
    gene: String,

    /// Suffix of the renamed sequences (`Homo_sapiens_HBB`)
    #[arg(long, default_value = "HBB")]
    tag: String,

    /// Sequences kept per dataset
    #[arg(long, default_value = "25")]
    max_sequences: usize,
}

#[derive(Parser, Debug)]
struct ImportClustalArgs {
    /// Clustal formatted alignment (clustalo_alignment.txt)
    #[arg(short, long)]
    alignment: PathBuf,

    /// FASTA file of the basic dataset
    #[arg(long)]
    basic: PathBuf,

    /// FASTA file of the related dataset
    #[arg(long)]
    related: PathBuf,

    /// Directory receiving the artifacts
    #[arg(long, default_value = "static/data")]
    out_dir: PathBuf,

    /// Width of the optimal segment window
    #[arg(long, default_value = "100")]
    window: usize,

    /// Minimum distinct residues for a lowly conserved column
    #[arg(long, default_value = "5")]
    diversity_min_aa: usize,

    /// Share of each dataset written to the training FASTA
    #[arg(long, default_value = "0.8")]
    training_fraction: f64,

    /// Do not write training/testing FASTA files
    #[arg(long)]
    no_split: bool,
}

#[derive(Parser, Debug)]
struct ImportNewickArgs {
    /// Newick guide tree (clustalo_phylotree.txt)
    #[arg(short, long)]
    input: PathBuf,

    /// Output tree JSON
    #[arg(short, long, default_value = PHYLOTREE_JSON)]
    output: PathBuf,
}

fn main() {
    let cli = Cli::parse();
    let log_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level)).init();
    debug!("{}", about::version_cli_text());

    if let Err(e) = run(cli.command) {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}

fn run(command: Commands) -> Result<()> {
    match command {
        Commands::Render(args) => render(args),
        Commands::Prepare(args) => prepare(args),
        Commands::ImportClustal(args) => import_clustal(args),
        Commands::ImportNewick(args) => {
            import_newick(&args.input, &args.output).with_context(|| {
                format!("Could not convert guide tree '{}'", args.input.display())
            })?;
            Ok(())
        }
    }
}

fn render(args: RenderArgs) -> Result<()> {
    let mut config = match &args.config {
        Some(path) => ReportConfig::load_from_path(path)
            .with_context(|| format!("Could not load config '{}'", path.display()))?,
        None => ReportConfig::default(),
    };
    if let Some(alignment) = args.alignment {
        config.alignment = alignment;
    }
    if let Some(info) = args.info {
        config.info = info;
    }
    if let Some(tree) = args.tree {
        config.tree = tree;
    }
    if let Some(output) = args.output {
        config.output = output;
    }
    if let Some(tab) = args.active_tab {
        config.active_tab = tab;
    }
    info!(
        "Rendering report from '{}', '{}', '{}'",
        config.alignment, config.info, config.tree
    );
    write_report(&config).context("Could not render report")
}

fn prepare(args: PrepareArgs) -> Result<()> {
    let prep = SamplePrep {
        basic_fasta: args.basic,
        related_fasta: args.related,
        out_dir: args.out_dir,
        selection: SampleSelection {
            gene: args.gene,
            tag: args.tag,
            max_sequences: args.max_sequences,
        },
    };
    let summary = prep
        .run()
        .with_context(|| format!("Could not prepare sample dataset in '{}'", prep.out_dir.display()))?;
    info!(
        "Prepared {} basic and {} related sequences, {} files written",
        summary.seq_names.basic_dataset.len(),
        summary.seq_names.related_dataset.len(),
        summary.written.len()
    );
    Ok(())
}

fn import_clustal(args: ImportClustalArgs) -> Result<()> {
    let import = ClustalImport {
        alignment: args.alignment,
        basic_fasta: args.basic,
        related_fasta: args.related,
        out_dir: args.out_dir,
        segment: SegmentParams {
            window_size: args.window,
            diversity_min_aa: args.diversity_min_aa,
            ..Default::default()
        },
        training_fraction: (!args.no_split).then_some(args.training_fraction),
    };
    let summary = import
        .run()
        .with_context(|| format!("Could not import '{}'", import.alignment.display()))?;
    info!(
        "Imported {} sequences over {} columns, {} files written",
        summary.sequences,
        summary.columns,
        summary.written.len()
    );
    Ok(())
}
