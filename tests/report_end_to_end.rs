use msa_report::config::ReportConfig;
use msa_report::import::{ALIGNMENT_CSV, ClustalImport, DATASET_INFO_JSON, PHYLOTREE_JSON, import_newick};
use msa_report::loader::load_report_data;
use msa_report::msa_table::build_msa_table;
use msa_report::report::write_report;
use msa_report::segment::SegmentParams;
use msa_report::style::StyleTag;
use std::fs;
use std::path::Path;

fn path_str(path: &Path) -> String {
    path.to_string_lossy().to_string()
}

#[test]
fn markings_row_and_residue_row_render_as_documented() {
    let dir = tempfile::tempdir().unwrap();
    let alignment = dir.path().join("aln.csv");
    let info = dir.path().join("info.json");
    let tree = dir.path().join("tree.json");
    fs::write(&alignment, "markings,+,*\nseqA,A,D\n").unwrap();
    fs::write(
        &info,
        r#"{"seq_names":{"basic_dataset":["seqA"],"related_dataset":[]},
            "optimal_segment":{"start":0,"end":1}}"#,
    )
    .unwrap();
    fs::write(&tree, r#"{"name":"seqA"}"#).unwrap();

    let config = ReportConfig {
        alignment: path_str(&alignment),
        info: path_str(&info),
        tree: path_str(&tree),
        output: path_str(&dir.path().join("report.html")),
        ..Default::default()
    };
    let data = load_report_data(&config).unwrap();
    let table = build_msa_table(&data.alignment, &data.info);

    let markings: Vec<(&str, bool)> = table.rows()[0]
        .iter()
        .map(|c| (c.text.as_str(), c.highlighted))
        .collect();
    assert_eq!(
        markings,
        vec![("Clustal Omega Markings", false), ("+", true), ("*", false)]
    );

    let seq = &table.rows()[1];
    assert!(seq[0].tags.contains(StyleTag::Basic));
    assert!(seq[1].tags.contains(StyleTag::Red));
    assert!(seq[1].highlighted);
    assert!(seq[2].tags.contains(StyleTag::Blue));
    assert!(!seq[2].highlighted);

    write_report(&config).unwrap();
    let html = fs::read_to_string(&config.output).unwrap();
    assert!(html.contains("<td class=\"red\" bgcolor=\"#eee8aa\">A</td>"));
    assert!(html.contains("<td class=\"blue\">D</td>"));
    // A single-node tree is its own visible leaf.
    assert_eq!(html.matches("<circle").count(), 1);
}

#[test]
fn imported_artifacts_feed_the_report() {
    let dir = tempfile::tempdir().unwrap();
    let aln = dir.path().join("clustalo_alignment.txt");
    let newick = dir.path().join("clustalo_phylotree.txt");
    let basic = dir.path().join("basic.fasta");
    let related = dir.path().join("related.fasta");
    fs::write(
        &aln,
        "CLUSTAL O(1.2.4) multiple sequence alignment\n\n\
         Homo_sapiens_HBB      MVHLTPEEKSAV\n\
         Pan_paniscus_HBB      MVHLTPEEKSAV\n\
         Gallus_gallus_HBB     MVHWTAEEKQLI\n\
         \x20                     ***:*.***.:.\n",
    )
    .unwrap();
    fs::write(
        &newick,
        "(\n(\nHomo_sapiens_HBB:0.001,\nPan_paniscus_HBB:0.002)\n:0.1,\nGallus_gallus_HBB:0.3);\n",
    )
    .unwrap();
    fs::write(
        &basic,
        ">Homo_sapiens_HBB\nMVHLTPEEKSAV\n>Pan_paniscus_HBB\nMVHLTPEEKSAV\n",
    )
    .unwrap();
    fs::write(&related, ">Gallus_gallus_HBB\nMVHWTAEEKQLI\n").unwrap();

    let out_dir = dir.path().join("data");
    ClustalImport {
        alignment: aln,
        basic_fasta: basic,
        related_fasta: related,
        out_dir: out_dir.clone(),
        segment: SegmentParams {
            window_size: 6,
            diversity_min_aa: 2,
            ..Default::default()
        },
        training_fraction: None,
    }
    .run()
    .unwrap();
    import_newick(&newick, &out_dir.join(PHYLOTREE_JSON)).unwrap();

    let config = ReportConfig {
        alignment: path_str(&out_dir.join(ALIGNMENT_CSV)),
        info: path_str(&out_dir.join(DATASET_INFO_JSON)),
        tree: path_str(&out_dir.join(PHYLOTREE_JSON)),
        output: path_str(&dir.path().join("report.html")),
        active_tab: "phylotree".to_string(),
        ..Default::default()
    };
    write_report(&config).unwrap();
    let html = fs::read_to_string(&config.output).unwrap();

    assert!(html.contains("Number of Unique Amino Acids"));
    assert!(html.contains("<td class=\"basic\">Homo_sapiens_HBB</td>"));
    assert!(html.contains("<td class=\"related\">Gallus_gallus_HBB</td>"));
    assert!(html.contains("<div class=\"tab active\" id=\"phylotree\">"));
    // Two internal nodes are hidden, three leaves drawn, four links.
    assert_eq!(html.matches("<circle").count(), 3);
    assert_eq!(html.matches("class=\"link\"").count(), 4);
    assert!(!html.contains(">Homo_sapiens_HBB|Pan_paniscus_HBB<"));
}
