use crate::about;
use crate::amino_acids::AminoAcidColor;
use crate::config::ReportConfig;
use crate::error::{ReportError, Result};
use crate::loader::{ReportData, load_report_data};
use crate::msa_table::build_msa_table;
use crate::phylo_tree::layout_tree_drawing;
use crate::tabs::{TAB_SCRIPT, TabSet};
use html_escape::encode_text;
use log::info;
use std::fmt::Write;
use std::fs;

pub const MSA_TAB: &str = "msa";
pub const PHYLOTREE_TAB: &str = "phylotree";

const BASIC_COLOR: &str = "#c0392b";
const RELATED_COLOR: &str = "#2471a3";

fn write_style(html: &mut String) -> std::fmt::Result {
    writeln!(html, "<style>")?;
    writeln!(
        html,
        "body{{font-family:Arial,Helvetica,sans-serif;margin:20px;color:#222;background:#fff;}}"
    )?;
    writeln!(html, "h1{{margin:0 0 12px 0;font-size:22px;}}")?;
    writeln!(
        html,
        ".button{{border:1px solid #ccc;background:#f5f5f5;padding:6px 14px;cursor:pointer;}}"
    )?;
    writeln!(html, ".button.active{{background:#fff;border-bottom-color:#fff;font-weight:bold;}}")?;
    writeln!(html, ".tab{{display:none;border-top:1px solid #ccc;padding-top:12px;}}")?;
    writeln!(html, ".tab.active{{display:block;}}")?;
    writeln!(html, ".scroll-wrapper{{overflow-x:auto;}}")?;
    writeln!(
        html,
        "table{{border-collapse:collapse;font-family:monospace;font-size:12px;white-space:nowrap;}}"
    )?;
    writeln!(html, "td{{padding:1px 3px;text-align:center;}}")?;
    writeln!(html, "td:first-child{{text-align:left;padding-right:12px;}}")?;
    writeln!(html, ".basic{{color:{BASIC_COLOR};font-weight:bold;fill:{BASIC_COLOR};}}")?;
    writeln!(html, ".related{{color:{RELATED_COLOR};font-weight:bold;fill:{RELATED_COLOR};}}")?;
    for color in AminoAcidColor::ALL {
        writeln!(
            html,
            ".{}{{color:{};}}",
            color.style_tag().as_str(),
            color.css_color()
        )?;
    }
    writeln!(html, "footer{{color:#777;font-size:11px;margin-top:24px;}}")?;
    writeln!(html, "</style>")
}

/// Renders the complete page: table first, then the tree.
pub fn render_report(data: &ReportData, config: &ReportConfig) -> Result<String> {
    let table = build_msa_table(&data.alignment, &data.info);
    info!(
        "Alignment table: {} rows, {} highlighted cells",
        table.rows().len(),
        table.highlighted_cells()
    );
    let mut msa_body = String::new();
    writeln!(msa_body, "<div class=\"scroll-wrapper\">")?;
    table.write_html(&mut msa_body, &config.highlight_color)?;
    writeln!(msa_body, "</div>")?;

    let drawing = layout_tree_drawing(&data.tree, &data.info, config.tree_canvas());
    info!(
        "Guide tree: {} links, {} labelled nodes",
        drawing.links.len(),
        drawing.marks.len()
    );
    let mut tree_body = String::new();
    writeln!(tree_body, "<div class=\"svg-wrapper\">")?;
    writeln!(tree_body, "{}", drawing.to_svg_string())?;
    writeln!(tree_body, "</div>")?;

    let mut tabs = TabSet::new();
    tabs.add(MSA_TAB, "Multiple Sequence Alignment", msa_body)
        .add(PHYLOTREE_TAB, "Phylogenetic Tree", tree_body);
    tabs.activate_tab(&config.active_tab);

    let mut html = String::with_capacity(64 * 1024);
    writeln!(html, "<!DOCTYPE html>")?;
    writeln!(html, "<html lang=\"en\">")?;
    writeln!(html, "<head>")?;
    writeln!(html, "<meta charset=\"utf-8\"/>")?;
    writeln!(html, "<title>{}</title>", encode_text(&config.title))?;
    write_style(&mut html)?;
    writeln!(html, "</head>")?;
    writeln!(html, "<body>")?;
    writeln!(html, "<h1>{}</h1>", encode_text(&config.title))?;
    tabs.write_controls(&mut html)?;
    tabs.write_panels(&mut html)?;
    writeln!(html, "<footer>Generated by {}</footer>", encode_text(&about::generator_tag()))?;
    writeln!(html, "<script>\n{TAB_SCRIPT}\n</script>")?;
    writeln!(html, "</body>")?;
    writeln!(html, "</html>")?;
    Ok(html)
}

/// Loads the artifacts named by `config` and writes the page to `config.output`.
pub fn write_report(config: &ReportConfig) -> Result<()> {
    let data = load_report_data(config)?;
    let html = render_report(&data, config)?;
    fs::write(&config.output, &html).map_err(|e| ReportError::io(config.output.clone(), e))?;
    info!("Wrote report to '{}' ({} bytes)", config.output, html.len());
    Ok(())
}
