pub const MSA_REPORT_DISPLAY_VERSION: &str = env!("MSA_REPORT_DISPLAY_VERSION");
pub const MSA_REPORT_BUILD_N: &str = env!("MSA_REPORT_BUILD_N");

pub fn version_cli_text() -> String {
    format!(
        "msa_report {}\nBuild {}\nStatic alignment and guide tree report generator",
        MSA_REPORT_DISPLAY_VERSION, MSA_REPORT_BUILD_N
    )
}

/// Footer line embedded in generated pages.
pub fn generator_tag() -> String {
    format!("msa_report {MSA_REPORT_DISPLAY_VERSION}")
}
