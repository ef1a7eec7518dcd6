//! Tab controls and panels of the report page.
//!
//! Activation clears the `active` marker everywhere, then sets it on the
//! activated control and on the panel whose id the control names. The page
//! ships the same behaviour as a small inline script for clicks.

use html_escape::{encode_double_quoted_attribute, encode_text};
use std::fmt::Write;

pub const ACTIVE_CLASS: &str = "active";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TabControl {
    pub label: String,
    /// Id of the panel this control reveals.
    pub target: String,
    pub active: bool,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TabPanel {
    pub id: String,
    pub body: String,
    pub active: bool,
}

#[derive(Clone, Debug, Default)]
pub struct TabSet {
    controls: Vec<TabControl>,
    panels: Vec<TabPanel>,
}

impl TabSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a panel together with the control that reveals it.
    pub fn add(&mut self, id: &str, label: &str, body: String) -> &mut Self {
        self.controls.push(TabControl {
            label: label.to_string(),
            target: id.to_string(),
            active: false,
        });
        self.panels.push(TabPanel {
            id: id.to_string(),
            body,
            active: false,
        });
        self
    }

    pub fn add_control(&mut self, label: &str, target: &str) -> &mut Self {
        self.controls.push(TabControl {
            label: label.to_string(),
            target: target.to_string(),
            active: false,
        });
        self
    }

    pub fn controls(&self) -> &[TabControl] {
        &self.controls
    }

    pub fn panels(&self) -> &[TabPanel] {
        &self.panels
    }

    pub fn activate(&mut self, control: usize) {
        let Some(target) = self.controls.get(control).map(|c| c.target.clone()) else {
            return;
        };
        for panel in &mut self.panels {
            panel.active = false;
        }
        for c in &mut self.controls {
            c.active = false;
        }
        if let Some(panel) = self.panels.iter_mut().find(|p| p.id == target) {
            panel.active = true;
        }
        self.controls[control].active = true;
    }

    /// Activates the first control targeting `id`, if any.
    pub fn activate_tab(&mut self, id: &str) {
        if let Some(idx) = self.controls.iter().position(|c| c.target == id) {
            self.activate(idx);
        }
    }

    pub fn active_panel(&self) -> Option<&str> {
        self.panels
            .iter()
            .find(|p| p.active)
            .map(|p| p.id.as_str())
    }

    pub fn write_controls(&self, html: &mut String) -> std::fmt::Result {
        writeln!(html, "<nav class=\"buttons\">")?;
        for control in &self.controls {
            writeln!(
                html,
                "<button class=\"{}\" data-tab=\"{}\">{}</button>",
                class_list("button", control.active),
                encode_double_quoted_attribute(&control.target),
                encode_text(&control.label)
            )?;
        }
        writeln!(html, "</nav>")
    }

    pub fn write_panels(&self, html: &mut String) -> std::fmt::Result {
        for panel in &self.panels {
            writeln!(
                html,
                "<div class=\"{}\" id=\"{}\">",
                class_list("tab", panel.active),
                encode_double_quoted_attribute(&panel.id)
            )?;
            html.push_str(&panel.body);
            writeln!(html, "</div>")?;
        }
        Ok(())
    }
}

fn class_list(base: &str, active: bool) -> String {
    if active {
        format!("{base} {ACTIVE_CLASS}")
    } else {
        base.to_string()
    }
}

/// Click handler mirroring [`TabSet::activate`].
pub const TAB_SCRIPT: &str = r#"document.querySelectorAll('.button').forEach(function (button) {
  button.addEventListener('click', function () {
    var sel = button.dataset.tab;
    document.querySelectorAll('.tab, .button').forEach(function (el) {
      el.classList.remove('active');
    });
    var panel = document.getElementById(sel);
    if (panel) panel.classList.add('active');
    button.classList.add('active');
  });
});"#;

#[cfg(test)]
mod tests {
    use super::*;

    fn tabs() -> TabSet {
        let mut tabs = TabSet::new();
        tabs.add("msa", "Alignment", String::new())
            .add("phylotree", "Guide tree", String::new());
        tabs
    }

    fn active_counts(tabs: &TabSet) -> (usize, usize) {
        (
            tabs.panels().iter().filter(|p| p.active).count(),
            tabs.controls().iter().filter(|c| c.active).count(),
        )
    }

    #[test]
    fn test_activate_phylotree() {
        let mut tabs = tabs();
        tabs.activate_tab("msa");
        tabs.activate_tab("phylotree");
        assert_eq!(active_counts(&tabs), (1, 1));
        assert_eq!(tabs.active_panel(), Some("phylotree"));
        assert!(tabs.controls()[1].active);
    }

    #[test]
    fn test_activate_is_idempotent() {
        let mut tabs = tabs();
        tabs.activate(0);
        let panels = tabs.panels().to_vec();
        let controls = tabs.controls().to_vec();
        tabs.activate(0);
        assert_eq!(tabs.panels(), panels.as_slice());
        assert_eq!(tabs.controls(), controls.as_slice());
    }

    #[test]
    fn test_unmatched_control_leaves_panels_unmarked() {
        let mut tabs = tabs();
        tabs.add_control("Nowhere", "missing");
        tabs.activate(0);
        tabs.activate(2);
        assert_eq!(active_counts(&tabs), (0, 1));
        assert!(tabs.controls()[2].active);
        assert_eq!(tabs.active_panel(), None);
    }

    #[test]
    fn test_unknown_tab_id_is_ignored() {
        let mut tabs = tabs();
        tabs.activate_tab("msa");
        tabs.activate_tab("nope");
        assert_eq!(tabs.active_panel(), Some("msa"));
    }

    #[test]
    fn test_markup() {
        let mut tabs = tabs();
        tabs.activate_tab("phylotree");
        let mut html = String::new();
        tabs.write_controls(&mut html).unwrap();
        tabs.write_panels(&mut html).unwrap();
        assert!(html.contains("<button class=\"button\" data-tab=\"msa\">Alignment</button>"));
        assert!(html.contains("<button class=\"button active\" data-tab=\"phylotree\">"));
        assert!(html.contains("<div class=\"tab\" id=\"msa\">"));
        assert!(html.contains("<div class=\"tab active\" id=\"phylotree\">"));
    }

    #[test]
    fn test_markup_escapes_ids_and_labels() {
        let mut tabs = TabSet::new();
        tabs.add("a\"b", "<Tree>", String::new());
        let mut html = String::new();
        tabs.write_controls(&mut html).unwrap();
        tabs.write_panels(&mut html).unwrap();
        assert!(html.contains("data-tab=\"a&quot;b\">&lt;Tree&gt;</button>"));
        assert!(html.contains("id=\"a&quot;b\""));
    }
}
