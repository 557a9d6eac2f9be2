//! Section Visibility Engine.
//!
//! Resolves a [`SectionSetting`] for every level 3-5 section and applies it:
//! hidden sections are detached, collapsible ones get their body wrapped in
//! `<details class="section-details">` with the heading as the summary.

use crate::config::{SectionRules, SectionSetting};
use crate::dom::{DocTree, NodeId};

use super::sections::{heading_element, heading_level, section_identifier, section_level, sections};

/// Counts of what the engine did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct VisibilityStats {
    pub hidden: usize,
    pub collapsed: usize,
}

/// Setting used when no rule matches.
pub fn default_setting(level: u8) -> SectionSetting {
    if level <= 3 {
        SectionSetting::CollapsibleOpen
    } else {
        SectionSetting::CollapsibleClosed
    }
}

/// Effective setting of a section at `level` named `identifier`.
pub fn resolve(rules: &SectionRules, identifier: &str, level: u8) -> SectionSetting {
    rules.resolve(identifier).unwrap_or_else(|| default_setting(level))
}

pub fn apply_visibility(dom: &mut DocTree, root: NodeId, rules: &SectionRules) -> VisibilityStats {
    let mut stats = VisibilityStats::default();

    for section in sections(dom, root) {
        // Sections inside a hidden ancestor are already gone.
        if !dom.is_attached(section) {
            continue;
        }
        let Some(level) = section_level(dom, section).filter(|l| (3..=5).contains(l)) else {
            continue;
        };

        let identifier = section_identifier(dom, section);
        let setting = resolve(rules, &identifier, level);
        tracing::trace!(id = %identifier, level, %setting, "section visibility");

        match setting {
            SectionSetting::Hide => {
                dom.detach(section);
                stats.hidden += 1;
            }
            SectionSetting::AlwaysShow => {}
            SectionSetting::CollapsibleOpen | SectionSetting::CollapsibleClosed => {
                if collapse(dom, section, setting == SectionSetting::CollapsibleOpen) {
                    stats.collapsed += 1;
                }
            }
        }
    }

    tracing::debug!(hidden = stats.hidden, collapsed = stats.collapsed, "applied section settings");
    stats
}

/// Wrap a section's body in a disclosure summarised by its heading.
fn collapse(dom: &mut DocTree, section: NodeId, open: bool) -> bool {
    let Some(marker) = dom
        .children(section)
        .find(|&c| heading_level(dom, c).is_some())
    else {
        return false;
    };
    let Some(heading) = heading_element(dom, marker) else {
        return false;
    };

    let attrs: &[(&str, &str)] = if open {
        &[("class", "section-details"), ("open", "")]
    } else {
        &[("class", "section-details")]
    };
    let details = dom.create_html_element("details", attrs);
    let summary = dom.create_html_element("summary", &[]);

    dom.append(summary, heading);
    if marker != heading {
        dom.detach(marker);
    }
    dom.append(details, summary);
    dom.reparent_children(section, details);
    dom.append(section, details);
    true
}
