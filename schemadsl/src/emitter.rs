//! Compact DSL rendering.
//!
//! Two pure functions over already-built model fragments: page mode and
//! context mode. Connectivity is net-centric: simple components never get
//! blocks and surface only inside net connection lines, complex components
//! get full DEF blocks, and oversized global nets truncate explicitly.

use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};

use crate::classify;
use crate::model::{Component, Net};

/// Global nets list at most this many connections before summarizing.
const MAX_GLOBAL_CONNECTIONS: usize = 10;

/// Inter-page nets enumerate their pages up to this count; past it the
/// LINKS line collapses to the ALL_PAGES marker.
const MAX_ENUMERATED_PAGES: usize = 3;

/// Render one schematic page.
///
/// `net_page_map` is the design-wide net→pages atlas; it decides the LINKS
/// line independently of the page-local view of each net.
pub fn emit_page(
    page_name: &str,
    components: &[&Component],
    nets: &[&Net],
    net_page_map: &BTreeMap<String, BTreeSet<String>>,
) -> String {
    let mut sorted_components: Vec<&Component> = components.to_vec();
    sorted_components.sort_by(|a, b| natural_cmp(&a.refdes, &b.refdes));
    let mut sorted_nets: Vec<&Net> = nets.to_vec();
    sorted_nets.sort_by(|a, b| a.name.cmp(&b.name));

    let mut lines = vec![format!("# PAGE: {page_name}"), String::new()];

    lines.push("# COMPONENTS".to_string());
    let complex: Vec<&Component> = sorted_components
        .iter()
        .copied()
        .filter(|c| classify::is_complex(c))
        .collect();
    if complex.is_empty() {
        lines.push("(All components are simple passives - see NETS section)".to_string());
    } else {
        for component in complex {
            lines.push(component_block(component));
        }
    }

    lines.push(String::new());
    lines.push("# NETS".to_string());
    let no_pages = BTreeSet::new();
    for net in sorted_nets {
        let pages = net_page_map.get(&net.name).unwrap_or(&no_pages);
        lines.push(net_block(net, pages, &sorted_components));
    }

    lines.join("\n")
}

/// Render a context bubble: the requested components in full, their 1-hop
/// neighbors as one-line summaries, and the nets that connect them.
pub fn emit_context(
    primary: &[&Component],
    neighbors: &[&Component],
    nets: &[&Net],
) -> String {
    let mut sorted_primary: Vec<&Component> = primary.to_vec();
    sorted_primary.sort_by(|a, b| natural_cmp(&a.refdes, &b.refdes));
    let mut sorted_neighbors: Vec<&Component> = neighbors.to_vec();
    sorted_neighbors.sort_by(|a, b| natural_cmp(&a.refdes, &b.refdes));
    let mut sorted_nets: Vec<&Net> = nets.to_vec();
    sorted_nets.sort_by(|a, b| a.name.cmp(&b.name));

    let refdes_list: Vec<&str> = sorted_primary.iter().map(|c| c.refdes.as_str()).collect();
    let mut lines = vec![format!("# CONTEXT: {}", refdes_list.join(", ")), String::new()];

    lines.push("# COMPONENTS".to_string());
    for component in &sorted_primary {
        lines.push(component_block(component));
    }

    lines.push(String::new());
    if !sorted_neighbors.is_empty() {
        lines.push("# CONTEXT_NEIGHBORS".to_string());
        for component in &sorted_neighbors {
            lines.push(neighbor_summary(component));
        }
        lines.push(String::new());
    }

    lines.push("# NETS".to_string());
    let mut all_components = sorted_primary;
    all_components.extend(sorted_neighbors);
    for net in sorted_nets {
        lines.push(net_block(net, &net.pages, &all_components));
    }

    lines.join("\n")
}

/// Full block for one component.
///
/// Empty description, MPN, and footprint lines are omitted rather than
/// rendered blank.
fn component_block(component: &Component) -> String {
    let mut lines = Vec::new();

    let derived = classify::derived_type(component);
    if component.description.is_empty() {
        lines.push(format!("DEF {derived}"));
    } else {
        lines.push(format!("DEF {derived} {}", component.description));
    }
    lines.push(format!("COMP {} ({})", component.refdes, component.value));

    if !component.mpn.is_empty() {
        lines.push(format!("  MPN: {}", component.mpn));
    }
    if !component.footprint.is_empty() {
        lines.push(format!("  FP: {}", component.footprint));
    }

    if !component.pins.is_empty() {
        lines.push("  PINS:".to_string());
        let mut pins: Vec<_> = component.pins.iter().collect();
        pins.sort_by(|a, b| natural_cmp(&a.designator, &b.designator));
        for pin in pins {
            // Unnamed pins fall back to showing their net.
            if classify::is_semantic_name(&pin.name) {
                lines.push(format!("    {}: {}", pin.designator, pin.name));
            } else if !pin.net.is_empty() {
                lines.push(format!("    {}: {}", pin.designator, pin.net));
            } else {
                lines.push(format!("    {}:", pin.designator));
            }
        }
    }

    lines.join("\n")
}

/// One-line neighbor summary: refdes, derived type, value.
fn neighbor_summary(component: &Component) -> String {
    format!(
        "{} {} ({})",
        component.refdes,
        classify::derived_type(component),
        component.value
    )
}

fn net_block(net: &Net, pages: &BTreeSet<String>, components: &[&Component]) -> String {
    let mut lines = vec![format!("NET {}", net.name)];

    if pages.len() > MAX_ENUMERATED_PAGES {
        lines.push("  LINKS: ALL_PAGES".to_string());
    } else if pages.len() > 1 {
        let listed: Vec<&str> = pages.iter().map(String::as_str).collect();
        lines.push(format!("  LINKS: {}", listed.join(", ")));
    }

    let refs: Vec<String> = net
        .members
        .iter()
        .map(|member| pin_reference(&member.refdes, &member.pin, components))
        .collect();

    // Truncation is explicit: global nets list the first members in
    // encounter order and state the remainder count.
    let connection = if classify::is_global(net) && refs.len() > MAX_GLOBAL_CONNECTIONS {
        let others = refs.len() - MAX_GLOBAL_CONNECTIONS;
        format!(
            "{} (+ {} others)",
            refs[..MAX_GLOBAL_CONNECTIONS].join(", "),
            others
        )
    } else {
        refs.join(", ")
    };
    lines.push(format!("  CON: {connection}"));

    lines.join("\n")
}

/// "refdes.designator", or "refdes.designator(name)" when the pin has a
/// semantic name and the owning component is in view.
fn pin_reference(refdes: &str, designator: &str, components: &[&Component]) -> String {
    let pin = components
        .iter()
        .find(|c| c.refdes == refdes)
        .and_then(|c| c.pins.iter().find(|p| p.designator == designator));

    match pin {
        Some(pin) if classify::is_semantic_name(&pin.name) => {
            format!("{refdes}.{designator}({})", pin.name)
        }
        _ => format!("{refdes}.{designator}"),
    }
}

/// Natural-order comparison: alternating digit/non-digit runs with digit
/// runs compared numerically, so "R2" sorts before "R10".
pub fn natural_cmp(a: &str, b: &str) -> Ordering {
    let mut rest_a = a;
    let mut rest_b = b;
    loop {
        match (rest_a.is_empty(), rest_b.is_empty()) {
            (true, true) => return a.cmp(b),
            (true, false) => return Ordering::Less,
            (false, true) => return Ordering::Greater,
            (false, false) => {}
        }
        let (run_a, tail_a) = split_run(rest_a);
        let (run_b, tail_b) = split_run(rest_b);
        let digits_a = run_a.as_bytes()[0].is_ascii_digit();
        let digits_b = run_b.as_bytes()[0].is_ascii_digit();
        let ordering = match (digits_a, digits_b) {
            (true, true) => cmp_digit_runs(run_a, run_b),
            (false, false) => run_a.cmp(run_b),
            (true, false) => Ordering::Less,
            (false, true) => Ordering::Greater,
        };
        if ordering != Ordering::Equal {
            return ordering;
        }
        rest_a = tail_a;
        rest_b = tail_b;
    }
}

/// Split off the leading run of digits or non-digits. Runs break only at
/// ASCII digit boundaries, which are always char boundaries.
fn split_run(s: &str) -> (&str, &str) {
    let leading_digit = s.as_bytes()[0].is_ascii_digit();
    let end = s
        .bytes()
        .position(|b| b.is_ascii_digit() != leading_digit)
        .unwrap_or(s.len());
    s.split_at(end)
}

fn cmp_digit_runs(a: &str, b: &str) -> Ordering {
    let a = a.trim_start_matches('0');
    let b = b.trim_start_matches('0');
    a.len().cmp(&b.len()).then_with(|| a.cmp(b))
}
