//! Query and navigation layer.
//!
//! The librarian orchestrates a provider, the net builder, and the emitter
//! behind three queries: index, page, and context. State management is
//! nuke-and-rebuild: a refresh constructs a brand-new immutable snapshot
//! and swaps the active `Arc` — readers holding the previous snapshot are
//! never disturbed, and nothing is ever mutated in place.

use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;

use crate::classify;
use crate::emitter;
use crate::graph::ConnectivityGraph;
use crate::model::{Component, Net};
use crate::provider::{DesignProvider, ProviderError};

#[derive(Debug, Error)]
pub enum QueryError {
    /// Index/page/context queries on a design with no pages at all.
    #[error("design contains no pages")]
    EmptyDesign,
    #[error(transparent)]
    Provider(#[from] ProviderError),
}

/// One immutable loaded design.
#[derive(Debug)]
pub struct Snapshot {
    pub components: Vec<Component>,
    pub nets: Vec<Net>,
    /// The atlas: net name → pages it touches, built once per load.
    pub net_page_map: BTreeMap<String, BTreeSet<String>>,
    graph: ConnectivityGraph,
    pub built_at: DateTime<Utc>,
}

impl Snapshot {
    fn build(components: Vec<Component>, nets: Vec<Net>) -> Self {
        let net_page_map = nets
            .iter()
            .map(|net| (net.name.clone(), net.pages.clone()))
            .collect();
        let graph = ConnectivityGraph::build(&components, &nets);
        Self {
            components,
            nets,
            net_page_map,
            graph,
            built_at: Utc::now(),
        }
    }

    /// Every page named by a component or touched by a net, sorted.
    pub fn pages(&self) -> BTreeSet<String> {
        let mut pages: BTreeSet<String> = self
            .components
            .iter()
            .map(|c| c.page.clone())
            .filter(|p| !p.is_empty())
            .collect();
        for net in &self.nets {
            pages.extend(net.pages.iter().filter(|p| !p.is_empty()).cloned());
        }
        pages
    }

    pub fn component(&self, refdes: &str) -> Option<&Component> {
        self.components.iter().find(|c| c.refdes == refdes)
    }

    pub fn net(&self, name: &str) -> Option<&Net> {
        self.nets.iter().find(|n| n.name == name)
    }
}

/// Basic design counts, serializable for machine consumption.
#[derive(Debug, Clone, Serialize)]
pub struct DesignStats {
    pub components: usize,
    pub nets: usize,
    pub pages: usize,
    pub inter_page_nets: usize,
    pub global_nets: usize,
}

/// Central state manager and navigation layer.
pub struct Librarian<P: DesignProvider> {
    provider: P,
    snapshot: Option<Arc<Snapshot>>,
    dirty: bool,
}

impl<P: DesignProvider> Librarian<P> {
    pub fn new(provider: P) -> Self {
        Self {
            provider,
            snapshot: None,
            dirty: true,
        }
    }

    /// Rebuild the snapshot if marked dirty; a no-op otherwise.
    pub fn refresh(&mut self) -> Result<(), ProviderError> {
        if !self.dirty && self.snapshot.is_some() {
            return Ok(());
        }

        self.provider.fetch()?;
        let components = self.provider.get_components()?.to_vec();
        let nets = self.provider.get_nets()?.to_vec();
        let snapshot = Snapshot::build(components, nets);
        tracing::info!(
            components = snapshot.components.len(),
            nets = snapshot.nets.len(),
            built_at = %snapshot.built_at,
            "design snapshot built"
        );
        self.snapshot = Some(Arc::new(snapshot));
        self.dirty = false;
        Ok(())
    }

    /// Force the next query to rebuild from the provider.
    pub fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    /// Refresh and hand out the active snapshot; callers may hold it across
    /// reloads.
    pub fn snapshot(&mut self) -> Result<Arc<Snapshot>, ProviderError> {
        self.refresh()?;
        // refresh() guarantees a snapshot on success.
        self.snapshot.clone().ok_or(ProviderError::NotReady)
    }

    /// High-level overview: per-page counts and inter-page signals.
    pub fn get_index(&mut self) -> Result<String, QueryError> {
        let snapshot = self.snapshot()?;
        let pages = snapshot.pages();
        if pages.is_empty() {
            return Err(QueryError::EmptyDesign);
        }

        let mut component_counts: BTreeMap<&str, usize> = BTreeMap::new();
        for component in &snapshot.components {
            *component_counts.entry(component.page.as_str()).or_default() += 1;
        }
        let mut net_counts: BTreeMap<&str, usize> = BTreeMap::new();
        for net in &snapshot.nets {
            for page in &net.pages {
                *net_counts.entry(page.as_str()).or_default() += 1;
            }
        }

        let mut lines = vec!["# SCHEMATIC INDEX".to_string(), String::new()];
        lines.push("## Pages".to_string());
        for page in &pages {
            let components = component_counts.get(page.as_str()).copied().unwrap_or(0);
            let nets = net_counts.get(page.as_str()).copied().unwrap_or(0);
            lines.push(format!("- {page} ({components} components, {nets} nets)"));
        }

        lines.push(String::new());
        lines.push("## Inter-Page Signals".to_string());
        let mut inter_page: Vec<&Net> = snapshot
            .nets
            .iter()
            .filter(|net| classify::is_inter_page(net))
            .collect();
        if inter_page.is_empty() {
            lines.push("(No inter-page signals)".to_string());
        } else {
            inter_page.sort_by(|a, b| a.name.cmp(&b.name));
            for net in inter_page {
                if net.pages.len() > 3 {
                    let upper = net.name.to_ascii_uppercase();
                    let kind = if upper.contains("GND") || upper.contains("VSS") {
                        "Ground"
                    } else {
                        "Power Rail"
                    };
                    lines.push(format!("- {}: ALL_PAGES ({kind})", net.name));
                } else {
                    let spanned: Vec<&str> = net.pages.iter().map(String::as_str).collect();
                    lines.push(format!("- {}: {}", net.name, spanned.join(" ↔ ")));
                }
            }
        }

        Ok(lines.join("\n"))
    }

    /// Render one page: its components, and every net touching it per the
    /// atlas.
    pub fn get_page(&mut self, page_name: &str) -> Result<String, QueryError> {
        let snapshot = self.snapshot()?;
        if snapshot.pages().is_empty() {
            return Err(QueryError::EmptyDesign);
        }

        let page_components: Vec<&Component> = snapshot
            .components
            .iter()
            .filter(|c| c.page == page_name)
            .collect();
        let page_known = !page_components.is_empty()
            || snapshot
                .net_page_map
                .values()
                .any(|pages| pages.contains(page_name));
        if !page_known {
            return Ok(format!("# PAGE: {page_name}\n\n(Page not found in design)\n"));
        }

        let page_nets: Vec<&Net> = snapshot
            .nets
            .iter()
            .filter(|net| {
                snapshot
                    .net_page_map
                    .get(&net.name)
                    .is_some_and(|pages| pages.contains(page_name))
            })
            .collect();

        Ok(emitter::emit_page(
            page_name,
            &page_components,
            &page_nets,
            &snapshot.net_page_map,
        ))
    }

    /// 1-hop context bubble around the requested components.
    ///
    /// Unmatched refdes entries warn and are skipped; neighbors are every
    /// other component reachable through one net, deduplicated by refdes.
    pub fn get_context(&mut self, refdes_list: &[&str]) -> Result<String, QueryError> {
        let snapshot = self.snapshot()?;
        if snapshot.pages().is_empty() {
            return Err(QueryError::EmptyDesign);
        }

        let requested: HashSet<&str> = refdes_list.iter().copied().collect();
        let primary: Vec<&Component> = snapshot
            .components
            .iter()
            .filter(|c| requested.contains(c.refdes.as_str()))
            .collect();

        let found: HashSet<&str> = primary.iter().map(|c| c.refdes.as_str()).collect();
        for missing in requested.difference(&found) {
            tracing::warn!(refdes = %missing, "requested component not in design, skipping");
        }
        if primary.is_empty() {
            return Ok(format!(
                "# CONTEXT: {}\n\n(No matching components in design)\n",
                refdes_list.join(", ")
            ));
        }

        // Context nets: every net with at least one primary member.
        let mut net_indices: Vec<usize> = Vec::new();
        for component in &primary {
            for idx in snapshot.graph.nets_for_component(&component.refdes) {
                if !net_indices.contains(&idx) {
                    net_indices.push(idx);
                }
            }
        }
        let nets: Vec<&Net> = net_indices.iter().map(|&idx| &snapshot.nets[idx]).collect();

        // Neighbors: everything else those nets reach, one hop out.
        let mut neighbor_indices: Vec<usize> = Vec::new();
        for net in &nets {
            for idx in snapshot.graph.components_on_net(&net.name) {
                let refdes = snapshot.components[idx].refdes.as_str();
                if !found.contains(refdes) && !neighbor_indices.contains(&idx) {
                    neighbor_indices.push(idx);
                }
            }
        }
        let neighbors: Vec<&Component> = neighbor_indices
            .iter()
            .map(|&idx| &snapshot.components[idx])
            .collect();

        Ok(emitter::emit_context(&primary, &neighbors, &nets))
    }

    /// All page names, sorted.
    pub fn get_all_pages(&mut self) -> Result<Vec<String>, ProviderError> {
        Ok(self.snapshot()?.pages().into_iter().collect())
    }

    pub fn get_stats(&mut self) -> Result<DesignStats, ProviderError> {
        let snapshot = self.snapshot()?;
        Ok(DesignStats {
            components: snapshot.components.len(),
            nets: snapshot.nets.len(),
            pages: snapshot.pages().len(),
            inter_page_nets: snapshot
                .nets
                .iter()
                .filter(|n| classify::is_inter_page(n))
                .count(),
            global_nets: snapshot.nets.iter().filter(|n| classify::is_global(n)).count(),
        })
    }
}
