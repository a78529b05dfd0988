//! Merging provider: schematic metadata joined with board connectivity.

use std::collections::{HashMap, HashSet};

use crate::model::{Component, Net};
use crate::netlist::NetlistBuilder;
use crate::provider::{
    DesignProvider, Fetched, ProviderError, ReferenceMismatch, SourceSide,
};

/// Joins a metadata provider with a connectivity provider by refdes.
///
/// The two inner sources are disjoint read-only files, so their fetches run
/// on scoped threads. One source failing to parse degrades to partial data
/// plus a warning; only both failing is fatal. A refdes present in a single
/// source produces a [`ReferenceMismatch`] record and a partial component.
pub struct MergedProvider<M, C> {
    metadata: M,
    connectivity: C,
    warnings: Vec<ReferenceMismatch>,
    state: Option<Fetched>,
}

impl<M, C> MergedProvider<M, C>
where
    M: DesignProvider + Send,
    C: DesignProvider + Send,
{
    pub fn new(metadata: M, connectivity: C) -> Self {
        Self {
            metadata,
            connectivity,
            warnings: Vec::new(),
            state: None,
        }
    }

    /// Mismatch records collected by the last `fetch`.
    pub fn warnings(&self) -> &[ReferenceMismatch] {
        &self.warnings
    }
}

impl<M, C> DesignProvider for MergedProvider<M, C>
where
    M: DesignProvider + Send,
    C: DesignProvider + Send,
{
    fn fetch(&mut self) -> Result<(), ProviderError> {
        if self.state.is_some() {
            return Ok(());
        }

        let (meta_result, conn_result) = {
            let (metadata, connectivity) = (&mut self.metadata, &mut self.connectivity);
            std::thread::scope(|scope| {
                let meta = scope.spawn(move || metadata.fetch());
                let conn = scope.spawn(move || connectivity.fetch());
                (join(meta), join(conn))
            })
        };

        let meta_ok = match meta_result {
            Ok(()) => true,
            Err(err) => {
                tracing::warn!(%err, "metadata source failed, continuing with connectivity only");
                false
            }
        };
        let conn_ok = match conn_result {
            Ok(()) => true,
            Err(err) => {
                tracing::warn!(%err, "connectivity source failed, continuing with metadata only");
                false
            }
        };
        if !meta_ok && !conn_ok {
            return Err(ProviderError::Ingestion(
                "both merged sources failed to load".to_string(),
            ));
        }

        let meta_components: &[Component] = if meta_ok {
            self.metadata.get_components()?
        } else {
            &[]
        };
        let conn_components: &[Component] = if conn_ok {
            self.connectivity.get_components()?
        } else {
            &[]
        };

        let by_refdes: HashMap<&str, &Component> = conn_components
            .iter()
            .map(|c| (c.refdes.as_str(), c))
            .collect();

        let mut warnings = Vec::new();
        let mut merged: Vec<Component> = Vec::new();
        let mut joined: HashSet<&str> = HashSet::new();

        for meta in meta_components {
            let mut component = meta.clone();
            match by_refdes.get(meta.refdes.as_str()) {
                Some(conn) => {
                    component.pins = conn.pins.clone();
                    joined.insert(meta.refdes.as_str());
                }
                None if conn_ok => warnings.push(ReferenceMismatch {
                    refdes: meta.refdes.clone(),
                    side: SourceSide::MetadataOnly,
                }),
                None => {}
            }
            merged.push(component);
        }

        for conn in conn_components {
            if joined.contains(conn.refdes.as_str()) {
                continue;
            }
            if meta_ok {
                warnings.push(ReferenceMismatch {
                    refdes: conn.refdes.clone(),
                    side: SourceSide::ConnectivityOnly,
                });
            }
            merged.push(conn.clone());
        }

        for warning in &warnings {
            tracing::warn!("reference mismatch: {warning}");
        }

        let nets = NetlistBuilder::build(&merged);
        tracing::info!(
            components = merged.len(),
            nets = nets.len(),
            mismatches = warnings.len(),
            "merged design built"
        );
        self.warnings = warnings;
        self.state = Some(Fetched {
            components: merged,
            nets,
        });
        Ok(())
    }

    fn get_components(&self) -> Result<&[Component], ProviderError> {
        self.state
            .as_ref()
            .map(|s| s.components.as_slice())
            .ok_or(ProviderError::NotReady)
    }

    fn get_nets(&self) -> Result<&[Net], ProviderError> {
        self.state
            .as_ref()
            .map(|s| s.nets.as_slice())
            .ok_or(ProviderError::NotReady)
    }
}

fn join<T>(handle: std::thread::ScopedJoinHandle<'_, T>) -> T {
    handle
        .join()
        .unwrap_or_else(|panic| std::panic::resume_unwind(panic))
}
