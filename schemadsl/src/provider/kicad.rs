//! Text-format providers: schematic metadata and board connectivity.

use std::path::PathBuf;

use crate::model::{Component, Net, Pin};
use crate::netlist::NetlistBuilder;
use crate::parser::board::BoardNetlist;
use crate::parser::schematic::SchematicSheet;
use crate::provider::{DesignProvider, Fetched, ProviderError};

/// Page components come from the board side of a merge when the schematic
/// never mentioned them.
pub(crate) const UNKNOWN_PAGE: &str = "unknown";

enum SheetSource {
    File(PathBuf),
    Memory { page: String, content: String },
}

/// Format A provider: one component per schematic symbol, metadata only.
///
/// Sheets carry no pad-to-net associations, so components come out without
/// pins and `get_nets` is empty. Connectivity is the board provider's job.
pub struct SchematicMetadataProvider {
    sources: Vec<SheetSource>,
    labels: Vec<String>,
    state: Option<Fetched>,
}

impl SchematicMetadataProvider {
    /// Provider over `.kicad_sch` files; each file is one page named after
    /// its file stem.
    pub fn from_files(paths: Vec<PathBuf>) -> Self {
        Self {
            sources: paths.into_iter().map(SheetSource::File).collect(),
            labels: Vec::new(),
            state: None,
        }
    }

    /// Provider over in-memory `(page, content)` sheets.
    pub fn from_sources(sheets: Vec<(String, String)>) -> Self {
        Self {
            sources: sheets
                .into_iter()
                .map(|(page, content)| SheetSource::Memory { page, content })
                .collect(),
            labels: Vec::new(),
            state: None,
        }
    }

    /// Label texts collected across all parsed sheets.
    pub fn labels(&self) -> &[String] {
        &self.labels
    }
}

impl DesignProvider for SchematicMetadataProvider {
    fn fetch(&mut self) -> Result<(), ProviderError> {
        if self.state.is_some() {
            return Ok(());
        }
        if self.sources.is_empty() {
            return Err(ProviderError::Ingestion(
                "no schematic sheets to ingest".to_string(),
            ));
        }

        let mut components: Vec<Component> = Vec::new();
        let mut labels = Vec::new();
        let mut first_error: Option<ProviderError> = None;
        let mut parsed = 0usize;

        for source in &self.sources {
            let (page, content) = match source {
                SheetSource::File(path) => {
                    let page = path
                        .file_stem()
                        .and_then(|s| s.to_str())
                        .unwrap_or("unnamed")
                        .to_string();
                    match std::fs::read_to_string(path) {
                        Ok(content) => (page, content),
                        Err(err) => {
                            tracing::warn!(path = %path.display(), %err, "failed to read sheet");
                            if first_error.is_none() {
                                first_error = Some(err.into());
                            }
                            continue;
                        }
                    }
                }
                SheetSource::Memory { page, content } => (page.clone(), content.clone()),
            };

            match SchematicSheet::parse(&content, &page) {
                Ok(sheet) => {
                    parsed += 1;
                    labels.extend(sheet.labels);
                    for component in sheet.components {
                        // Refdes is unique per design, not per sheet.
                        if components.iter().any(|c| c.refdes == component.refdes) {
                            tracing::warn!(
                                refdes = %component.refdes,
                                %page,
                                "duplicate reference across sheets, keeping first"
                            );
                        } else {
                            components.push(component);
                        }
                    }
                }
                Err(err) => {
                    tracing::warn!(%page, %err, "failed to parse sheet");
                    if first_error.is_none() {
                        first_error = Some(err.into());
                    }
                }
            }
        }

        if parsed == 0 {
            // Every sheet failed: this source cannot be loaded.
            return Err(first_error
                .unwrap_or_else(|| ProviderError::Ingestion("no sheets parsed".to_string())));
        }

        let nets = NetlistBuilder::build(&components);
        tracing::info!(
            sheets = parsed,
            components = components.len(),
            "schematic metadata ingested"
        );
        self.labels = labels;
        self.state = Some(Fetched { components, nets });
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

enum BoardSource {
    File(PathBuf),
    Memory(String),
}

/// Format B provider: full pad-to-net connectivity, no rich metadata.
///
/// The board has no notion of schematic pages; components land on the
/// `"unknown"` page until a merge assigns the real one.
pub struct BoardNetlistProvider {
    source: BoardSource,
    state: Option<Fetched>,
}

impl BoardNetlistProvider {
    pub fn from_file(path: PathBuf) -> Self {
        Self {
            source: BoardSource::File(path),
            state: None,
        }
    }

    pub fn from_source(content: String) -> Self {
        Self {
            source: BoardSource::Memory(content),
            state: None,
        }
    }
}

impl DesignProvider for BoardNetlistProvider {
    fn fetch(&mut self) -> Result<(), ProviderError> {
        if self.state.is_some() {
            return Ok(());
        }

        let content = match &self.source {
            BoardSource::File(path) => std::fs::read_to_string(path)?,
            BoardSource::Memory(content) => content.clone(),
        };
        let netlist = BoardNetlist::parse(&content)?;

        let mut components = Vec::new();
        for footprint in netlist.footprints {
            let mut component = Component::new(footprint.refdes).with_page(UNKNOWN_PAGE);
            for pad in footprint.pads {
                component.add_pin(Pin::new(pad.designator, "", pad.net));
            }
            components.push(component);
        }

        let nets = NetlistBuilder::build(&components);
        tracing::info!(
            footprints = components.len(),
            nets = nets.len(),
            "board connectivity ingested"
        );
        self.state = Some(Fetched { components, nets });
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
