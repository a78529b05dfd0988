//! SchemaDSL - unified schematic connectivity model and compact DSL emitter
//!
//! This library ingests heterogeneous electronic-design exports (KiCad-style
//! schematic and board text, or a pre-merged JSON document), normalizes them
//! into one Component/Pin/Net model, and renders compact INDEX / PAGE /
//! CONTEXT text sized for automated agents with limited context budgets.
//!
//! # Quick Start
//!
//! ```no_run
//! use schemadsl::{JsonDesignProvider, Librarian};
//! use std::path::PathBuf;
//!
//! let provider = JsonDesignProvider::from_file(PathBuf::from("design.json"));
//! let mut librarian = Librarian::new(provider);
//!
//! println!("{}", librarian.get_index().unwrap());
//! println!("{}", librarian.get_context(&["U1", "R5"]).unwrap());
//! ```
//!
//! # Features
//!
//! - **Format adapters**: schematic metadata, board connectivity, merged
//!   designs, single-file JSON
//! - **Derived connectivity**: nets are always rebuilt from component pins
//! - **Compact emission**: net-centric output with complex-component blocks
//!   and explicit truncation of global nets
//! - **1-hop context**: graph traversal around a requested component set

pub mod classify;
pub mod emitter;
pub mod graph;
pub mod librarian;
pub mod model;
pub mod netlist;
pub mod parser;
pub mod provider;
pub mod source;

// Re-export main types
pub use classify::ComponentType;
pub use librarian::{DesignStats, Librarian, QueryError, Snapshot};
pub use model::{Component, Net, NetMember, Pin, NC_NET};
pub use netlist::NetlistBuilder;
pub use provider::{
    BoardNetlistProvider, DesignProvider, JsonDesignProvider, MergedProvider, ProviderError,
    ReferenceMismatch, SchematicMetadataProvider,
};
pub use source::{locate_design_files, DesignFiles};

use std::path::Path;

/// Build the standard provider stack for a project directory: schematic
/// metadata merged with board connectivity when a board file exists,
/// schematic metadata alone otherwise.
pub fn open_project(dir: &Path) -> Result<Box<dyn DesignProvider + Send>, ProviderError> {
    let files = locate_design_files(dir)?;
    if files.schematics.is_empty() && files.board.is_none() {
        return Err(ProviderError::Ingestion(format!(
            "no design files found under {}",
            dir.display()
        )));
    }

    let provider: Box<dyn DesignProvider + Send> = match files.board {
        Some(board) if files.schematics.is_empty() => {
            Box::new(BoardNetlistProvider::from_file(board))
        }
        Some(board) => Box::new(MergedProvider::new(
            SchematicMetadataProvider::from_files(files.schematics),
            BoardNetlistProvider::from_file(board),
        )),
        None => Box::new(SchematicMetadataProvider::from_files(files.schematics)),
    };
    Ok(provider)
}

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::{
        Component, DesignProvider, DesignStats, JsonDesignProvider, Librarian, Net, Pin,
        ProviderError, QueryError,
    };
}
