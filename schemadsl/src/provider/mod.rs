//! Provider abstraction over the source formats.
//!
//! Every ingestor implements the same three-operation contract so the
//! librarian stays format-agnostic. Composition is itself an implementer:
//! `MergedProvider` joins a metadata source with a connectivity source.

pub mod json;
pub mod kicad;
pub mod merge;

use std::fmt;

use thiserror::Error;

use crate::model::{Component, Net};
use crate::parser::sexp::ParseError;
use crate::parser::ProjectionError;

pub use json::JsonDesignProvider;
pub use kicad::{BoardNetlistProvider, SchematicMetadataProvider};
pub use merge::MergedProvider;

/// Errors surfaced by providers.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// Malformed top-level structure; the source cannot be loaded at all.
    #[error("malformed source: {0}")]
    Ingestion(String),
    /// Structural syntax error in a text source, with its byte offset.
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    /// Programmer error: `get_components`/`get_nets` before `fetch`.
    #[error("provider queried before fetch()")]
    NotReady,
}

impl From<ProjectionError> for ProviderError {
    fn from(err: ProjectionError) -> Self {
        match err {
            ProjectionError::Parse(parse) => ProviderError::Parse(parse),
            other => ProviderError::Ingestion(other.to_string()),
        }
    }
}

/// Which merged source a mismatched refdes was found in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceSide {
    MetadataOnly,
    ConnectivityOnly,
}

/// Non-fatal merge warning: a refdes present in only one of the merged
/// sources. The component is still emitted with whatever data exists.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReferenceMismatch {
    pub refdes: String,
    pub side: SourceSide,
}

impl fmt::Display for ReferenceMismatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.side {
            SourceSide::MetadataOnly => {
                write!(f, "{}: present in schematic only, no connectivity", self.refdes)
            }
            SourceSide::ConnectivityOnly => {
                write!(f, "{}: present on board only, no schematic metadata", self.refdes)
            }
        }
    }
}

/// The contract every ingestor implements.
pub trait DesignProvider {
    /// Parse and cache the source. Idempotent: the first call does the
    /// work, later calls are no-ops. Fails with
    /// [`ProviderError::Ingestion`] on malformed top-level structure.
    fn fetch(&mut self) -> Result<(), ProviderError>;

    /// Components in source order. [`ProviderError::NotReady`] before
    /// `fetch`.
    fn get_components(&self) -> Result<&[Component], ProviderError>;

    /// Derived nets, ascending by name. [`ProviderError::NotReady`] before
    /// `fetch`.
    fn get_nets(&self) -> Result<&[Net], ProviderError>;
}

impl<P: DesignProvider + ?Sized> DesignProvider for Box<P> {
    fn fetch(&mut self) -> Result<(), ProviderError> {
        (**self).fetch()
    }

    fn get_components(&self) -> Result<&[Component], ProviderError> {
        (**self).get_components()
    }

    fn get_nets(&self) -> Result<&[Net], ProviderError> {
        (**self).get_nets()
    }
}

/// Cached results shared by the provider implementations.
#[derive(Debug, Default)]
pub(crate) struct Fetched {
    pub components: Vec<Component>,
    pub nets: Vec<Net>,
}
