//! Source-format parsing.
//!
//! One generic nested-list parser (`sexp`) feeds two projections: schematic
//! sheets (component metadata) and board netlists (pad-to-net connectivity).

pub mod board;
pub mod schematic;
pub mod sexp;

use thiserror::Error;

pub use board::{BoardNetlist, FootprintPads, PadNet};
pub use schematic::SchematicSheet;
pub use sexp::{ParseError, SExp, SExpParser};

/// Failure while projecting a source document into domain records.
#[derive(Debug, Error)]
pub enum ProjectionError {
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error("not a {expected} document: top-level form is {found:?}")]
    WrongRoot {
        expected: &'static str,
        found: Option<String>,
    },
}

/// Require the root form to be a list tagged `expected`.
fn expect_root<'a>(root: &'a SExp, expected: &'static str) -> Result<&'a [SExp], ProjectionError> {
    let found = root.tag();
    if found == Some(expected) {
        Ok(root.as_list().unwrap_or(&[]))
    } else {
        Err(ProjectionError::WrongRoot {
            expected,
            found: found.map(str::to_string),
        })
    }
}
