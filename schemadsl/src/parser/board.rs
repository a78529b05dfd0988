//! Board netlist ingestion (Format B).
//!
//! Projects a `.kicad_pcb`-style nested-list document into pad-to-net
//! connectivity: the net-id table, then every footprint's pads with their
//! resolved net names. Layout geometry is ignored.

use std::collections::BTreeMap;

use crate::parser::sexp::{SExp, SExpParser};
use crate::parser::{expect_root, ProjectionError};

/// One pad with its resolved net name (empty for no-connects).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PadNet {
    pub designator: String,
    pub net: String,
}

/// A footprint's reference and its pads in document order.
///
/// Duplicate pad designators are preserved individually: ganged pads (e.g.
/// a PowerPAK source) stay one entry per physical pad.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FootprintPads {
    pub refdes: String,
    pub pads: Vec<PadNet>,
}

/// The connectivity extracted from a board file.
#[derive(Debug, Default)]
pub struct BoardNetlist {
    pub net_names: BTreeMap<u32, String>,
    pub footprints: Vec<FootprintPads>,
}

impl BoardNetlist {
    pub fn parse(content: &str) -> Result<Self, ProjectionError> {
        let root = SExpParser::parse_complete(content)?;
        let items = expect_root(&root, "kicad_pcb")?;

        let mut netlist = BoardNetlist::default();

        // Net definitions first: pads may reference nets by id alone.
        for item in items {
            if item.tag() == Some("net") {
                let fields = item.as_list().unwrap_or(&[]);
                let Some(id) = fields.get(1).and_then(SExp::as_atom).and_then(|s| s.parse().ok())
                else {
                    continue;
                };
                let name = fields.get(2).and_then(SExp::as_atom).unwrap_or("");
                netlist.net_names.insert(id, name.to_string());
            }
        }

        for item in items {
            let tag = item.tag();
            if tag != Some("footprint") && tag != Some("module") {
                continue;
            }
            let Some(refdes) = footprint_reference(item) else {
                tracing::debug!("footprint without a reference property, skipping");
                continue;
            };

            let mut pads = Vec::new();
            for pad in item.get_all("pad") {
                let fields = pad.as_list().unwrap_or(&[]);
                let designator = fields.get(1).and_then(SExp::as_atom).unwrap_or("");
                // Unnumbered mechanical pads carry no connectivity.
                if designator.is_empty() {
                    continue;
                }
                pads.push(PadNet {
                    designator: designator.to_string(),
                    net: pad_net(pad, &netlist.net_names),
                });
            }

            netlist.footprints.push(FootprintPads {
                refdes: refdes.to_string(),
                pads,
            });
        }

        Ok(netlist)
    }
}

/// The footprint's reference: a `(property "Reference" …)` entry, falling
/// back to the older `(fp_text reference …)` form.
fn footprint_reference(footprint: &SExp) -> Option<&str> {
    for prop in footprint.get_all("property") {
        let fields = prop.as_list().unwrap_or(&[]);
        if fields.get(1).and_then(SExp::as_atom) == Some("Reference") {
            return fields.get(2).and_then(SExp::as_atom);
        }
    }
    for text in footprint.get_all("fp_text") {
        let fields = text.as_list().unwrap_or(&[]);
        if fields.get(1).and_then(SExp::as_atom) == Some("reference") {
            return fields.get(2).and_then(SExp::as_atom);
        }
    }
    None
}

/// Resolve a pad's net name: the embedded name wins, then the id table.
/// A pad with no net reference is a no-connect (empty name).
fn pad_net(pad: &SExp, net_names: &BTreeMap<u32, String>) -> String {
    let Some(net) = pad.get_all("net").into_iter().next() else {
        return String::new();
    };
    let fields = net.as_list().unwrap_or(&[]);
    if let Some(name) = fields.get(2).and_then(SExp::as_atom) {
        return name.to_string();
    }
    fields
        .get(1)
        .and_then(SExp::as_atom)
        .and_then(|s| s.parse::<u32>().ok())
        .and_then(|id| net_names.get(&id).cloned())
        .unwrap_or_default()
}
