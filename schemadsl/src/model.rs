//! Unified connectivity model.
//!
//! Tool-agnostic records for components, pins, and nets. These types carry
//! no behavior beyond construction helpers: classification is derived on
//! demand (`crate::classify`) and net membership is always rebuilt from
//! component pins (`crate::netlist`), so a loaded design snapshot can be
//! treated as immutable data.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

/// Sentinel net name for intentionally unconnected pins.
pub const NC_NET: &str = "NC";

/// A single pin on a component.
///
/// `name` is the semantic pin name ("VCC", "PA9_TX") and stays empty for
/// bare position markers. Designators are not unique within a component:
/// ganged pins (e.g. several "S" pads on a power FET) appear once per
/// physical pad.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pin {
    /// Pin number or identifier (e.g. "1", "G", "Shell").
    pub designator: String,
    /// Semantic pin name, empty when the pin has none.
    pub name: String,
    /// Net this pin connects to, empty for no-connects.
    pub net: String,
}

impl Pin {
    pub fn new(
        designator: impl Into<String>,
        name: impl Into<String>,
        net: impl Into<String>,
    ) -> Self {
        Self {
            designator: designator.into(),
            name: name.into(),
            net: net.into(),
        }
    }
}

/// An electronic component instance.
///
/// `refdes` is the unique key within a loaded design. The `properties` map
/// is open: adapters park any source metadata they do not map to a named
/// field there.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Component {
    /// Reference designator (e.g. "U1", "R5").
    pub refdes: String,
    /// Component value (e.g. "10k", "STM32F407VGT6").
    pub value: String,
    /// Manufacturer part number.
    pub mpn: String,
    /// PCB footprint name.
    pub footprint: String,
    /// Human-readable description.
    pub description: String,
    /// Page/sheet identifier this component appears on.
    pub page: String,
    /// Schematic coordinates, (0.0, 0.0) when unknown.
    pub location: (f64, f64),
    /// Additional source metadata.
    pub properties: BTreeMap<String, String>,
    /// Owned pins in source order.
    pub pins: Vec<Pin>,
}

impl Component {
    pub fn new(refdes: impl Into<String>) -> Self {
        Self {
            refdes: refdes.into(),
            value: String::new(),
            mpn: String::new(),
            footprint: String::new(),
            description: String::new(),
            page: String::new(),
            location: (0.0, 0.0),
            properties: BTreeMap::new(),
            pins: Vec::new(),
        }
    }

    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.value = value.into();
        self
    }

    pub fn with_mpn(mut self, mpn: impl Into<String>) -> Self {
        self.mpn = mpn.into();
        self
    }

    pub fn with_footprint(mut self, footprint: impl Into<String>) -> Self {
        self.footprint = footprint.into();
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_page(mut self, page: impl Into<String>) -> Self {
        self.page = page.into();
        self
    }

    pub fn with_location(mut self, x: f64, y: f64) -> Self {
        self.location = (x, y);
        self
    }

    pub fn add_pin(&mut self, pin: Pin) {
        self.pins.push(pin);
    }
}

/// One (refdes, pin designator) entry in a net's member list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetMember {
    pub refdes: String,
    pub pin: String,
}

impl NetMember {
    pub fn new(refdes: impl Into<String>, pin: impl Into<String>) -> Self {
        Self {
            refdes: refdes.into(),
            pin: pin.into(),
        }
    }
}

/// An electrical net.
///
/// Membership is derived data: the net builder recomputes it from component
/// pins, so `members` and `pages` are never authoritative input. The page
/// set is the union of the pages of all member components.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Net {
    pub name: String,
    /// Pages this net touches.
    pub pages: BTreeSet<String>,
    /// Member pins in encounter order.
    pub members: Vec<NetMember>,
}

impl Net {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            pages: BTreeSet::new(),
            members: Vec::new(),
        }
    }
}
