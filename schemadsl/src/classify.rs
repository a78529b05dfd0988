//! Derived classification.
//!
//! Pure functions over the immutable model. Nothing here is ever cached on
//! the records themselves, so a reload can never observe stale categories.

use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::model::{Component, Net};

/// Component category derived from the refdes prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ComponentType {
    Res,
    Cap,
    Ind,
    Fuse,
    Diode,
    Transistor,
    Ic,
    Conn,
    Switch,
    Osc,
    Other,
}

impl ComponentType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ComponentType::Res => "RES",
            ComponentType::Cap => "CAP",
            ComponentType::Ind => "IND",
            ComponentType::Fuse => "FUSE",
            ComponentType::Diode => "DIODE",
            ComponentType::Transistor => "TRANSISTOR",
            ComponentType::Ic => "IC",
            ComponentType::Conn => "CONN",
            ComponentType::Switch => "SWITCH",
            ComponentType::Osc => "OSC",
            ComponentType::Other => "OTHER",
        }
    }
}

impl fmt::Display for ComponentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

const PREFIX_TABLE: &[(&str, ComponentType)] = &[
    ("R", ComponentType::Res),
    ("C", ComponentType::Cap),
    ("L", ComponentType::Ind),
    ("FB", ComponentType::Ind),
    ("F", ComponentType::Fuse),
    ("D", ComponentType::Diode),
    ("LED", ComponentType::Diode),
    ("Q", ComponentType::Transistor),
    ("U", ComponentType::Ic),
    ("J", ComponentType::Conn),
    ("P", ComponentType::Conn),
    ("CN", ComponentType::Conn),
    ("CONN", ComponentType::Conn),
    ("SW", ComponentType::Switch),
    ("BTN", ComponentType::Switch),
    ("X", ComponentType::Osc),
    ("Y", ComponentType::Osc),
];

/// Map a refdes prefix to its component category.
///
/// Longest-prefix match over the uppercased refdes ("CONN3" is CONN, not
/// CAP). Total: anything unmatched is OTHER.
pub fn derived_type(component: &Component) -> ComponentType {
    let refdes = component.refdes.to_ascii_uppercase();
    let mut best: Option<(&str, ComponentType)> = None;
    for &(prefix, ty) in PREFIX_TABLE {
        if refdes.starts_with(prefix)
            && best.map_or(true, |(b, _)| prefix.len() > b.len())
        {
            best = Some((prefix, ty));
        }
    }
    best.map_or(ComponentType::Other, |(_, ty)| ty)
}

/// Pin names that are bare position markers rather than meaning.
///
/// The reserved set is exactly {"1","2","3","4","A","K"} plus the empty
/// name; other pure numerals ("5", "22") count as semantic. The asymmetry
/// matches observed tool output and is kept literally.
const RESERVED_PIN_NAMES: &[&str] = &["1", "2", "3", "4", "A", "K"];

pub fn is_semantic_name(name: &str) -> bool {
    !name.is_empty() && !RESERVED_PIN_NAMES.contains(&name)
}

/// A component needs a full block when it has more than 4 pins or any pin
/// carries a semantic name; everything else surfaces inline in net lines.
pub fn is_complex(component: &Component) -> bool {
    component.pins.len() > 4
        || component.pins.iter().any(|pin| is_semantic_name(&pin.name))
}

// Power and ground rails: GND/VSS/VCC/VDD/VEE/VBAT with an optional "P"
// prefix and optional "_" suffix, voltage literals (3V3, +5V, 12V, 3.3V),
// and names ending in _GND/_VCC/_VDD.
static POWER_NET: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)^(?:p?(?:gnd|vss|vcc|vdd|vee|vbat)(?:_.*)?$|\+?\d+(?:\.\d+)?v\d*$|.*_(?:gnd|vcc|vdd)$)",
    )
    .expect("power net pattern")
});

/// A net is global when it looks like a power/ground rail, or is simply too
/// big to enumerate: more than 15 members or more than 3 pages.
pub fn is_global(net: &Net) -> bool {
    POWER_NET.is_match(&net.name) || net.members.len() > 15 || net.pages.len() > 3
}

/// A net whose members span more than one page.
pub fn is_inter_page(net: &Net) -> bool {
    net.pages.len() > 1
}
