//! Net derivation.
//!
//! Net membership is never ingested: providers hand over components with
//! per-pin net names and the builder derives the authoritative net set
//! from them in a single pass. Rebuilding from the same component set
//! yields identical nets in identical order.

use std::collections::BTreeMap;

use crate::model::{Component, Net, NetMember, NC_NET};

/// Derives the net set from component pins.
pub struct NetlistBuilder;

impl NetlistBuilder {
    /// Build nets from every (component, pin) pair.
    ///
    /// An empty pin net name resolves to the NC sentinel. Members keep
    /// encounter order; pins sharing a net name on one component stay
    /// distinct members (ganged pins are physical multiplicity). Output is
    /// ascending by net name in codepoint order.
    pub fn build(components: &[Component]) -> Vec<Net> {
        let mut nets: BTreeMap<String, Net> = BTreeMap::new();

        for component in components {
            for pin in &component.pins {
                let name = if pin.net.is_empty() { NC_NET } else { pin.net.as_str() };
                let net = nets
                    .entry(name.to_string())
                    .or_insert_with(|| Net::new(name));
                net.members
                    .push(NetMember::new(&component.refdes, &pin.designator));
                net.pages.insert(component.page.clone());
            }
        }

        nets.into_values().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Pin;

    fn component(refdes: &str, page: &str, pins: &[(&str, &str)]) -> Component {
        let mut c = Component::new(refdes).with_page(page);
        for (designator, net) in pins {
            c.add_pin(Pin::new(*designator, "", *net));
        }
        c
    }

    #[test]
    fn test_members_in_encounter_order() {
        let components = vec![
            component("R1", "Main", &[("1", "A"), ("2", "B")]),
            component("R2", "Main", &[("1", "A")]),
        ];
        let nets = NetlistBuilder::build(&components);

        let a = nets.iter().find(|n| n.name == "A").unwrap();
        assert_eq!(a.members, vec![NetMember::new("R1", "1"), NetMember::new("R2", "1")]);
    }

    #[test]
    fn test_output_sorted_by_name() {
        let components = vec![component("R1", "Main", &[("1", "ZZZ"), ("2", "AAA")])];
        let nets = NetlistBuilder::build(&components);
        let names: Vec<&str> = nets.iter().map(|n| n.name.as_str()).collect();
        assert_eq!(names, vec!["AAA", "ZZZ"]);
    }

    #[test]
    fn test_empty_net_name_becomes_nc() {
        let components = vec![component("U1", "Main", &[("3", "")])];
        let nets = NetlistBuilder::build(&components);
        assert_eq!(nets.len(), 1);
        assert_eq!(nets[0].name, NC_NET);
    }

    #[test]
    fn test_ganged_pins_are_not_deduplicated() {
        let components = vec![component(
            "Q1",
            "Power",
            &[("S", "VOUT"), ("S", "VOUT"), ("S", "VOUT"), ("G", "GATE"), ("D", "VIN")],
        )];
        let nets = NetlistBuilder::build(&components);

        let vout = nets.iter().find(|n| n.name == "VOUT").unwrap();
        assert_eq!(vout.members.len(), 3);
    }

    #[test]
    fn test_pages_are_union_of_member_pages() {
        let components = vec![
            component("R1", "Main", &[("1", "GND")]),
            component("R2", "Power", &[("1", "GND")]),
        ];
        let nets = NetlistBuilder::build(&components);
        let gnd = &nets[0];
        assert!(gnd.pages.contains("Main") && gnd.pages.contains("Power"));
    }

    #[test]
    fn test_no_pin_lost_or_duplicated() {
        let components = vec![
            component("U1", "Main", &[("1", "A"), ("2", "B"), ("3", "")]),
            component("R1", "IO", &[("1", "A"), ("2", "A")]),
        ];
        let total_pins: usize = components.iter().map(|c| c.pins.len()).sum();
        let nets = NetlistBuilder::build(&components);
        let total_members: usize = nets.iter().map(|n| n.members.len()).sum();
        assert_eq!(total_members, total_pins);
    }

    #[test]
    fn test_rebuild_is_identical() {
        let components = vec![
            component("U1", "Main", &[("1", "VCC"), ("2", "GND")]),
            component("C1", "Main", &[("1", "VCC"), ("2", "GND")]),
        ];
        let first = NetlistBuilder::build(&components);
        let second = NetlistBuilder::build(&components);
        assert_eq!(first, second);
    }
}
