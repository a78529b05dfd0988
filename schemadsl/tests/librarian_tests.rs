//! End-to-end tests: providers through the librarian to emitted text.

use schemadsl::{
    DesignProvider, JsonDesignProvider, Librarian, MergedProvider, QueryError,
    SchematicMetadataProvider,
};
use schemadsl::provider::BoardNetlistProvider;

/// Two-page design: an MCU and a regulator on Main, a connector on IO,
/// with UART_TX spanning both pages and GND everywhere.
fn design_json() -> String {
    let mut components = Vec::new();

    components.push(serde_json::json!({
        "designator": "U1",
        "description": "ARM MCU",
        "footprint": "LQFP-100",
        "sheet": "Main.SchDoc",
        "parameters": {"PN": "STM32F407VGT6", "Comment": "STM32F407VGT6"},
        "pins": [
            {"name": "1", "net": "3V3"},
            {"name": "2", "net": "ADC_IN"},
            {"name": "10", "net": "GND"},
            {"name": "22", "net": "UART_TX"},
            {"name": "50", "net": "GND"}
        ]
    }));
    components.push(serde_json::json!({
        "designator": "U2",
        "description": "Linear Regulator",
        "sheet": "Main.SchDoc",
        "parameters": {"Comment": "LM1117-3.3"},
        "pins": [
            {"name": "VIN", "net": "VBUS"},
            {"name": "VOUT", "net": "3V3"},
            {"name": "GND", "net": "GND"}
        ]
    }));
    components.push(serde_json::json!({
        "designator": "J1",
        "description": "UART header",
        "sheet": "IO.SchDoc",
        "parameters": {"Comment": "CONN_3"},
        "pins": [
            {"name": "1", "net": "UART_TX"},
            {"name": "2", "net": "GND"},
            {"name": "3", "net": ""}
        ]
    }));
    // Simple passives on Main.
    for (i, net) in [(1, "3V3"), (2, "UART_TX")] {
        components.push(serde_json::json!({
            "designator": format!("R{i}"),
            "sheet": "Main.SchDoc",
            "parameters": {"Comment": "10k"},
            "pins": [
                {"name": "1", "net": net},
                {"name": "2", "net": "GND"}
            ]
        }));
    }

    serde_json::json!({
        "components": components,
        "nets": ["3V3", "GND", "UART_TX", "VBUS"]
    })
    .to_string()
}

fn librarian() -> Librarian<JsonDesignProvider> {
    Librarian::new(JsonDesignProvider::from_source(design_json()))
}

#[test]
fn test_index_lists_pages_and_counts() {
    let mut librarian = librarian();
    let index = librarian.get_index().unwrap();

    assert!(index.starts_with("# SCHEMATIC INDEX\n\n## Pages\n"));
    assert!(index.contains("- IO.SchDoc (1 components,"));
    assert!(index.contains("- Main.SchDoc (4 components,"));
}

#[test]
fn test_index_lists_inter_page_signals() {
    let mut librarian = librarian();
    let index = librarian.get_index().unwrap();

    assert!(index.contains("## Inter-Page Signals"));
    assert!(index.contains("- GND: IO.SchDoc ↔ Main.SchDoc"));
    assert!(index.contains("- UART_TX: IO.SchDoc ↔ Main.SchDoc"));
    // 3V3 lives on Main only.
    assert!(!index.contains("- 3V3:"));
}

#[test]
fn test_page_output() {
    let mut librarian = librarian();
    let page = librarian.get_page("Main.SchDoc").unwrap();

    assert!(page.starts_with("# PAGE: Main.SchDoc\n"));
    // Complex components get blocks; simple resistors stay inline.
    assert!(page.contains("COMP U1 (STM32F407VGT6)"));
    assert!(page.contains("COMP U2 (LM1117-3.3)"));
    assert!(!page.contains("COMP R1"));
    // UART_TX touches both pages: enumerated LINKS line.
    assert!(page.contains("NET UART_TX\n  LINKS: IO.SchDoc, Main.SchDoc"));
    // Page-local 3V3 has no LINKS line.
    assert!(page.contains("NET 3V3\n  CON:"));
    // The off-page connector pin still shows in the net line.
    assert!(page.contains("J1.1"));
}

#[test]
fn test_unknown_page_is_not_found_note() {
    let mut librarian = librarian();
    let page = librarian.get_page("Mystery").unwrap();
    assert!(page.contains("(Page not found in design)"));
}

#[test]
fn test_context_one_hop() {
    let mut librarian = librarian();
    let context = librarian.get_context(&["U1"]).unwrap();

    assert!(context.starts_with("# CONTEXT: U1\n"));
    assert!(context.contains("COMP U1 (STM32F407VGT6)"));
    // 1-hop neighbors through 3V3, UART_TX, GND.
    assert!(context.contains("# CONTEXT_NEIGHBORS"));
    assert!(context.contains("J1 CONN (CONN_3)"));
    assert!(context.contains("R1 RES (10k)"));
    assert!(context.contains("R2 RES (10k)"));
    assert!(context.contains("U2 IC (LM1117-3.3)"));
    // Only nets touching U1: VBUS and NC are out of the bubble.
    assert!(context.contains("NET 3V3"));
    assert!(context.contains("NET UART_TX"));
    assert!(!context.contains("NET VBUS"));
    assert!(!context.contains("NET NC"));
}

#[test]
fn test_context_skips_unknown_refdes() {
    let mut librarian = librarian();
    let context = librarian.get_context(&["U1", "ZZ9"]).unwrap();
    assert!(context.starts_with("# CONTEXT: U1\n"));
}

#[test]
fn test_context_with_no_matches() {
    let mut librarian = librarian();
    let context = librarian.get_context(&["ZZ9"]).unwrap();
    assert!(context.contains("(No matching components in design)"));
}

#[test]
fn test_empty_design_errors() {
    let mut librarian = Librarian::new(JsonDesignProvider::from_source("{}".to_string()));
    assert!(matches!(librarian.get_index(), Err(QueryError::EmptyDesign)));
    assert!(matches!(librarian.get_page("Main"), Err(QueryError::EmptyDesign)));
    assert!(matches!(librarian.get_context(&["U1"]), Err(QueryError::EmptyDesign)));
}

#[test]
fn test_stats() {
    let mut librarian = librarian();
    let stats = librarian.get_stats().unwrap();
    assert_eq!(stats.components, 5);
    assert_eq!(stats.pages, 2);
    // 3V3, ADC_IN, GND, NC, UART_TX, VBUS
    assert_eq!(stats.nets, 6);
    assert_eq!(stats.inter_page_nets, 2);
    // 3V3 and GND by name.
    assert_eq!(stats.global_nets, 2);
}

#[test]
fn test_reload_swaps_snapshot() {
    let mut librarian = librarian();
    let first = librarian.snapshot().unwrap();
    librarian.mark_dirty();
    let second = librarian.snapshot().unwrap();

    // A brand-new snapshot each reload; the old one stays valid and equal.
    assert!(!std::sync::Arc::ptr_eq(&first, &second));
    assert_eq!(first.components, second.components);
    assert_eq!(first.nets, second.nets);
}

#[test]
fn test_snapshot_is_stable_without_mark_dirty() {
    let mut librarian = librarian();
    let first = librarian.snapshot().unwrap();
    let second = librarian.snapshot().unwrap();
    assert!(std::sync::Arc::ptr_eq(&first, &second));
}

#[test]
fn test_member_total_matches_pin_total() {
    let mut librarian = librarian();
    let snapshot = librarian.snapshot().unwrap();

    let pin_total: usize = snapshot.components.iter().map(|c| c.pins.len()).sum();
    let member_total: usize = snapshot.nets.iter().map(|n| n.members.len()).sum();
    assert_eq!(pin_total, member_total);
}

const SHEET_MAIN: &str = r#"(kicad_sch
  (symbol (lib_id "MCU:STM32F407") (at 120 60 0)
    (property "Reference" "U1")
    (property "Value" "STM32F407VGT6")
    (property "Description" "ARM MCU"))
  (symbol (lib_id "Device:C") (at 10 10 0)
    (property "Reference" "C1")
    (property "Value" "100nF")))"#;

const BOARD: &str = r#"(kicad_pcb
  (net 1 "GND") (net 2 "3V3") (net 3 "ADC_IN") (net 4 "UART_TX")
  (footprint "LQFP-100"
    (property "Reference" "U1")
    (pad "1" smd (net 2 "3V3"))
    (pad "2" smd (net 3 "ADC_IN"))
    (pad "10" smd (net 1 "GND"))
    (pad "22" smd (net 4 "UART_TX"))
    (pad "50" smd (net 1 "GND")))
  (footprint "C_0603"
    (property "Reference" "C1")
    (pad "1" smd (net 2 "3V3"))
    (pad "2" smd (net 1 "GND"))))"#;

#[test]
fn test_merged_provider_through_librarian() {
    let provider = MergedProvider::new(
        SchematicMetadataProvider::from_sources(vec![("Main".to_string(), SHEET_MAIN.to_string())]),
        BoardNetlistProvider::from_source(BOARD.to_string()),
    );
    let mut librarian = Librarian::new(provider);

    let page = librarian.get_page("Main").unwrap();
    assert!(page.contains("COMP U1 (STM32F407VGT6)"));
    assert!(page.contains("NET 3V3"));
    assert!(page.contains("C1.1"));
}

#[test]
fn test_boxed_provider_stack() {
    let provider: Box<dyn DesignProvider + Send> =
        Box::new(JsonDesignProvider::from_source(design_json()));
    let mut librarian = Librarian::new(provider);
    assert!(librarian.get_index().is_ok());
}
