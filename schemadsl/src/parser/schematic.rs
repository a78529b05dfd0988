//! Schematic sheet ingestion (Format A).
//!
//! Projects a `.kicad_sch`-style nested-list document into metadata
//! components. Connectivity never comes from here: wire geometry is
//! recognized and ignored, and pad-to-net membership is the board
//! ingestor's job.

use std::collections::HashSet;

use crate::model::Component;
use crate::parser::sexp::{SExp, SExpParser};
use crate::parser::{expect_root, ProjectionError};

/// One parsed schematic sheet: metadata components plus the label texts
/// seen on the sheet.
#[derive(Debug, Default)]
pub struct SchematicSheet {
    pub page: String,
    pub components: Vec<Component>,
    pub labels: Vec<String>,
}

impl SchematicSheet {
    /// Parse one sheet. `page` becomes the page identifier of every
    /// component on it.
    pub fn parse(content: &str, page: &str) -> Result<Self, ProjectionError> {
        let root = SExpParser::parse_complete(content)?;
        let items = expect_root(&root, "kicad_sch")?;

        let mut sheet = SchematicSheet {
            page: page.to_string(),
            ..Default::default()
        };
        let mut seen: HashSet<String> = HashSet::new();

        // lib_symbols definitions are not direct children of the root, so
        // walking only the top level already excludes them.
        for item in items {
            match item.tag() {
                Some("symbol") => {
                    if let Some(component) = project_symbol(item, page) {
                        if seen.insert(component.refdes.clone()) {
                            sheet.components.push(component);
                        } else {
                            tracing::warn!(
                                refdes = %component.refdes,
                                page,
                                "duplicate reference on sheet, keeping first"
                            );
                        }
                    }
                }
                Some("label") | Some("global_label") | Some("hierarchical_label") => {
                    if let Some(text) = item.as_list().and_then(|l| l.get(1)).and_then(SExp::as_atom)
                    {
                        sheet.labels.push(text.to_string());
                    }
                }
                // Wire geometry carries no connectivity for this model.
                _ => {}
            }
        }

        Ok(sheet)
    }
}

fn project_symbol(symbol: &SExp, page: &str) -> Option<Component> {
    let mut reference = String::new();
    let mut value = String::new();
    let mut footprint = String::new();
    let mut extra: Vec<(String, String)> = Vec::new();

    for prop in symbol.get_all("property") {
        let fields = prop.as_list().unwrap_or(&[]);
        let (Some(key), Some(val)) = (
            fields.get(1).and_then(SExp::as_atom),
            fields.get(2).and_then(SExp::as_atom),
        ) else {
            continue;
        };
        match key {
            "Reference" => reference = val.to_string(),
            "Value" => value = val.to_string(),
            "Footprint" => footprint = val.to_string(),
            _ => extra.push((key.to_string(), val.to_string())),
        }
    }

    if reference.is_empty() {
        tracing::warn!(page, "symbol without a Reference property, skipping");
        return None;
    }
    // Virtual symbols (#PWR, #FLG) are annotations, not components.
    if reference.starts_with('#') {
        tracing::debug!(refdes = %reference, "skipping virtual symbol");
        return None;
    }

    let lib_id = symbol.get_string("lib_id").unwrap_or("").to_string();

    let lookup = |key: &str| {
        extra
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.clone())
            .unwrap_or_default()
    };
    let datasheet = lookup("Datasheet");

    let mut description = lookup("Description");
    if description.is_empty() && !lib_id.is_empty() {
        description = lib_id.rsplit(':').next().unwrap_or(&lib_id).to_string();
    }

    let mut mpn = lookup("PN");
    if mpn.is_empty() {
        mpn = lookup("MPN");
    }
    if mpn.is_empty() && !datasheet.is_empty() && datasheet != "~" && !datasheet.starts_with("http")
    {
        mpn = datasheet.clone();
    }

    let mut component = Component::new(reference)
        .with_value(value)
        .with_footprint(footprint)
        .with_description(description)
        .with_page(page);
    component.location = location(symbol);
    if !lib_id.is_empty() {
        component.properties.insert("lib_id".to_string(), lib_id);
    }
    for (key, val) in extra {
        component.properties.insert(key, val);
    }

    Some(component)
}

fn location(symbol: &SExp) -> (f64, f64) {
    let Some(at) = symbol.get("at").and_then(SExp::as_list) else {
        return (0.0, 0.0);
    };
    let coord = |idx: usize| {
        at.get(idx)
            .and_then(SExp::as_atom)
            .and_then(|s| s.parse::<f64>().ok())
            .unwrap_or(0.0)
    };
    (coord(1), coord(2))
}

#[cfg(test)]
mod tests {
    use super::*;

    const SHEET: &str = r##"(kicad_sch (version 20230121) (generator eeschema)
      (lib_symbols (symbol "Device:R" (pin passive line (at 0 0 0) (length 2.54))))
      (symbol (lib_id "Device:R") (at 100 50 0) (unit 1)
        (property "Reference" "R1" (at 0 0 0))
        (property "Value" "10k" (at 0 0 0))
        (property "Footprint" "Resistor_SMD:R_0603" (at 0 0 0))
        (property "Datasheet" "~" (at 0 0 0))
        (property "Tolerance" "1%" (at 0 0 0)))
      (symbol (lib_id "MCU:STM32F407") (at 120 60 0)
        (property "Reference" "U1" (at 0 0 0))
        (property "Value" "STM32F407VGT6" (at 0 0 0))
        (property "Description" "ARM Cortex-M4 MCU" (at 0 0 0))
        (property "PN" "STM32F407VGT6" (at 0 0 0)))
      (symbol (lib_id "power:GND") (at 10 10 0)
        (property "Reference" "#PWR01" (at 0 0 0))
        (property "Value" "GND" (at 0 0 0)))
      (global_label "UART_TX" (shape input) (at 50 50 0))
      (wire (pts (xy 0 0) (xy 10 0))))"##;

    #[test]
    fn test_parse_sheet_components() {
        let sheet = SchematicSheet::parse(SHEET, "Main").unwrap();
        assert_eq!(sheet.components.len(), 2);

        let r1 = &sheet.components[0];
        assert_eq!(r1.refdes, "R1");
        assert_eq!(r1.value, "10k");
        assert_eq!(r1.footprint, "Resistor_SMD:R_0603");
        assert_eq!(r1.page, "Main");
        assert_eq!(r1.location, (100.0, 50.0));
        // Description falls back to the lib_id tail.
        assert_eq!(r1.description, "R");
        assert_eq!(r1.properties.get("Tolerance").map(String::as_str), Some("1%"));
    }

    #[test]
    fn test_mpn_from_pn_property() {
        let sheet = SchematicSheet::parse(SHEET, "Main").unwrap();
        let u1 = &sheet.components[1];
        assert_eq!(u1.mpn, "STM32F407VGT6");
        assert_eq!(u1.description, "ARM Cortex-M4 MCU");
    }

    #[test]
    fn test_virtual_symbols_are_skipped() {
        let sheet = SchematicSheet::parse(SHEET, "Main").unwrap();
        assert!(sheet.components.iter().all(|c| !c.refdes.starts_with('#')));
    }

    #[test]
    fn test_labels_are_collected() {
        let sheet = SchematicSheet::parse(SHEET, "Main").unwrap();
        assert_eq!(sheet.labels, vec!["UART_TX".to_string()]);
    }

    #[test]
    fn test_wrong_root_is_rejected() {
        let err = SchematicSheet::parse("(kicad_pcb)", "Main").unwrap_err();
        assert!(matches!(err, ProjectionError::WrongRoot { expected: "kicad_sch", .. }));
    }

    #[test]
    fn test_syntax_error_carries_offset() {
        let err = SchematicSheet::parse("(kicad_sch (symbol", "Main").unwrap_err();
        let ProjectionError::Parse(parse) = err else {
            panic!("expected a parse error");
        };
        assert_eq!(parse.offset(), 18);
    }

    #[test]
    fn test_duplicate_reference_keeps_first() {
        let content = r#"(kicad_sch
          (symbol (property "Reference" "R1") (property "Value" "10k"))
          (symbol (property "Reference" "R1") (property "Value" "22k")))"#;
        let sheet = SchematicSheet::parse(content, "Main").unwrap();
        assert_eq!(sheet.components.len(), 1);
        assert_eq!(sheet.components[0].value, "10k");
    }
}
