mod common;

use common::*;
use countsheet_core::{CountSheetConfig, CountSheetError, parse_template};
use std::fs::{self, File};
use std::io::Write;
use zip::ZipWriter;
use zip::write::SimpleFileOptions;

#[test]
fn test_parse_tomatoes_template() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("count.xlsx");
    tomatoes_template(&path)?;

    let result = parse_template(&path, &CountSheetConfig::default())?;
    assert_eq!(result.records.len(), 1);
    assert_eq!(result.quantity_column.letters(), "C");
    assert_eq!(result.worksheet_path, WORKSHEET);

    let record = &result.records[0];
    assert_eq!(record.row_position(), 2);
    assert_eq!(record.quantity, 12);
    assert_eq!(record.description(), "Tomatoes");
    assert_eq!(record.distributor_id(), "D100");
    assert_eq!(record.unit_of_measure(), "CASE");
    assert_eq!(record.location(), "Walk-in");
    assert_eq!(record.area(), "Kitchen");
    assert_eq!(record.place(), "Shelf-2");
    assert_eq!(record.customer_id(), "");
    Ok(())
}

#[test]
fn test_parse_shared_strings_with_spacer_rows() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("count.xlsx");
    let strings = [
        "Cust # *",
        "Item Description",
        "Dist # *",
        "Quantity",
        "UOM",
        "Onions",
        "D200",
        "EA",
    ];
    let sheet = worksheet(&[
        row(
            1,
            &[
                shared("A1", 0),
                shared("B1", 1),
                shared("C1", 2),
                text("D1", "Notes"),
                shared("E1", 3),
                shared("F1", 4),
            ],
        ),
        row(2, &[number("A2", "5501"), shared("B2", 5), shared("C2", 6), number("E2", "3"), shared("F2", 7)]),
        row(3, &[number("E3", "8"), shared("F3", 7), text("D3", "spacer")]),
        row(4, &[text("C4", "D900"), number("E4", "n/a")]),
    ]);
    write_container(&path, &sheet, Some(&strings[..]))?;

    let result = parse_template(&path, &CountSheetConfig::default())?;
    assert_eq!(result.quantity_column.letters(), "E");
    let positions: Vec<u32> = result.records.iter().map(|r| r.row_position()).collect();
    assert_eq!(positions, vec![2, 4]);

    let onions = &result.records[0];
    assert_eq!(onions.customer_id(), "5501");
    assert_eq!(onions.description(), "Onions");
    assert_eq!(onions.distributor_id(), "D200");
    assert_eq!(onions.quantity, 3);
    assert_eq!(onions.unit_of_measure(), "EA");

    // Non-numeric quantity counts as zero
    assert_eq!(result.records[1].quantity, 0);
    assert_eq!(result.records[1].description(), "");
    Ok(())
}

#[test]
fn test_missing_quantity_column() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("count.xlsx");
    let sheet = worksheet(&[
        row(1, &[text("A1", "Item Description"), text("B1", "Dist #"), text("C1", "UOM")]),
        row(2, &[text("A2", "Onions"), text("B2", "D1"), text("C2", "EA")]),
    ]);
    write_container(&path, &sheet, None)?;

    let err = parse_template(&path, &CountSheetConfig::default()).unwrap_err();
    assert_eq!(err.missing_fields(), Some(vec!["quantity"]));
    Ok(())
}

#[test]
fn test_header_only_sheet_has_no_data_rows() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("count.xlsx");
    write_container(&path, &worksheet(&[standard_header()]), None)?;

    let err = parse_template(&path, &CountSheetConfig::default()).unwrap_err();
    assert!(matches!(err, CountSheetError::NoDataRows));
    Ok(())
}

#[test]
fn test_missing_file_and_invalid_container() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let missing = dir.path().join("missing.xlsx");
    assert!(matches!(
        parse_template(&missing, &CountSheetConfig::default()),
        Err(CountSheetError::TemplateNotFound(_))
    ));

    let garbage = dir.path().join("garbage.xlsx");
    fs::write(&garbage, b"this is not a zip archive")?;
    assert!(matches!(
        parse_template(&garbage, &CountSheetConfig::default()),
        Err(CountSheetError::InvalidTemplate(_))
    ));
    Ok(())
}

#[test]
fn test_container_without_worksheet() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("empty.xlsx");
    let mut zip = ZipWriter::new(File::create(&path)?);
    zip.start_file("[Content_Types].xml", SimpleFileOptions::default())?;
    zip.write_all(b"<Types/>")?;
    zip.finish()?;

    let err = parse_template(&path, &CountSheetConfig::default()).unwrap_err();
    assert!(matches!(err, CountSheetError::InvalidTemplate(_)), "{err}");
    Ok(())
}

#[test]
fn test_configured_labels_and_worksheet() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("count.xlsx");
    let sheet = worksheet(&[
        row(1, &[text("A1", "Item Description"), text("B1", "Dist #"), text("C1", "Qty")]),
        row(2, &[text("A2", "Onions"), text("B2", "D1"), number("C2", "6")]),
    ]);
    write_container(&path, &sheet, None)?;

    let config: CountSheetConfig = toml::from_str(
        r#"
worksheet_path = "xl/worksheets/sheet1.xml"

[labels]
quantity = ["Qty"]
"#,
    )?;
    let result = parse_template(&path, &config)?;
    assert_eq!(result.records[0].quantity, 6);
    Ok(())
}
