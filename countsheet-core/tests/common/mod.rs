//! Minimal XLSX containers for integration tests

#![allow(dead_code)]

use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;
use zip::ZipWriter;
use zip::write::SimpleFileOptions;

pub const WORKSHEET: &str = "xl/worksheets/sheet1.xml";

pub const STYLES_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<styleSheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main"><numFmts count="1"><numFmt numFmtId="164" formatCode="0.00"/></numFmts><fonts count="2"><font><sz val="11"/><name val="Calibri"/></font><font><b/><sz val="11"/><name val="Calibri"/></font></fonts><cellXfs count="3"><xf numFmtId="0" fontId="0"/><xf numFmtId="164" fontId="0" applyNumberFormat="1"/><xf numFmtId="0" fontId="1" applyFont="1"/></cellXfs></styleSheet>"#;

pub const NOTES_SHEET_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main"><sheetData><row r="1"><c r="A1"><f>SUM(Count!C2:C10)</f><v>30</v></c></row></sheetData></worksheet>"#;

pub fn xml_escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

/// Inline string cell
pub fn text(reference: &str, value: &str) -> String {
    format!(
        r#"<c r="{}" t="inlineStr"><is><t>{}</t></is></c>"#,
        reference,
        xml_escape(value)
    )
}

/// Shared string cell pointing at `index`
pub fn shared(reference: &str, index: usize) -> String {
    format!(r#"<c r="{}" t="s"><v>{}</v></c>"#, reference, index)
}

/// Numeric cell with the two-decimal style applied
pub fn number(reference: &str, value: &str) -> String {
    format!(r#"<c r="{}" s="1"><v>{}</v></c>"#, reference, value)
}

pub fn row(number: u32, cells: &[String]) -> String {
    format!(
        r#"<row r="{}" spans="1:7" x14ac:dyDescent="0.25">{}</row>"#,
        number,
        cells.concat()
    )
}

pub fn worksheet(rows: &[String]) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" xmlns:x14ac="http://schemas.microsoft.com/office/spreadsheetml/2009/9/ac"><dimension ref="A1:G9"/><sheetViews><sheetView workbookViewId="0"><pane ySplit="1" topLeftCell="A2" activePane="bottomLeft" state="frozen"/></sheetView></sheetViews><cols><col min="1" max="1" width="32.7" customWidth="1"/></cols><sheetData>{}</sheetData><pageMargins left="0.7" right="0.7" top="0.75" bottom="0.75" header="0.3" footer="0.3"/></worksheet>"#,
        rows.concat()
    )
}

pub fn standard_header() -> String {
    row(
        1,
        &[
            text("A1", "Item Description"),
            text("B1", "Dist #"),
            text("C1", "Quantity"),
            text("D1", "UOM"),
            text("E1", "Location"),
            text("F1", "Area"),
            text("G1", "Place"),
        ],
    )
}

/// Write a two-sheet container whose first sheet is `sheet_xml`
pub fn write_container(
    path: &Path,
    sheet_xml: &str,
    shared_strings: Option<&[&str]>,
) -> anyhow::Result<()> {
    let file = File::create(path)?;
    let mut zip = ZipWriter::new(file);
    let stored = SimpleFileOptions::default().compression_method(zip::CompressionMethod::Stored);
    let deflated =
        SimpleFileOptions::default().compression_method(zip::CompressionMethod::Deflated);

    let mut content_types = String::from(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/><Default Extension="xml" ContentType="application/xml"/><Override PartName="/xl/workbook.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml"/><Override PartName="/xl/worksheets/sheet1.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.worksheet+xml"/><Override PartName="/xl/worksheets/sheet2.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.worksheet+xml"/><Override PartName="/xl/styles.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.styles+xml"/>"#,
    );
    if shared_strings.is_some() {
        content_types.push_str(r#"<Override PartName="/xl/sharedStrings.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.sharedStrings+xml"/>"#);
    }
    content_types.push_str("</Types>");
    zip.start_file("[Content_Types].xml", stored)?;
    zip.write_all(content_types.as_bytes())?;

    zip.start_file("_rels/.rels", stored)?;
    zip.write_all(r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="xl/workbook.xml"/></Relationships>"#.as_bytes())?;

    zip.start_file("xl/workbook.xml", deflated)?;
    zip.write_all(r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<workbook xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships"><sheets><sheet name="Count" sheetId="1" r:id="rId1"/><sheet name="Notes" sheetId="2" r:id="rId2"/></sheets></workbook>"#.as_bytes())?;

    let mut rels = String::from(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="worksheets/sheet1.xml"/><Relationship Id="rId2" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="worksheets/sheet2.xml"/><Relationship Id="rId3" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/styles" Target="styles.xml"/>"#,
    );
    if shared_strings.is_some() {
        rels.push_str(r#"<Relationship Id="rId4" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/sharedStrings" Target="sharedStrings.xml"/>"#);
    }
    rels.push_str("</Relationships>");
    zip.start_file("xl/_rels/workbook.xml.rels", deflated)?;
    zip.write_all(rels.as_bytes())?;

    zip.start_file("xl/styles.xml", deflated)?;
    zip.write_all(STYLES_XML.as_bytes())?;

    zip.start_file(WORKSHEET, deflated)?;
    zip.write_all(sheet_xml.as_bytes())?;

    zip.start_file("xl/worksheets/sheet2.xml", stored)?;
    zip.write_all(NOTES_SHEET_XML.as_bytes())?;

    if let Some(strings) = shared_strings {
        let items: String = strings
            .iter()
            .map(|s| format!("<si><t>{}</t></si>", xml_escape(s)))
            .collect();
        zip.start_file("xl/sharedStrings.xml", deflated)?;
        zip.write_all(
            format!(
                r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<sst xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" count="{n}" uniqueCount="{n}">{items}</sst>"#,
                n = strings.len(),
                items = items
            )
            .as_bytes(),
        )?;
    }

    zip.finish()?;
    Ok(())
}

/// The one-row template from the tomatoes scenario
pub fn tomatoes_template(path: &Path) -> anyhow::Result<()> {
    let sheet = worksheet(&[
        standard_header(),
        row(
            2,
            &[
                text("A2", "Tomatoes"),
                text("B2", "D100"),
                number("C2", "12"),
                text("D2", "CASE"),
                text("E2", "Walk-in"),
                text("F2", "Kitchen"),
                text("G2", "Shelf-2"),
            ],
        ),
    ]);
    write_container(path, &sheet, None)
}

pub fn entry_names(path: &Path) -> anyhow::Result<Vec<String>> {
    let mut archive = zip::ZipArchive::new(File::open(path)?)?;
    let mut names = Vec::new();
    for i in 0..archive.len() {
        names.push(archive.by_index(i)?.name().to_string());
    }
    Ok(names)
}

pub fn read_entry(path: &Path, name: &str) -> anyhow::Result<Vec<u8>> {
    let mut archive = zip::ZipArchive::new(File::open(path)?)?;
    let mut file = archive.by_name(name)?;
    let mut content = Vec::new();
    file.read_to_end(&mut content)?;
    Ok(content)
}

pub fn read_entry_string(path: &Path, name: &str) -> anyhow::Result<String> {
    Ok(String::from_utf8(read_entry(path, name)?)?)
}
