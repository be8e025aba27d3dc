use std::io::{Cursor, Write};

use chrono::{DateTime, TimeZone};
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::analyzer::record::{InsuranceRecord, FIELD_NAMES};
use crate::error::SpreadsheetError;
use crate::spreadsheet::{column_name, Table, SHEET_NAME};

const CONTENT_TYPES_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/><Default Extension="xml" ContentType="application/xml"/><Override PartName="/xl/workbook.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml"/><Override PartName="/xl/worksheets/sheet1.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.worksheet+xml"/><Override PartName="/xl/styles.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.styles+xml"/></Types>"#;

const ROOT_RELS_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="xl/workbook.xml"/></Relationships>"#;

const WORKBOOK_RELS_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="worksheets/sheet1.xml"/><Relationship Id="rId2" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/styles" Target="styles.xml"/></Relationships>"#;

/// Style 0 is the default; style 1 is bold, used for the header row.
const STYLES_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<styleSheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main"><fonts count="2"><font><sz val="11"/><name val="Calibri"/></font><font><b/><sz val="11"/><name val="Calibri"/></font></fonts><fills count="2"><fill><patternFill patternType="none"/></fill><fill><patternFill patternType="gray125"/></fill></fills><borders count="1"><border><left/><right/><top/><bottom/><diagonal/></border></borders><cellStyleXfs count="1"><xf numFmtId="0" fontId="0" fillId="0" borderId="0"/></cellStyleXfs><cellXfs count="2"><xf numFmtId="0" fontId="0" fillId="0" borderId="0" xfId="0"/><xf numFmtId="0" fontId="1" fillId="0" borderId="0" xfId="0" applyFont="1"/></cellXfs></styleSheet>"#;

const HEADER_STYLE: &str = "1";

/// Renders one record as a single-row workbook with a bold header row.
pub fn build_workbook(record: &InsuranceRecord) -> Result<Vec<u8>, SpreadsheetError> {
    let table = Table {
        headers: FIELD_NAMES.iter().map(|name| name.to_string()).collect(),
        rows: vec![record.values()],
    };
    write_table(SHEET_NAME, &table)
}

/// Names the download `insurance_data_<YYYYmmdd_HHMMSS>.xlsx`.
pub fn export_filename<Tz: TimeZone>(at: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    format!("insurance_data_{}.xlsx", at.format("%Y%m%d_%H%M%S"))
}

/// Serializes a table into an in-memory `.xlsx` with one sheet.
pub fn write_table(sheet_name: &str, table: &Table) -> Result<Vec<u8>, SpreadsheetError> {
    let sheet_xml = sheet_xml(table)?;
    let workbook_xml = workbook_xml(sheet_name);

    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    let parts: [(&str, &[u8]); 6] = [
        ("[Content_Types].xml", CONTENT_TYPES_XML.as_bytes()),
        ("_rels/.rels", ROOT_RELS_XML.as_bytes()),
        ("xl/workbook.xml", workbook_xml.as_bytes()),
        ("xl/_rels/workbook.xml.rels", WORKBOOK_RELS_XML.as_bytes()),
        ("xl/styles.xml", STYLES_XML.as_bytes()),
        ("xl/worksheets/sheet1.xml", &sheet_xml),
    ];

    for (name, contents) in parts {
        zip.start_file(name, options)?;
        zip.write_all(contents)
            .map_err(|e| SpreadsheetError::Write(format!("{}: {}", name, e)))?;
    }

    let cursor = zip.finish()?;
    Ok(cursor.into_inner())
}

fn workbook_xml(sheet_name: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<workbook xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships"><sheets><sheet name="{}" sheetId="1" r:id="rId1"/></sheets></workbook>"#,
        quick_xml::escape::escape(sheet_name)
    )
}

fn sheet_xml(table: &Table) -> Result<Vec<u8>, SpreadsheetError> {
    let mut writer = Writer::new(Cursor::new(Vec::new()));

    write(
        &mut writer,
        Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), Some("yes"))),
    )?;

    let mut worksheet = BytesStart::new("worksheet");
    worksheet.push_attribute((
        "xmlns",
        "http://schemas.openxmlformats.org/spreadsheetml/2006/main",
    ));
    write(&mut writer, Event::Start(worksheet))?;
    write(&mut writer, Event::Start(BytesStart::new("sheetData")))?;

    write_row(&mut writer, 1, &table.headers, Some(HEADER_STYLE))?;
    for (index, row) in table.rows.iter().enumerate() {
        write_row(&mut writer, index + 2, row, None)?;
    }

    write(&mut writer, Event::End(BytesEnd::new("sheetData")))?;
    write(&mut writer, Event::End(BytesEnd::new("worksheet")))?;

    Ok(writer.into_inner().into_inner())
}

fn write_row(
    writer: &mut Writer<Cursor<Vec<u8>>>,
    row_number: usize,
    cells: &[String],
    style: Option<&str>,
) -> Result<(), SpreadsheetError> {
    let row_ref = row_number.to_string();
    let mut row = BytesStart::new("row");
    row.push_attribute(("r", row_ref.as_str()));
    write(writer, Event::Start(row))?;

    for (column, value) in cells.iter().enumerate() {
        let cell_ref = format!("{}{}", column_name(column), row_number);
        let mut cell = BytesStart::new("c");
        cell.push_attribute(("r", cell_ref.as_str()));
        cell.push_attribute(("t", "inlineStr"));
        if let Some(style) = style {
            cell.push_attribute(("s", style));
        }

        let mut text = BytesStart::new("t");
        if value.starts_with(char::is_whitespace) || value.ends_with(char::is_whitespace) {
            text.push_attribute(("xml:space", "preserve"));
        }

        write(writer, Event::Start(cell))?;
        write(writer, Event::Start(BytesStart::new("is")))?;
        write(writer, Event::Start(text))?;
        write(writer, Event::Text(BytesText::new(value)))?;
        write(writer, Event::End(BytesEnd::new("t")))?;
        write(writer, Event::End(BytesEnd::new("is")))?;
        write(writer, Event::End(BytesEnd::new("c")))?;
    }

    write(writer, Event::End(BytesEnd::new("row")))
}

fn write(writer: &mut Writer<Cursor<Vec<u8>>>, event: Event<'_>) -> Result<(), SpreadsheetError> {
    writer
        .write_event(event)
        .map_err(|e| SpreadsheetError::Write(e.to_string()))
}
