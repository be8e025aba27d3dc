use std::io::{Cursor, Read, Seek};

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use crate::error::SpreadsheetError;
use crate::spreadsheet::{column_index, Table};

const FIRST_SHEET: &str = "xl/worksheets/sheet1.xml";
const SHARED_STRINGS: &str = "xl/sharedStrings.xml";
const WORKBOOK: &str = "xl/workbook.xml";

/// Reads the first sheet of an `.xlsx`: row 1 becomes the headers.
///
/// Handles inline strings, shared strings and plain `<v>` values.
pub fn read_table(bytes: &[u8]) -> Result<Table, SpreadsheetError> {
    let mut archive = zip::ZipArchive::new(Cursor::new(bytes))?;

    let shared = match read_part(&mut archive, SHARED_STRINGS) {
        Ok(xml) => parse_shared_strings(&xml)?,
        Err(SpreadsheetError::MissingPart(_)) => Vec::new(),
        Err(e) => return Err(e),
    };

    let sheet = read_part(&mut archive, FIRST_SHEET)?;
    let mut rows = parse_sheet(&sheet, &shared)?.into_iter();

    Ok(Table {
        headers: rows.next().unwrap_or_default(),
        rows: rows.collect(),
    })
}

/// Sheet names in workbook order.
pub fn sheet_names(bytes: &[u8]) -> Result<Vec<String>, SpreadsheetError> {
    let mut archive = zip::ZipArchive::new(Cursor::new(bytes))?;
    let xml = read_part(&mut archive, WORKBOOK)?;

    let mut reader = Reader::from_str(&xml);
    let mut names = Vec::new();
    loop {
        match reader.read_event() {
            Ok(Event::Start(ref e)) | Ok(Event::Empty(ref e)) if e.local_name().as_ref() == b"sheet" => {
                if let Some(name) = attribute(e, b"name")? {
                    names.push(name);
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(SpreadsheetError::Read(format!("workbook.xml: {}", e))),
            _ => {}
        }
    }
    Ok(names)
}

fn read_part<R: Read + Seek>(
    archive: &mut zip::ZipArchive<R>,
    name: &str,
) -> Result<String, SpreadsheetError> {
    let mut file = match archive.by_name(name) {
        Ok(file) => file,
        Err(zip::result::ZipError::FileNotFound) => {
            return Err(SpreadsheetError::MissingPart(name.to_string()))
        }
        Err(e) => return Err(e.into()),
    };

    let mut contents = String::new();
    file.read_to_string(&mut contents)
        .map_err(|e| SpreadsheetError::Read(format!("{}: {}", name, e)))?;
    Ok(contents)
}

/// Unescaped content between `start` and its matching end tag.
fn element_text(
    reader: &mut Reader<&[u8]>,
    xml: &str,
    start: &BytesStart<'_>,
) -> Result<String, SpreadsheetError> {
    let span = reader
        .read_to_end(start.name())
        .map_err(|e| SpreadsheetError::Read(e.to_string()))?;
    let raw = xml
        .get(span.start as usize..span.end as usize)
        .ok_or_else(|| SpreadsheetError::Read("element span out of range".to_string()))?;
    quick_xml::escape::unescape(raw)
        .map(|text| text.into_owned())
        .map_err(|e| SpreadsheetError::Read(e.to_string()))
}

fn attribute(e: &BytesStart<'_>, key: &[u8]) -> Result<Option<String>, SpreadsheetError> {
    for attr in e.attributes() {
        let attr = attr.map_err(|err| SpreadsheetError::Read(err.to_string()))?;
        if attr.key.as_ref() == key {
            return Ok(Some(String::from_utf8_lossy(&attr.value).into_owned()));
        }
    }
    Ok(None)
}

fn parse_shared_strings(xml: &str) -> Result<Vec<String>, SpreadsheetError> {
    let mut reader = Reader::from_str(xml);
    let mut strings = Vec::new();
    let mut current: Option<String> = None;

    loop {
        match reader.read_event() {
            Ok(Event::Start(ref e)) => match e.local_name().as_ref() {
                b"si" => current = Some(String::new()),
                b"t" => {
                    let text = element_text(&mut reader, xml, e)?;
                    if let Some(current) = current.as_mut() {
                        current.push_str(&text);
                    }
                }
                _ => {}
            },
            Ok(Event::Empty(ref e)) if e.local_name().as_ref() == b"si" => {
                strings.push(String::new());
            }
            Ok(Event::End(ref e)) if e.local_name().as_ref() == b"si" => {
                strings.push(current.take().unwrap_or_default());
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(SpreadsheetError::Read(format!("sharedStrings.xml: {}", e))),
            _ => {}
        }
    }

    Ok(strings)
}

/// A `<c>` element being read.
struct PendingCell {
    column: usize,
    kind: Option<String>,
    raw: String,
}

impl PendingCell {
    fn resolve(self, shared: &[String]) -> Result<String, SpreadsheetError> {
        match self.kind.as_deref() {
            Some("s") => {
                let index: usize = self.raw.trim().parse().map_err(|_| {
                    SpreadsheetError::Read(format!("invalid shared string index '{}'", self.raw))
                })?;
                shared.get(index).cloned().ok_or_else(|| {
                    SpreadsheetError::Read(format!("shared string {} out of range", index))
                })
            }
            _ => Ok(self.raw),
        }
    }
}

fn parse_sheet(xml: &str, shared: &[String]) -> Result<Vec<Vec<String>>, SpreadsheetError> {
    let mut reader = Reader::from_str(xml);
    let mut rows = Vec::new();
    let mut row: Option<Vec<String>> = None;
    let mut cell: Option<PendingCell> = None;

    loop {
        match reader.read_event() {
            Ok(Event::Start(ref e)) => match e.local_name().as_ref() {
                b"row" => row = Some(Vec::new()),
                b"c" => {
                    let next_column = row.as_ref().map(Vec::len).unwrap_or(0);
                    cell = Some(PendingCell {
                        column: attribute(e, b"r")?
                            .and_then(|r| column_index(&r))
                            .unwrap_or(next_column),
                        kind: attribute(e, b"t")?,
                        raw: String::new(),
                    });
                }
                b"t" | b"v" => {
                    let text = element_text(&mut reader, xml, e)?;
                    if let Some(cell) = cell.as_mut() {
                        cell.raw.push_str(&text);
                    }
                }
                _ => {}
            },
            Ok(Event::Empty(ref e)) if e.local_name().as_ref() == b"row" => {
                rows.push(Vec::new());
            }
            Ok(Event::End(ref e)) => match e.local_name().as_ref() {
                b"c" => {
                    if let (Some(pending), Some(row)) = (cell.take(), row.as_mut()) {
                        let column = pending.column;
                        let value = pending.resolve(shared)?;
                        if row.len() <= column {
                            row.resize(column + 1, String::new());
                        }
                        row[column] = value;
                    }
                }
                b"row" => rows.push(row.take().unwrap_or_default()),
                _ => {}
            },
            Ok(Event::Eof) => break,
            Err(e) => return Err(SpreadsheetError::Read(format!("sheet1.xml: {}", e))),
            _ => {}
        }
    }

    Ok(rows)
}
