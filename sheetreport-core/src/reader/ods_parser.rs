//! ODS parsing: turns `content.xml` into sheets of authored rows
//!
//! Rows and cells keep their `table:number-rows-repeated` /
//! `table:number-columns-repeated` markers; expansion happens on read, in the
//! extractors.

use anyhow::{Context, Result};
use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};
use std::io::{BufRead, BufReader, Read, Seek};
use std::iter;
use zip::ZipArchive;

use super::parser_utils::{attr_value, parse_count};
use super::{RawCell, Row, Sheet, WorkbookReader};

pub struct OdsReader<'a, R: Read + Seek> {
    archive: &'a mut ZipArchive<R>,
}

impl<'a, R: Read + Seek> OdsReader<'a, R> {
    pub fn new(archive: &'a mut ZipArchive<R>) -> Result<Self> {
        Ok(Self { archive })
    }
}

impl<R: Read + Seek> WorkbookReader for OdsReader<'_, R> {
    fn read_sheets(&mut self) -> Result<Vec<Sheet>> {
        let content_xml = self
            .archive
            .by_name("content.xml")
            .context("ODS archive has no content.xml")?;
        parse_content(BufReader::new(content_xml))
    }
}

/// Cell being assembled between its start and end tags
struct PendingCell {
    paragraphs: Vec<String>,
    value: Option<String>,
    repeated: u32,
}

impl PendingCell {
    fn start(e: &BytesStart) -> Result<Self> {
        let repeated = parse_count(attr_value(e, b"table:number-columns-repeated")?.as_deref());
        Ok(Self {
            paragraphs: Vec::new(),
            value: attr_value(e, b"office:value")?,
            repeated,
        })
    }

    fn finish(self) -> RawCell {
        RawCell {
            content: self.paragraphs.join(" "),
            value: self.value,
            repeated: self.repeated,
        }
    }
}

fn table_name(e: &BytesStart) -> Result<String> {
    Ok(attr_value(e, b"table:name")?.unwrap_or_default())
}

fn row_start(e: &BytesStart) -> Result<Row> {
    Ok(Row {
        cells: Vec::new(),
        repeated: parse_count(attr_value(e, b"table:number-rows-repeated")?.as_deref()),
    })
}

/// Parse the body of an ODS `content.xml` into sheets in document order
pub fn parse_content<B: BufRead>(input: B) -> Result<Vec<Sheet>> {
    let mut reader = Reader::from_reader(input);

    let mut buf = Vec::new();
    let mut sheets = Vec::new();
    let mut sheet: Option<Sheet> = None;
    let mut row: Option<Row> = None;
    let mut cell: Option<PendingCell> = None;
    let mut paragraph: Option<String> = None;
    // Depth inside elements whose text is not cell content (annotations, shapes, sub-tables)
    let mut skip_depth = 0usize;

    loop {
        let event = reader.read_event_into(&mut buf).map_err(|e| {
            anyhow::anyhow!(
                "XML parsing error at position {}: {}",
                reader.error_position(),
                e
            )
        })?;

        if skip_depth > 0 {
            match event {
                Event::Start(_) => skip_depth += 1,
                Event::End(_) => skip_depth -= 1,
                Event::Eof => break,
                _ => {}
            }
            buf.clear();
            continue;
        }

        match event {
            Event::Start(e) => match e.name().as_ref() {
                b"office:annotation" | b"text:note" => skip_depth = 1,
                b"table:table" if cell.is_some() => skip_depth = 1,
                // Anchored shapes and text boxes carry their own paragraphs
                name if cell.is_some() && name.starts_with(b"draw:") => skip_depth = 1,
                b"text:p" | b"text:h" if paragraph.is_some() => skip_depth = 1,
                b"table:table" => {
                    if let Some(done) = sheet.take() {
                        sheets.push(done);
                    }
                    sheet = Some(Sheet::new(table_name(&e)?));
                }
                b"table:table-row" if sheet.is_some() => row = Some(row_start(&e)?),
                b"table:table-cell" | b"table:covered-table-cell" if row.is_some() => {
                    cell = Some(PendingCell::start(&e)?);
                }
                b"text:p" | b"text:h" if cell.is_some() => paragraph = Some(String::new()),
                _ => {}
            },
            Event::Empty(e) => match e.name().as_ref() {
                b"table:table" if cell.is_none() => sheets.push(Sheet::new(table_name(&e)?)),
                b"table:table-row" => {
                    if let Some(ref mut sheet) = sheet {
                        sheet.rows.push(row_start(&e)?);
                    }
                }
                b"table:table-cell" | b"table:covered-table-cell" => {
                    if let Some(ref mut row) = row {
                        row.cells.push(PendingCell::start(&e)?.finish());
                    }
                }
                b"text:p" | b"text:h" if paragraph.is_none() => {
                    if let Some(ref mut cell) = cell {
                        cell.paragraphs.push(String::new());
                    }
                }
                b"text:s" => {
                    if let Some(ref mut text) = paragraph {
                        let spaces = parse_count(attr_value(&e, b"text:c")?.as_deref());
                        text.extend(iter::repeat_n(' ', spaces as usize));
                    }
                }
                b"text:tab" => {
                    if let Some(ref mut text) = paragraph {
                        text.push('\t');
                    }
                }
                b"text:line-break" => {
                    if let Some(ref mut text) = paragraph {
                        text.push('\n');
                    }
                }
                _ => {}
            },
            Event::Text(t) => {
                if let Some(ref mut text) = paragraph {
                    text.push_str(&t.unescape()?);
                }
            }
            Event::CData(t) => {
                if let Some(ref mut text) = paragraph {
                    text.push_str(&String::from_utf8_lossy(t.as_ref()));
                }
            }
            Event::End(e) => match e.name().as_ref() {
                b"text:p" | b"text:h" => {
                    if let (Some(text), Some(cell)) = (paragraph.take(), cell.as_mut()) {
                        cell.paragraphs.push(text);
                    }
                }
                b"table:table-cell" | b"table:covered-table-cell" => {
                    if let (Some(done), Some(row)) = (cell.take(), row.as_mut()) {
                        row.cells.push(done.finish());
                    }
                }
                b"table:table-row" => {
                    if let (Some(done), Some(sheet)) = (row.take(), sheet.as_mut()) {
                        sheet.rows.push(done);
                    }
                }
                b"table:table" => {
                    if let Some(done) = sheet.take() {
                        sheets.push(done);
                    }
                }
                _ => {}
            },
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    // Truncated documents keep whatever was complete
    if let Some(done) = sheet.take() {
        sheets.push(done);
    }

    Ok(sheets)
}
