//! ODS/Excel file reader
//!
//! ODS goes through a quick-xml parser over `content.xml` so that column and
//! row repetition markers survive; Excel formats go through calamine.

use anyhow::{Context, Result};
use std::fs::File;
use std::io::{Read, Seek};
use std::path::Path;
use tracing::debug;
use zip::ZipArchive;

pub mod excel_parser;
pub mod ods_parser;
pub mod parser_utils;
pub mod workbook;

use self::excel_parser::ExcelReader;
use self::ods_parser::OdsReader;
pub use workbook::{RawCell, Row, Sheet, Workbook};

/// Trait for spreadsheet format readers
pub trait WorkbookReader {
    /// Read every sheet, in document order
    fn read_sheets(&mut self) -> Result<Vec<Sheet>>;
}

/// Read an ODS document from any seekable source
pub fn read_ods<R: Read + Seek>(source: R) -> Result<Vec<Sheet>> {
    let mut archive = ZipArchive::new(source).context("Failed to open zip archive")?;
    OdsReader::new(&mut archive)?.read_sheets()
}

/// Read a workbook from a file path
pub fn read_workbook<P: AsRef<Path>>(path: P) -> Result<Workbook> {
    let path_ref = path.as_ref();

    let extension = path_ref
        .extension()
        .and_then(|s| s.to_str())
        .map(|s| s.to_ascii_lowercase())
        .unwrap_or_default();

    let sheets = match extension.as_str() {
        "ods" => {
            let file = File::open(path_ref)
                .with_context(|| format!("Failed to open file: {}", path_ref.display()))?;
            read_ods(file)
                .with_context(|| format!("Failed to read ODS file: {}", path_ref.display()))?
        }
        "xlsx" | "xlsm" | "xls" | "xlsb" => ExcelReader::open(path_ref)?.read_sheets()?,
        _ => {
            return Err(anyhow::anyhow!(
                "Unsupported file format: {}",
                path_ref.display()
            ));
        }
    };

    let workbook = Workbook {
        path: path_ref.to_path_buf(),
        sheets,
    };
    debug!(
        path = %path_ref.display(),
        sheets = ?workbook.sheet_names(),
        "workbook loaded"
    );

    Ok(workbook)
}
