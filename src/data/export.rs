use std::borrow::Cow;

use chrono::NaiveDate;
use rust_xlsxwriter::{Format, Workbook};
use thiserror::Error;

use super::filter::FilteredView;
use super::model::{
    RecordSet, TransactionRecord, COL_CATEGORY, COL_CGENDER, COL_CTYPE, COL_DATE, COL_DISCAPLD,
    COL_PAYM, COL_SALESLEVEL, COL_TOTALSALES, COL_UNITSOLD, DERIVED_COLUMNS,
};

#[derive(Error, Debug)]
pub enum ExportError {
    #[error("CSV write error: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("XLSX write error: {0}")]
    Xlsx(#[from] rust_xlsxwriter::XlsxError),
}

// ---------------------------------------------------------------------------
// Formats and artifacts
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Csv,
    Xlsx,
}

impl ExportFormat {
    pub fn extension(self) -> &'static str {
        match self {
            ExportFormat::Csv => "csv",
            ExportFormat::Xlsx => "xlsx",
        }
    }

    pub fn mime(self) -> &'static str {
        match self {
            ExportFormat::Csv => "text/csv",
            ExportFormat::Xlsx => {
                "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"
            }
        }
    }
}

/// A ready-to-save export.
#[derive(Debug, Clone)]
pub struct ExportArtifact {
    pub file_name: String,
    pub mime: &'static str,
    pub bytes: Vec<u8>,
}

/// `{prefix}_{YYYY-MM-DD}.{ext}`
pub fn export_file_name(prefix: &str, day: NaiveDate, format: ExportFormat) -> String {
    format!("{prefix}_{}.{}", day.format("%Y-%m-%d"), format.extension())
}

/// Serialize the view and stamp the file name with `day`.
pub fn build_artifact(
    view: &FilteredView<'_>,
    format: ExportFormat,
    prefix: &str,
    sheet_name: &str,
    day: NaiveDate,
) -> Result<ExportArtifact, ExportError> {
    let bytes = match format {
        ExportFormat::Csv => serialize_csv(view)?,
        ExportFormat::Xlsx => serialize_spreadsheet(view, sheet_name)?,
    };
    Ok(ExportArtifact {
        file_name: export_file_name(prefix, day, format),
        mime: format.mime(),
        bytes,
    })
}

// ---------------------------------------------------------------------------
// Column resolution
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy)]
enum Field {
    Date,
    Category,
    CustomerType,
    Payment,
    Discount,
    Gender,
    SalesLevel,
    TotalSales,
    UnitsSold,
    Extra(usize),
    Year,
    Month,
    Weekday,
}

enum Cell<'r> {
    Text(Cow<'r, str>),
    Number(f64),
    Empty,
}

impl Cell<'_> {
    fn into_text(self) -> String {
        match self {
            Cell::Text(s) => s.into_owned(),
            Cell::Number(n) => n.to_string(),
            Cell::Empty => String::new(),
        }
    }
}

/// Source columns in source order, then the derived calendar columns.
fn export_layout(dataset: &RecordSet) -> Vec<(String, Field)> {
    let mut extra_idx = 0;
    let mut layout: Vec<(String, Field)> = dataset
        .columns
        .iter()
        .map(|name| {
            let field = match name.as_str() {
                COL_DATE => Field::Date,
                COL_CATEGORY => Field::Category,
                COL_CTYPE => Field::CustomerType,
                COL_PAYM => Field::Payment,
                COL_DISCAPLD => Field::Discount,
                COL_CGENDER => Field::Gender,
                COL_SALESLEVEL => Field::SalesLevel,
                COL_TOTALSALES => Field::TotalSales,
                COL_UNITSOLD => Field::UnitsSold,
                _ => {
                    extra_idx += 1;
                    Field::Extra(extra_idx - 1)
                }
            };
            (name.clone(), field)
        })
        .collect();

    let derived = [Field::Year, Field::Month, Field::Weekday];
    for (name, field) in DERIVED_COLUMNS.iter().zip(derived) {
        if !dataset.columns.iter().any(|c| c == name) {
            layout.push((name.to_string(), field));
        }
    }
    layout
}

fn text(s: &str) -> Cell<'_> {
    Cell::Text(Cow::Borrowed(s))
}

fn cell(field: Field, rec: &TransactionRecord) -> Cell<'_> {
    match field {
        Field::Date => rec
            .date
            .map_or(Cell::Empty, |d| Cell::Text(Cow::Owned(d.format("%Y-%m-%d").to_string()))),
        Field::Category => text(&rec.category),
        Field::CustomerType => text(&rec.ctype),
        Field::Payment => text(&rec.paym),
        Field::Discount => text(&rec.discapld),
        Field::Gender => text(&rec.cgender),
        Field::SalesLevel => text(&rec.saleslevel),
        Field::TotalSales => Cell::Number(rec.totalsales),
        Field::UnitsSold => Cell::Number(rec.unitsold as f64),
        Field::Extra(i) => rec.extra.get(i).map_or(Cell::Empty, |s| text(s)),
        Field::Year => rec.year.map_or(Cell::Empty, |y| Cell::Number(y as f64)),
        Field::Month => rec.month.map_or(Cell::Empty, |m| Cell::Number(m as f64)),
        Field::Weekday => rec
            .weekday_name()
            .map_or(Cell::Empty, text),
    }
}

// ---------------------------------------------------------------------------
// Serializers
// ---------------------------------------------------------------------------

/// UTF-8 CSV with a header row, rows in view order.
pub fn serialize_csv(view: &FilteredView<'_>) -> Result<Vec<u8>, ExportError> {
    let layout = export_layout(view.dataset());
    let mut writer = csv::Writer::from_writer(Vec::new());

    writer.write_record(layout.iter().map(|(name, _)| name.as_str()))?;
    for rec in view.iter() {
        writer.write_record(layout.iter().map(|(_, field)| cell(*field, rec).into_text()))?;
    }

    writer.into_inner().map_err(|e| ExportError::Io(e.into_error()))
}

/// Single-sheet XLSX workbook with the same rows and columns as the CSV.
/// Built entirely in memory.
pub fn serialize_spreadsheet(
    view: &FilteredView<'_>,
    sheet_name: &str,
) -> Result<Vec<u8>, ExportError> {
    let layout = export_layout(view.dataset());
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    worksheet.set_name(sheet_name)?;

    let header = Format::new().set_bold();
    for (col, (name, _)) in layout.iter().enumerate() {
        worksheet.write_string_with_format(0, col as u16, name.as_str(), &header)?;
    }
    worksheet.set_freeze_panes(1, 0)?;

    for (r, rec) in view.iter().enumerate() {
        let row = (r + 1) as u32;
        for (col, (_, field)) in layout.iter().enumerate() {
            let col = col as u16;
            match cell(*field, rec) {
                Cell::Text(s) => {
                    worksheet.write_string(row, col, &*s)?;
                }
                Cell::Number(n) => {
                    worksheet.write_number(row, col, n)?;
                }
                Cell::Empty => {}
            }
        }
    }

    Ok(workbook.save_to_buffer()?)
}
