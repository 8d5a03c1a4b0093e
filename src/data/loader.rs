use std::collections::HashMap;
use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::SystemTime;

use arrow::array::ArrayRef;
use arrow::compute::cast;
use arrow::datatypes::DataType;
use arrow::error::ArrowError;
use arrow::util::display::{ArrayFormatter, FormatOptions};
use chrono::{Datelike, NaiveDate, NaiveDateTime};
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use parquet::errors::ParquetError;
use thiserror::Error;

use super::model::{
    DateParseWarning, RecordSet, TransactionRecord, COL_CATEGORY, COL_CGENDER, COL_CTYPE,
    COL_DATE, COL_DISCAPLD, COL_PAYM, COL_SALESLEVEL, COL_TOTALSALES, COL_UNITSOLD,
};

#[derive(Error, Debug)]
pub enum LoadError {
    #[error("cannot read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("unsupported file extension: .{0}")]
    UnsupportedExtension(String),
    #[error("failed to parse delimited file: {0}")]
    Csv(#[from] csv::Error),
    #[error("failed to read Parquet file: {0}")]
    Parquet(#[from] ParquetError),
    #[error("failed to decode Arrow data: {0}")]
    Arrow(#[from] ArrowError),
    #[error("file has no header row")]
    NoHeader,
    #[error("missing required column '{0}'")]
    MissingColumn(&'static str),
    #[error("column '{0}' appears more than once")]
    DuplicateColumn(&'static str),
    #[error("row {row}: invalid {column} value '{value}'")]
    InvalidNumber {
        row: usize,
        column: &'static str,
        value: String,
    },
}

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load a sales dataset from a file.  Dispatch by extension.
///
/// Supported formats:
/// * `.csv` / `.txt` – comma separated, header row
/// * `.tsv`          – tab separated, header row
/// * `.parquet`      – one column per field, any scalar Arrow type
///
/// Unparsable dates never fail the load; they are recorded as
/// [`DateParseWarning`]s and the row keeps a null date.
pub fn load_file(path: &Path) -> Result<RecordSet, LoadError> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let dataset = match ext.as_str() {
        "csv" | "txt" => load_delimited(path, b',')?,
        "tsv" => load_delimited(path, b'\t')?,
        "parquet" | "pq" => load_parquet(path)?,
        other => return Err(LoadError::UnsupportedExtension(other.to_string())),
    };

    log::info!(
        "Loaded {} records ({} unparsable dates) from {}",
        dataset.len(),
        dataset.date_warnings.len(),
        path.display()
    );
    Ok(dataset)
}

fn open(path: &Path) -> Result<File, LoadError> {
    File::open(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })
}

// ---------------------------------------------------------------------------
// Session cache
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct FileStamp {
    modified: Option<SystemTime>,
    len: u64,
}

impl FileStamp {
    fn of(path: &Path) -> Result<Self, LoadError> {
        let meta = std::fs::metadata(path).map_err(|source| LoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(FileStamp {
            modified: meta.modified().ok(),
            len: meta.len(),
        })
    }
}

/// Keeps each loaded dataset for the lifetime of the session.
///
/// A path is re-read only when its modification time or length changed
/// since the cached copy was taken.
#[derive(Debug, Default)]
pub struct DatasetCache {
    entries: HashMap<PathBuf, (FileStamp, Arc<RecordSet>)>,
}

impl DatasetCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn load(&mut self, path: &Path) -> Result<Arc<RecordSet>, LoadError> {
        let stamp = FileStamp::of(path)?;
        if let Some((cached_stamp, dataset)) = self.entries.get(path) {
            if *cached_stamp == stamp {
                log::debug!("Reusing cached dataset for {}", path.display());
                return Ok(Arc::clone(dataset));
            }
        }

        let dataset = Arc::new(load_file(path)?);
        self.entries
            .insert(path.to_path_buf(), (stamp, Arc::clone(&dataset)));
        Ok(dataset)
    }
}

// ---------------------------------------------------------------------------
// Column layout shared by every format
// ---------------------------------------------------------------------------

/// Positions of the required columns in the source header.
struct ColumnLayout {
    date: usize,
    category: usize,
    ctype: usize,
    paym: usize,
    discapld: usize,
    cgender: usize,
    saleslevel: usize,
    totalsales: usize,
    unitsold: usize,
    extra: Vec<usize>,
}

impl ColumnLayout {
    fn resolve(headers: &[String]) -> Result<Self, LoadError> {
        if headers.is_empty() || headers.iter().all(|h| h.is_empty()) {
            return Err(LoadError::NoHeader);
        }
        let find = |name: &'static str| -> Result<usize, LoadError> {
            let mut hits = headers
                .iter()
                .enumerate()
                .filter(|(_, h)| *h == name)
                .map(|(i, _)| i);
            let first = hits.next().ok_or(LoadError::MissingColumn(name))?;
            match hits.next() {
                Some(_) => Err(LoadError::DuplicateColumn(name)),
                None => Ok(first),
            }
        };

        let mut layout = ColumnLayout {
            date: find(COL_DATE)?,
            category: find(COL_CATEGORY)?,
            ctype: find(COL_CTYPE)?,
            paym: find(COL_PAYM)?,
            discapld: find(COL_DISCAPLD)?,
            cgender: find(COL_CGENDER)?,
            saleslevel: find(COL_SALESLEVEL)?,
            totalsales: find(COL_TOTALSALES)?,
            unitsold: find(COL_UNITSOLD)?,
            extra: Vec::new(),
        };
        let required = layout.required();
        layout.extra = (0..headers.len())
            .filter(|i| !required.contains(i))
            .collect();
        Ok(layout)
    }

    fn required(&self) -> [usize; 9] {
        [
            self.date,
            self.category,
            self.ctype,
            self.paym,
            self.discapld,
            self.cgender,
            self.saleslevel,
            self.totalsales,
            self.unitsold,
        ]
    }

    /// Turn one row of raw cells into a record.
    fn parse_row<'a>(
        &self,
        row: usize,
        cell: impl Fn(usize) -> &'a str,
        warnings: &mut Vec<DateParseWarning>,
    ) -> Result<TransactionRecord, LoadError> {
        let raw_date = cell(self.date);
        let date = parse_day_first(raw_date);
        if date.is_none() {
            log::warn!("row {row}: unparsable date '{raw_date}', keeping row with null date");
            warnings.push(DateParseWarning {
                row,
                raw: raw_date.to_string(),
            });
        }

        Ok(TransactionRecord {
            date,
            category: cell(self.category).to_string(),
            ctype: cell(self.ctype).to_string(),
            paym: cell(self.paym).to_string(),
            discapld: cell(self.discapld).to_string(),
            cgender: cell(self.cgender).to_string(),
            saleslevel: cell(self.saleslevel).to_string(),
            totalsales: parse_amount(cell(self.totalsales), row)?,
            unitsold: parse_units(cell(self.unitsold), row)?,
            extra: self.extra.iter().map(|&i| cell(i).to_string()).collect(),
            year: None,
            month: None,
            weekday: None,
        })
    }
}

// ---------------------------------------------------------------------------
// Delimited text loader
// ---------------------------------------------------------------------------

/// Layout: header row with at least the nine standard columns, in any order.
/// Other columns are carried through untouched. Short rows read the missing
/// trailing cells as empty.
fn load_delimited(path: &Path, delimiter: u8) -> Result<RecordSet, LoadError> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .trim(csv::Trim::Headers)
        .flexible(true)
        .from_reader(open(path)?);

    let headers: Vec<String> = reader.headers()?.iter().map(|h| h.to_string()).collect();
    let layout = ColumnLayout::resolve(&headers)?;

    let mut records = Vec::new();
    let mut warnings = Vec::new();
    for (row_no, result) in reader.records().enumerate() {
        let row = result?;
        let rec = layout.parse_row(row_no, |i| row.get(i).unwrap_or(""), &mut warnings)?;
        records.push(rec);
    }

    Ok(RecordSet::new(headers, records, warnings))
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Load a Parquet file with the same columns as the delimited layout.
///
/// Every cell goes through Arrow's display formatting first, so string and
/// numeric columns end up on the text path used for CSV. The `date` column
/// is reduced to `Date32` beforehand (see [`calendar_dates`]). Nulls become
/// empty strings.
fn load_parquet(path: &Path) -> Result<RecordSet, LoadError> {
    let builder = ParquetRecordBatchReaderBuilder::try_new(open(path)?)?;
    let headers: Vec<String> = builder
        .schema()
        .fields()
        .iter()
        .map(|f| f.name().clone())
        .collect();
    let layout = ColumnLayout::resolve(&headers)?;
    let reader = builder.build()?;

    let options = FormatOptions::default();
    let mut records = Vec::new();
    let mut warnings = Vec::new();
    let mut row_offset = 0usize;

    for batch_result in reader {
        let batch = batch_result?;
        let cells: Vec<Vec<String>> = batch
            .columns()
            .iter()
            .enumerate()
            .map(|(c, col)| -> Result<Vec<String>, ArrowError> {
                let col = if c == layout.date {
                    calendar_dates(col)?
                } else {
                    displayable(col, &options)?
                };
                let formatter = ArrayFormatter::try_new(col.as_ref(), &options)?;
                Ok((0..col.len())
                    .map(|r| formatter.value(r).to_string())
                    .collect())
            })
            .collect::<Result<_, _>>()?;

        for r in 0..batch.num_rows() {
            let rec = layout.parse_row(
                row_offset + r,
                |c| cells.get(c).and_then(|col| col.get(r)).map_or("", String::as_str),
                &mut warnings,
            )?;
            records.push(rec);
        }
        row_offset += batch.num_rows();
    }

    Ok(RecordSet::new(headers, records, warnings))
}

/// Reduce a timestamp or `Date64` column to `Date32` so each cell renders
/// as a plain `yyyy-mm-dd` date.
///
/// Offset zones (`+03:00`) give the local calendar date. Named zones such as
/// `UTC` or `Africa/Nairobi` need a tz database Arrow is built without here;
/// those fall back to the UTC calendar date.
fn calendar_dates(col: &ArrayRef) -> Result<ArrayRef, ArrowError> {
    match col.data_type() {
        DataType::Timestamp(unit, Some(_)) => cast(col, &DataType::Date32).or_else(|_| {
            let utc = cast(col, &DataType::Timestamp(*unit, None))?;
            cast(&utc, &DataType::Date32)
        }),
        DataType::Timestamp(_, None) | DataType::Date64 => cast(col, &DataType::Date32),
        _ => Ok(Arc::clone(col)),
    }
}

/// Drop a named zone Arrow cannot format, keeping the UTC wall time.
fn displayable(col: &ArrayRef, options: &FormatOptions) -> Result<ArrayRef, ArrowError> {
    match col.data_type() {
        DataType::Timestamp(unit, Some(_))
            if ArrayFormatter::try_new(col.as_ref(), options).is_err() =>
        {
            cast(col, &DataType::Timestamp(*unit, None))
        }
        _ => Ok(Arc::clone(col)),
    }
}

// ---------------------------------------------------------------------------
// Cell coercion
// ---------------------------------------------------------------------------

/// Date-only layouts, day first. ISO is accepted as well.
const DATE_FORMATS: [&str; 6] = [
    "%d/%m/%Y", "%d-%m-%Y", "%d.%m.%Y", "%Y-%m-%d", "%Y/%m/%d", "%d %m %Y",
];

/// Two-digit-year layouts, tried only when the four-digit ones fail.
const SHORT_YEAR_FORMATS: [&str; 3] = ["%d/%m/%y", "%d-%m-%y", "%d.%m.%y"];

const DATETIME_FORMATS: [&str; 8] = [
    "%d/%m/%Y %H:%M:%S",
    "%d/%m/%Y %H:%M",
    "%d-%m-%Y %H:%M:%S",
    "%d-%m-%Y %H:%M",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
];

/// Parse a date using the day-first convention. `None` when nothing fits.
pub fn parse_day_first(raw: &str) -> Option<NaiveDate> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }

    // `%Y` happily reads "24" as year 24, leave those to the short formats.
    let full_year = DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok())
        .or_else(|| {
            DATETIME_FORMATS
                .iter()
                .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
                .map(|dt| dt.date())
        })
        .filter(|d| d.year() >= 100);

    full_year.or_else(|| {
        SHORT_YEAR_FORMATS
            .iter()
            .find_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok())
    })
}

fn parse_amount(raw: &str, row: usize) -> Result<f64, LoadError> {
    raw.trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| LoadError::InvalidNumber {
            row,
            column: COL_TOTALSALES,
            value: raw.to_string(),
        })
}

fn parse_units(raw: &str, row: usize) -> Result<u64, LoadError> {
    let s = raw.trim();
    s.parse::<u64>()
        .ok()
        .or_else(|| {
            // Float-typed exports write whole numbers as "3.0".
            s.parse::<f64>()
                .ok()
                .filter(|v| *v >= 0.0 && v.fract() == 0.0 && *v <= u64::MAX as f64)
                .map(|v| v as u64)
        })
        .ok_or_else(|| LoadError::InvalidNumber {
            row,
            column: COL_UNITSOLD,
            value: raw.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    const SAMPLE: &str = "\
date,category,ctype,paym,discapld,cgender,saleslevel,totalsales,unitsold
15/01/2024,Electronics,Member,Card,Yes,Female,High,1200.50,2
16/01/2024,Grocery,Normal,Cash,No,Male,Low,80,5
03/02/2024,Electronics,Normal,M-Pesa,No,Female,Medium,450,1
31-31-2024,Grocery,Member,Card,Yes,Male,Low,120,8
20/02/2024,Electronics,Member,Cash,Yes,Male,High,300.25,3
";

    fn write_temp(suffix: &str, content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new()
            .suffix(suffix)
            .tempfile()
            .unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file.flush().unwrap();
        file
    }

    #[test]
    fn day_first_formats() {
        let jan_15 = NaiveDate::from_ymd_opt(2024, 1, 15);
        assert_eq!(parse_day_first("15/01/2024"), jan_15);
        assert_eq!(parse_day_first("15-01-2024"), jan_15);
        assert_eq!(parse_day_first("15.01.2024"), jan_15);
        assert_eq!(parse_day_first("2024-01-15"), jan_15);
        assert_eq!(parse_day_first("15/01/24"), jan_15);
        assert_eq!(parse_day_first(" 15/01/2024 09:30 "), jan_15);
        assert_eq!(parse_day_first("05/03/2024"), NaiveDate::from_ymd_opt(2024, 3, 5));
    }

    #[test]
    fn unparsable_dates_are_none() {
        assert_eq!(parse_day_first("31-31-2024"), None);
        assert_eq!(parse_day_first("12/31/2024"), None);
        assert_eq!(parse_day_first("yesterday"), None);
        assert_eq!(parse_day_first(""), None);
    }

    #[test]
    fn loads_csv_and_keeps_bad_date_rows() {
        let file = write_temp(".csv", SAMPLE);
        let ds = load_file(file.path()).unwrap();

        assert_eq!(ds.len(), 5);
        assert_eq!(ds.date_warnings.len(), 1);
        assert_eq!(ds.date_warnings[0].row, 3);
        assert_eq!(ds.date_warnings[0].raw, "31-31-2024");

        let bad = &ds.records[3];
        assert_eq!(bad.date, None);
        assert_eq!((bad.year, bad.month, bad.weekday), (None, None, None));
        assert_eq!(bad.totalsales, 120.0);

        let first = &ds.records[0];
        assert_eq!(first.year, Some(2024));
        assert_eq!(first.month, Some(1));
        assert_eq!(first.weekday_name(), Some("Monday"));
        assert_eq!(first.totalsales, 1200.5);
        assert_eq!(first.unitsold, 2);

        let last = &ds.records[4];
        assert_eq!(last.month, Some(2));
        assert_eq!(last.weekday_name(), Some("Tuesday"));
    }

    #[test]
    fn extra_columns_are_carried() {
        let content = "\
store,date,category,ctype,paym,discapld,cgender,saleslevel,totalsales,unitsold
Nairobi,15/01/2024,Electronics,Member,Card,Yes,Female,High,10,1
";
        let file = write_temp(".csv", content);
        let ds = load_file(file.path()).unwrap();
        assert_eq!(ds.extra_columns, ["store"]);
        assert_eq!(ds.records[0].extra, ["Nairobi"]);
        assert_eq!(ds.columns[0], "store");
    }

    #[test]
    fn tab_separated_files_load() {
        let content = SAMPLE.replace(',', "\t");
        let file = write_temp(".tsv", &content);
        let ds = load_file(file.path()).unwrap();
        assert_eq!(ds.len(), 5);
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let err = load_file(Path::new("/definitely/not/here.csv")).unwrap_err();
        assert!(matches!(err, LoadError::Io { .. }));
    }

    #[test]
    fn missing_column_is_reported() {
        let file = write_temp(".csv", "date,category\n15/01/2024,Grocery\n");
        let err = load_file(file.path()).unwrap_err();
        assert!(matches!(err, LoadError::MissingColumn("ctype")));
    }

    #[test]
    fn empty_file_has_no_header() {
        let file = write_temp(".csv", "");
        let err = load_file(file.path()).unwrap_err();
        assert!(matches!(err, LoadError::NoHeader));
    }

    #[test]
    fn malformed_amount_fails_loudly() {
        let content = SAMPLE.replace("1200.50", "lots");
        let file = write_temp(".csv", &content);
        let err = load_file(file.path()).unwrap_err();
        match err {
            LoadError::InvalidNumber { row, column, value } => {
                assert_eq!(row, 0);
                assert_eq!(column, COL_TOTALSALES);
                assert_eq!(value, "lots");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn whole_float_units_are_accepted() {
        assert_eq!(parse_units("3.0", 0).unwrap(), 3);
        assert!(parse_units("2.5", 0).is_err());
        assert!(parse_units("-1", 0).is_err());
    }

    #[test]
    fn unsupported_extension() {
        let err = load_file(Path::new("sales.xls")).unwrap_err();
        assert!(matches!(err, LoadError::UnsupportedExtension(ext) if ext == "xls"));
    }

    #[test]
    fn loads_parquet_with_typed_columns() {
        use arrow::array::{Float64Array, Int64Array, StringArray};
        use arrow::datatypes::{DataType, Field, Schema};
        use arrow::record_batch::RecordBatch;
        use parquet::arrow::ArrowWriter;

        let utf8 = |name: &str| Field::new(name, DataType::Utf8, true);
        let schema = Arc::new(Schema::new(vec![
            utf8("date"),
            utf8("category"),
            utf8("ctype"),
            utf8("paym"),
            utf8("discapld"),
            utf8("cgender"),
            utf8("saleslevel"),
            Field::new("totalsales", DataType::Float64, false),
            Field::new("unitsold", DataType::Int64, false),
        ]));
        let strings = |values: [&str; 2]| StringArray::from(values.to_vec());
        let batch = RecordBatch::try_new(
            schema.clone(),
            vec![
                Arc::new(StringArray::from(vec![Some("15/01/2024"), None])),
                Arc::new(strings(["Electronics", "Grocery"])),
                Arc::new(strings(["Member", "Normal"])),
                Arc::new(strings(["Card", "Cash"])),
                Arc::new(strings(["Yes", "No"])),
                Arc::new(strings(["Female", "Male"])),
                Arc::new(strings(["High", "Low"])),
                Arc::new(Float64Array::from(vec![1200.5, 80.0])),
                Arc::new(Int64Array::from(vec![2, 5])),
            ],
        )
        .unwrap();

        let file = tempfile::Builder::new()
            .suffix(".parquet")
            .tempfile()
            .unwrap();
        let mut writer = ArrowWriter::try_new(file.reopen().unwrap(), schema, None).unwrap();
        writer.write(&batch).unwrap();
        writer.close().unwrap();

        let ds = load_file(file.path()).unwrap();
        assert_eq!(ds.len(), 2);
        assert_eq!(ds.records[0].date, NaiveDate::from_ymd_opt(2024, 1, 15));
        assert_eq!(ds.records[0].totalsales, 1200.5);
        assert_eq!(ds.records[1].unitsold, 5);
        assert_eq!(ds.records[1].category, "Grocery");
        // Null date cell: kept, flagged.
        assert_eq!(ds.records[1].date, None);
        assert_eq!(ds.date_warnings.len(), 1);
    }

    /// One-row Parquet file whose `date` column is `date`.
    fn parquet_with_date(date: ArrayRef) -> tempfile::NamedTempFile {
        use arrow::array::{Float64Array, Int64Array, StringArray};
        use arrow::datatypes::{Field, Schema};
        use arrow::record_batch::RecordBatch;
        use parquet::arrow::ArrowWriter;

        let mut fields = vec![Field::new("date", date.data_type().clone(), true)];
        let mut columns = vec![date];
        for (name, value) in [
            ("category", "Electronics"),
            ("ctype", "Member"),
            ("paym", "Card"),
            ("discapld", "Yes"),
            ("cgender", "Female"),
            ("saleslevel", "High"),
        ] {
            fields.push(Field::new(name, DataType::Utf8, false));
            columns.push(Arc::new(StringArray::from(vec![value])));
        }
        fields.push(Field::new("totalsales", DataType::Float64, false));
        columns.push(Arc::new(Float64Array::from(vec![99.5])));
        fields.push(Field::new("unitsold", DataType::Int64, false));
        columns.push(Arc::new(Int64Array::from(vec![1])));

        let schema = Arc::new(Schema::new(fields));
        let batch = RecordBatch::try_new(schema.clone(), columns).unwrap();
        let file = tempfile::Builder::new()
            .suffix(".parquet")
            .tempfile()
            .unwrap();
        let mut writer = ArrowWriter::try_new(file.reopen().unwrap(), schema, None).unwrap();
        writer.write(&batch).unwrap();
        writer.close().unwrap();
        file
    }

    #[test]
    fn parquet_timestamp_dates_become_calendar_dates() {
        use arrow::array::{Date64Array, TimestampNanosecondArray};

        // 2024-01-15T10:30:00Z
        let secs: i64 = 1_705_314_600;
        let nanos = secs * 1_000_000_000;
        let jan_15 = NaiveDate::from_ymd_opt(2024, 1, 15);

        let naive: ArrayRef = Arc::new(TimestampNanosecondArray::from(vec![nanos]));
        let offset: ArrayRef =
            Arc::new(TimestampNanosecondArray::from(vec![nanos]).with_timezone("+00:00"));
        let named: ArrayRef =
            Arc::new(TimestampNanosecondArray::from(vec![nanos]).with_timezone("UTC"));
        let date64: ArrayRef = Arc::new(Date64Array::from(vec![secs * 1_000]));
        let cases = [
            ("naive", naive),
            ("offset", offset),
            ("named zone", named),
            ("date64", date64),
        ];

        for (label, dates) in cases {
            let file = parquet_with_date(dates);
            let ds = load_file(file.path()).unwrap_or_else(|e| panic!("{label}: {e}"));
            assert_eq!(ds.records[0].date, jan_15, "{label}");
            assert!(ds.date_warnings.is_empty(), "{label}");
            assert_eq!(ds.records[0].weekday_name(), Some("Monday"), "{label}");
        }
    }

    #[test]
    fn parquet_offset_zone_uses_local_calendar_date() {
        use arrow::array::TimestampNanosecondArray;

        // 2024-01-15T22:00:00Z is already the 16th in Nairobi.
        let nanos: i64 = 1_705_356_000 * 1_000_000_000;
        let dates = TimestampNanosecondArray::from(vec![nanos]).with_timezone("+03:00");
        let file = parquet_with_date(Arc::new(dates));
        let ds = load_file(file.path()).unwrap();
        assert_eq!(ds.records[0].date, NaiveDate::from_ymd_opt(2024, 1, 16));
    }

    #[test]
    fn duplicate_required_column_is_rejected() {
        let content = "\
date,category,ctype,paym,discapld,cgender,saleslevel,totalsales,unitsold,category,store
15/01/2024,Electronics,Member,Card,Yes,Female,High,10,1,DUP,Nairobi
";
        let file = write_temp(".csv", content);
        let err = load_file(file.path()).unwrap_err();
        assert!(matches!(err, LoadError::DuplicateColumn("category")));
    }

    #[test]
    fn short_rows_read_missing_cells_as_empty() {
        let content = "\
date,category,ctype,paym,discapld,cgender,saleslevel,totalsales,unitsold,store
15/01/2024,Electronics,Member,Card,Yes,Female,High,10,1,Nairobi
16/01/2024,Grocery,Normal,Cash,No,Male,Low,20,2
";
        let file = write_temp(".csv", content);
        let ds = load_file(file.path()).unwrap();
        assert_eq!(ds.len(), 2);
        assert_eq!(ds.records[0].extra, ["Nairobi"]);
        assert_eq!(ds.records[1].extra, [""]);
        assert_eq!(ds.records[1].totalsales, 20.0);
    }

    #[test]
    fn cache_reuses_until_file_changes() {
        let mut file = write_temp(".csv", SAMPLE);
        let mut cache = DatasetCache::new();

        let first = cache.load(file.path()).unwrap();
        let second = cache.load(file.path()).unwrap();
        assert!(Arc::ptr_eq(&first, &second));

        file.write_all(b"21/02/2024,Grocery,Normal,Cash,No,Female,Low,10,1\n")
            .unwrap();
        file.flush().unwrap();

        let third = cache.load(file.path()).unwrap();
        assert!(!Arc::ptr_eq(&first, &third));
        assert_eq!(third.len(), 6);
    }
}
