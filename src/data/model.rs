use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use chrono::{Datelike, NaiveDate, Weekday};

// ---------------------------------------------------------------------------
// Column names of the source file
// ---------------------------------------------------------------------------

pub const COL_DATE: &str = "date";
pub const COL_CATEGORY: &str = "category";
pub const COL_CTYPE: &str = "ctype";
pub const COL_PAYM: &str = "paym";
pub const COL_DISCAPLD: &str = "discapld";
pub const COL_CGENDER: &str = "cgender";
pub const COL_SALESLEVEL: &str = "saleslevel";
pub const COL_TOTALSALES: &str = "totalsales";
pub const COL_UNITSOLD: &str = "unitsold";

/// Columns every input file must provide.
pub const REQUIRED_COLUMNS: [&str; 9] = [
    COL_DATE,
    COL_CATEGORY,
    COL_CTYPE,
    COL_PAYM,
    COL_DISCAPLD,
    COL_CGENDER,
    COL_SALESLEVEL,
    COL_TOTALSALES,
    COL_UNITSOLD,
];

/// Calendar columns derived from `date` at load time.
pub const DERIVED_COLUMNS: [&str; 3] = ["Year", "Month", "Weekday"];

// ---------------------------------------------------------------------------
// Dimension – the four filterable categorical columns
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Dimension {
    Category,
    CustomerType,
    PaymentMethod,
    DiscountApplied,
}

impl Dimension {
    pub const ALL: [Dimension; 4] = [
        Dimension::Category,
        Dimension::CustomerType,
        Dimension::PaymentMethod,
        Dimension::DiscountApplied,
    ];

    /// Source column backing this dimension.
    pub fn column(self) -> &'static str {
        match self {
            Dimension::Category => COL_CATEGORY,
            Dimension::CustomerType => COL_CTYPE,
            Dimension::PaymentMethod => COL_PAYM,
            Dimension::DiscountApplied => COL_DISCAPLD,
        }
    }

    /// Human readable label for filter widgets.
    pub fn label(self) -> &'static str {
        match self {
            Dimension::Category => "Category",
            Dimension::CustomerType => "Customer Type",
            Dimension::PaymentMethod => "Payment Method",
            Dimension::DiscountApplied => "Discount Applied",
        }
    }

    /// Raw categorical label of `record` along this dimension.
    pub fn value_of(self, record: &TransactionRecord) -> &str {
        match self {
            Dimension::Category => &record.category,
            Dimension::CustomerType => &record.ctype,
            Dimension::PaymentMethod => &record.paym,
            Dimension::DiscountApplied => &record.discapld,
        }
    }
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// ---------------------------------------------------------------------------
// TransactionRecord – one row of the sales file
// ---------------------------------------------------------------------------

/// One retail sale.
///
/// `year`, `month` and `weekday` are derived from `date` once, when the
/// record enters a [`RecordSet`]. They are `None` exactly when `date` is.
#[derive(Debug, Clone, PartialEq)]
pub struct TransactionRecord {
    pub date: Option<NaiveDate>,
    pub category: String,
    pub ctype: String,
    pub paym: String,
    pub discapld: String,
    pub cgender: String,
    pub saleslevel: String,
    pub totalsales: f64,
    pub unitsold: u64,
    /// Values of non-standard columns, aligned with [`RecordSet::extra_columns`].
    pub extra: Vec<String>,
    pub year: Option<i32>,
    pub month: Option<u32>,
    pub weekday: Option<Weekday>,
}

impl TransactionRecord {
    /// Fill the cached calendar features from `date`.
    pub fn with_calendar_features(mut self) -> Self {
        self.year = self.date.map(|d| d.year());
        self.month = self.date.map(|d| d.month());
        self.weekday = self.date.map(|d| d.weekday());
        self
    }

    pub fn weekday_name(&self) -> Option<&'static str> {
        self.weekday.map(weekday_name)
    }
}

/// Full English day name, e.g. `Monday`.
pub fn weekday_name(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "Monday",
        Weekday::Tue => "Tuesday",
        Weekday::Wed => "Wednesday",
        Weekday::Thu => "Thursday",
        Weekday::Fri => "Friday",
        Weekday::Sat => "Saturday",
        Weekday::Sun => "Sunday",
    }
}

// ---------------------------------------------------------------------------
// DateParseWarning – per-row, non-fatal
// ---------------------------------------------------------------------------

/// A `date` cell that could not be parsed. The row is kept with a null date.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateParseWarning {
    /// Zero-based data row (header excluded).
    pub row: usize,
    pub raw: String,
}

impl fmt::Display for DateParseWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "row {}: unparsable date '{}'", self.row, self.raw)
    }
}

// ---------------------------------------------------------------------------
// RecordSet – the complete loaded dataset
// ---------------------------------------------------------------------------

/// The full parsed dataset with pre-computed distinct values per dimension.
///
/// Immutable once built; every pipeline stage borrows it.
#[derive(Debug, Clone)]
pub struct RecordSet {
    pub records: Vec<TransactionRecord>,
    /// Column names in source order (required and extra).
    pub columns: Vec<String>,
    /// Non-standard columns in source order.
    pub extra_columns: Vec<String>,
    /// For each filter dimension the sorted set of observed values.
    pub distinct: BTreeMap<Dimension, BTreeSet<String>>,
    pub date_warnings: Vec<DateParseWarning>,
}

impl RecordSet {
    /// Build a dataset from parsed rows. Calendar features are derived here.
    pub fn new(
        columns: Vec<String>,
        records: Vec<TransactionRecord>,
        date_warnings: Vec<DateParseWarning>,
    ) -> Self {
        let extra_columns = columns
            .iter()
            .filter(|c| !REQUIRED_COLUMNS.contains(&c.as_str()))
            .cloned()
            .collect();

        let records: Vec<TransactionRecord> = records
            .into_iter()
            .map(TransactionRecord::with_calendar_features)
            .collect();

        let mut distinct: BTreeMap<Dimension, BTreeSet<String>> =
            Dimension::ALL.iter().map(|d| (*d, BTreeSet::new())).collect();
        for rec in &records {
            for dim in Dimension::ALL {
                distinct
                    .entry(dim)
                    .or_default()
                    .insert(dim.value_of(rec).to_string());
            }
        }

        RecordSet {
            records,
            columns,
            extra_columns,
            distinct,
            date_warnings,
        }
    }

    /// Dataset with only the standard columns.
    pub fn from_records(records: Vec<TransactionRecord>) -> Self {
        let columns = REQUIRED_COLUMNS.iter().map(|c| c.to_string()).collect();
        Self::new(columns, records, Vec::new())
    }

    /// Observed values for one dimension, sorted.
    pub fn distinct_values(&self, dim: Dimension) -> &BTreeSet<String> {
        // Every dimension is seeded in `new`.
        &self.distinct[&dim]
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the dataset is empty.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;

    pub fn record(
        date: Option<(i32, u32, u32)>,
        category: &str,
        ctype: &str,
        paym: &str,
        discapld: &str,
        totalsales: f64,
        unitsold: u64,
    ) -> TransactionRecord {
        TransactionRecord {
            date: date.and_then(|(y, m, d)| NaiveDate::from_ymd_opt(y, m, d)),
            category: category.to_string(),
            ctype: ctype.to_string(),
            paym: paym.to_string(),
            discapld: discapld.to_string(),
            cgender: "Female".to_string(),
            saleslevel: "Medium".to_string(),
            totalsales,
            unitsold,
            extra: Vec::new(),
            year: None,
            month: None,
            weekday: None,
        }
    }

    /// Small mixed dataset used across the pipeline tests.
    pub fn sample_set() -> RecordSet {
        RecordSet::from_records(vec![
            record(Some((2024, 1, 15)), "Electronics", "Member", "Card", "Yes", 1200.0, 2),
            record(Some((2024, 1, 15)), "Grocery", "Normal", "Cash", "No", 80.5, 5),
            record(Some((2024, 2, 3)), "Electronics", "Normal", "M-Pesa", "No", 450.0, 1),
            record(Some((2024, 2, 20)), "Grocery", "Member", "Card", "Yes", 120.0, 8),
            record(None, "Electronics", "Member", "Cash", "Yes", 300.0, 3),
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::fixtures::*;
    use super::*;

    #[test]
    fn calendar_features_follow_date() {
        let ds = sample_set();
        let first = &ds.records[0];
        assert_eq!(first.year, Some(2024));
        assert_eq!(first.month, Some(1));
        assert_eq!(first.weekday_name(), Some("Monday"));

        let undated = &ds.records[4];
        assert_eq!(undated.year, None);
        assert_eq!(undated.month, None);
        assert_eq!(undated.weekday, None);
    }

    #[test]
    fn distinct_values_are_collected_per_dimension() {
        let ds = sample_set();
        let cats: Vec<&str> = ds
            .distinct_values(Dimension::Category)
            .iter()
            .map(String::as_str)
            .collect();
        assert_eq!(cats, ["Electronics", "Grocery"]);
        assert_eq!(ds.distinct_values(Dimension::PaymentMethod).len(), 3);
    }

    #[test]
    fn empty_dataset_still_has_every_dimension() {
        let ds = RecordSet::from_records(Vec::new());
        assert!(ds.is_empty());
        for dim in Dimension::ALL {
            assert!(ds.distinct_values(dim).is_empty());
        }
    }

    #[test]
    fn extra_columns_keep_source_order() {
        let columns = ["store", "date", "category", "region"]
            .iter()
            .map(|c| c.to_string())
            .collect();
        let ds = RecordSet::new(columns, Vec::new(), Vec::new());
        assert_eq!(ds.extra_columns, ["store", "region"]);
    }
}
