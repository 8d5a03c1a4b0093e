//! Grouped aggregations feeding the charts.
//!
//! Every map is keyed by the grouping attributes; groups without rows are
//! simply absent. Date-derived keys are `Option`s so undated rows still
//! land in a (`None`) group and per-group totals add up to the view total.

use std::collections::BTreeMap;

use chrono::NaiveDate;

use super::filter::FilteredView;
use super::model::TransactionRecord;
use super::top::Period;

/// Numeric column to aggregate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Measure {
    TotalSales,
    UnitsSold,
}

impl Measure {
    fn of(self, record: &TransactionRecord) -> f64 {
        match self {
            Measure::TotalSales => record.totalsales,
            Measure::UnitsSold => record.unitsold as f64,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Aggregation {
    Sum,
    Mean,
    Count,
}

/// Group the view by `key` and reduce `measure` per group.
pub fn group<K, F>(
    view: &FilteredView<'_>,
    key: F,
    measure: Measure,
    aggregation: Aggregation,
) -> BTreeMap<K, f64>
where
    K: Ord,
    F: Fn(&TransactionRecord) -> K,
{
    let mut acc: BTreeMap<K, (f64, usize)> = BTreeMap::new();
    for rec in view.iter() {
        let slot = acc.entry(key(rec)).or_insert((0.0, 0));
        slot.0 += measure.of(rec);
        slot.1 += 1;
    }

    acc.into_iter()
        .map(|(k, (sum, n))| {
            let value = match aggregation {
                Aggregation::Sum => sum,
                Aggregation::Mean => sum / n as f64,
                Aggregation::Count => n as f64,
            };
            (k, value)
        })
        .collect()
}

fn sum_sales<K: Ord>(
    view: &FilteredView<'_>,
    key: impl Fn(&TransactionRecord) -> K,
) -> BTreeMap<K, f64> {
    group(view, key, Measure::TotalSales, Aggregation::Sum)
}

/// Daily sales for the trend chart, in date order (undated rows first).
pub fn sales_by_date(view: &FilteredView<'_>) -> BTreeMap<Option<NaiveDate>, f64> {
    sum_sales(view, |r| r.date)
}

/// Sales per payment method.
pub fn sales_by_payment(view: &FilteredView<'_>) -> BTreeMap<String, f64> {
    sum_sales(view, |r| r.paym.clone())
}

/// Sales per payment method, restricted to one calendar month.
pub fn sales_by_payment_in(view: &FilteredView<'_>, period: Period) -> BTreeMap<String, f64> {
    sales_by_payment(&view.narrowed(|r| period.contains(r)))
}

/// Sales per (gender, customer type).
pub fn sales_by_gender_ctype(view: &FilteredView<'_>) -> BTreeMap<(String, String), f64> {
    sum_sales(view, |r| (r.cgender.clone(), r.ctype.clone()))
}

/// Key of the monthly category summary.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MonthKey {
    pub year: Option<i32>,
    pub month: Option<u32>,
    pub category: String,
}

/// Sales per (Year, Month, category).
pub fn monthly_by_category(view: &FilteredView<'_>) -> BTreeMap<MonthKey, f64> {
    sum_sales(view, |r| MonthKey {
        year: r.year,
        month: r.month,
        category: r.category.clone(),
    })
}

// ---------------------------------------------------------------------------
// Category × customer type breakdown
// ---------------------------------------------------------------------------

/// One bar of the breakdown chart.
///
/// `paym`, `discapld` and `saleslevel` are tooltip details taken from the
/// first row of the group in view order; they are not aggregated.
#[derive(Debug, Clone, PartialEq)]
pub struct BreakdownGroup {
    pub total_sales: f64,
    pub units: u64,
    pub rows: usize,
    pub paym: String,
    pub discapld: String,
    pub saleslevel: String,
}

pub fn breakdown_by_category_ctype(
    view: &FilteredView<'_>,
) -> BTreeMap<(String, String), BreakdownGroup> {
    let mut out: BTreeMap<(String, String), BreakdownGroup> = BTreeMap::new();
    for rec in view.iter() {
        let group = out
            .entry((rec.category.clone(), rec.ctype.clone()))
            .or_insert_with(|| BreakdownGroup {
                total_sales: 0.0,
                units: 0,
                rows: 0,
                paym: rec.paym.clone(),
                discapld: rec.discapld.clone(),
                saleslevel: rec.saleslevel.clone(),
            });
        group.total_sales += rec.totalsales;
        group.units += rec.unitsold;
        group.rows += 1;
    }
    out
}

// ---------------------------------------------------------------------------
// Discount × sales distribution
// ---------------------------------------------------------------------------

/// Five-number summary of `totalsales` for one discount flag.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SalesDistribution {
    pub count: usize,
    pub min: f64,
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub max: f64,
}

impl SalesDistribution {
    /// `None` for an empty sample.
    pub fn from_values(mut values: Vec<f64>) -> Option<Self> {
        if values.is_empty() {
            return None;
        }
        values.sort_by(f64::total_cmp);
        Some(SalesDistribution {
            count: values.len(),
            min: values[0],
            q1: quantile(&values, 0.25),
            median: quantile(&values, 0.5),
            q3: quantile(&values, 0.75),
            max: values[values.len() - 1],
        })
    }
}

/// Linear interpolation between closest ranks. `sorted` must be non-empty.
fn quantile(sorted: &[f64], q: f64) -> f64 {
    let pos = q * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    sorted[lo] + (sorted[hi] - sorted[lo]) * (pos - lo as f64)
}

pub fn discount_distribution(view: &FilteredView<'_>) -> BTreeMap<String, SalesDistribution> {
    let mut samples: BTreeMap<String, Vec<f64>> = BTreeMap::new();
    for rec in view.iter() {
        samples
            .entry(rec.discapld.clone())
            .or_default()
            .push(rec.totalsales);
    }
    samples
        .into_iter()
        .filter_map(|(flag, values)| SalesDistribution::from_values(values).map(|d| (flag, d)))
        .collect()
}

/// Entries ordered by value, largest first. Ties keep key order.
pub fn ranked<K: Clone>(map: &BTreeMap<K, f64>) -> Vec<(K, f64)> {
    let mut entries: Vec<(K, f64)> = map.iter().map(|(k, v)| (k.clone(), *v)).collect();
    entries.sort_by(|a, b| b.1.total_cmp(&a.1));
    entries
}
