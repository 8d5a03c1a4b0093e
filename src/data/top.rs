use std::collections::BTreeMap;
use std::fmt;

use serde::Deserialize;

use super::model::TransactionRecord;
use super::summary::MonthKey;

/// A calendar month.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Period {
    pub year: i32,
    pub month: u32,
}

impl Period {
    pub fn contains(&self, record: &TransactionRecord) -> bool {
        record.year == Some(self.year) && record.month == Some(self.month)
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.month, self.year)
    }
}

/// How the "latest" month of a view is determined.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LatestPeriodPolicy {
    /// Month of the most recent dated row.
    #[default]
    MaxDate,
    /// Greatest year and greatest month, each taken over the whole view.
    /// On sparse data the pair may not occur in any row.
    IndependentMaxima,
}

/// Latest period present in a monthly summary, `None` if nothing is dated.
pub fn latest_period(
    monthly: &BTreeMap<MonthKey, f64>,
    policy: LatestPeriodPolicy,
) -> Option<Period> {
    match policy {
        LatestPeriodPolicy::MaxDate => monthly
            .keys()
            .filter_map(|k| {
                Some(Period {
                    year: k.year?,
                    month: k.month?,
                })
            })
            .max(),
        LatestPeriodPolicy::IndependentMaxima => {
            let year = monthly.keys().filter_map(|k| k.year).max()?;
            let month = monthly.keys().filter_map(|k| k.month).max()?;
            Some(Period { year, month })
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CategoryTotal {
    pub category: String,
    pub total_sales: f64,
}

/// Best selling categories of the latest period.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TopCategories {
    pub period: Option<Period>,
    /// At most `n` entries, best first.
    pub entries: Vec<CategoryTotal>,
}

/// Rank categories of the latest period by sales and keep the first `n`.
///
/// Fewer than `n` categories (or none at all) is not an error. Equal totals
/// keep alphabetical order.
pub fn top_categories(
    monthly: &BTreeMap<MonthKey, f64>,
    n: usize,
    policy: LatestPeriodPolicy,
) -> TopCategories {
    let Some(period) = latest_period(monthly, policy) else {
        return TopCategories::default();
    };

    let mut entries: Vec<CategoryTotal> = monthly
        .iter()
        .filter(|(k, _)| k.year == Some(period.year) && k.month == Some(period.month))
        .map(|(k, v)| CategoryTotal {
            category: k.category.clone(),
            total_sales: *v,
        })
        .collect();
    entries.sort_by(|a, b| b.total_sales.total_cmp(&a.total_sales));
    entries.truncate(n);

    TopCategories {
        period: Some(period),
        entries,
    }
}
