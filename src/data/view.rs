use std::collections::BTreeMap;

use chrono::NaiveDate;

use super::filter::{filter, FilterSelection, FilteredView};
use super::metrics::{summarize, Metrics};
use super::model::RecordSet;
use super::summary::{
    breakdown_by_category_ctype, discount_distribution, monthly_by_category, ranked,
    sales_by_date, sales_by_gender_ctype, sales_by_payment, sales_by_payment_in, BreakdownGroup,
    SalesDistribution,
};
use super::top::{top_categories, LatestPeriodPolicy, TopCategories};

/// Knobs of the pipeline that come from configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ViewSettings {
    pub top_n: usize,
    pub latest_period: LatestPeriodPolicy,
}

impl Default for ViewSettings {
    fn default() -> Self {
        ViewSettings {
            top_n: 3,
            latest_period: LatestPeriodPolicy::default(),
        }
    }
}

/// Everything the dashboard renders for one filter selection.
#[derive(Debug, Clone, PartialEq)]
pub struct ViewModel {
    /// Rows of the filtered view, in source order.
    pub indices: Vec<usize>,
    pub metrics: Metrics,
    /// Daily sales, dated rows only, oldest first.
    pub trend: Vec<(NaiveDate, f64)>,
    pub breakdown: BTreeMap<(String, String), BreakdownGroup>,
    pub payment_share: BTreeMap<String, f64>,
    pub gender_by_ctype: BTreeMap<(String, String), f64>,
    pub discount_distribution: BTreeMap<String, SalesDistribution>,
    pub top: TopCategories,
    /// Payment methods in the latest period, best first.
    pub latest_payment: Vec<(String, f64)>,
}

impl ViewModel {
    /// Rebuild the filtered view this model was computed from.
    pub fn filtered<'a>(&self, dataset: &'a RecordSet) -> FilteredView<'a> {
        FilteredView::new(dataset, self.indices.clone())
    }
}

/// Run the whole pipeline for one selection. Pure: same inputs, same output.
pub fn compute_view(
    dataset: &RecordSet,
    selection: &FilterSelection,
    settings: &ViewSettings,
) -> ViewModel {
    let view = filter(dataset, selection);

    let monthly = monthly_by_category(&view);
    let top = top_categories(&monthly, settings.top_n, settings.latest_period);
    let latest_payment = top
        .period
        .map(|p| ranked(&sales_by_payment_in(&view, p)))
        .unwrap_or_default();

    let trend = sales_by_date(&view)
        .into_iter()
        .filter_map(|(date, sales)| date.map(|d| (d, sales)))
        .collect();

    let model = ViewModel {
        metrics: summarize(&view),
        trend,
        breakdown: breakdown_by_category_ctype(&view),
        payment_share: sales_by_payment(&view),
        gender_by_ctype: sales_by_gender_ctype(&view),
        discount_distribution: discount_distribution(&view),
        top,
        latest_payment,
        indices: view.indices().to_vec(),
    };

    log::debug!(
        "Recomputed view: {} of {} rows, latest period {:?}",
        model.indices.len(),
        dataset.len(),
        model.top.period
    );
    model
}
