use super::filter::FilteredView;

/// Headline figures for a filtered view.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Metrics {
    pub transactions: usize,
    pub total_sales: f64,
    /// `None` for an empty view.
    pub avg_sales: Option<f64>,
    pub total_units: u64,
}

/// Sum, mean and count over the view. Total on empty input.
pub fn summarize(view: &FilteredView<'_>) -> Metrics {
    let (total_sales, total_units) = view
        .iter()
        .fold((0.0, 0u64), |(sales, units), r| {
            (sales + r.totalsales, units + r.unitsold)
        });
    let transactions = view.len();
    let avg_sales = (transactions > 0).then(|| total_sales / transactions as f64);

    Metrics {
        transactions,
        total_sales,
        avg_sales,
        total_units,
    }
}

/// Whole-number rendering with thousands separators, e.g. `1,234,568`.
pub fn format_amount(value: f64) -> String {
    let rounded = value.round();
    let digits = format!("{:.0}", rounded.abs());
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    if rounded < 0.0 {
        out.push('-');
    }
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// Like [`format_amount`], with a dash for an undefined value.
pub fn format_optional(value: Option<f64>) -> String {
    value.map_or_else(|| "–".to_string(), format_amount)
}
