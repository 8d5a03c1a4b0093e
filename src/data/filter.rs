use std::collections::{BTreeMap, BTreeSet};

use super::model::{Dimension, RecordSet, TransactionRecord};

// ---------------------------------------------------------------------------
// Filter selection: which values are permitted per dimension
// ---------------------------------------------------------------------------

/// Per-dimension selection state: dimension → set of permitted values.
///
/// All four dimensions are always present. An empty set admits nothing;
/// it is never read as "no filter".
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterSelection {
    sets: BTreeMap<Dimension, BTreeSet<String>>,
}

impl Default for FilterSelection {
    fn default() -> Self {
        Self::none()
    }
}

impl FilterSelection {
    /// Every dimension selects nothing.
    pub fn none() -> Self {
        FilterSelection {
            sets: Dimension::ALL
                .iter()
                .map(|d| (*d, BTreeSet::new()))
                .collect(),
        }
    }

    /// Every observed value selected (i.e., show everything).
    pub fn all(dataset: &RecordSet) -> Self {
        FilterSelection {
            sets: Dimension::ALL
                .iter()
                .map(|d| (*d, dataset.distinct_values(*d).clone()))
                .collect(),
        }
    }

    pub fn get(&self, dim: Dimension) -> &BTreeSet<String> {
        &self.sets[&dim]
    }

    /// Replace the permitted values of one dimension.
    pub fn set<I, S>(&mut self, dim: Dimension, values: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.sets
            .insert(dim, values.into_iter().map(Into::into).collect());
    }

    pub fn contains(&self, dim: Dimension, value: &str) -> bool {
        self.get(dim).contains(value)
    }

    /// Toggle a single value in a dimension's selection.
    pub fn toggle(&mut self, dim: Dimension, value: &str) {
        let selected = self.sets.entry(dim).or_default();
        if !selected.remove(value) {
            selected.insert(value.to_string());
        }
    }

    /// Select all observed values of one dimension.
    pub fn select_all(&mut self, dim: Dimension, dataset: &RecordSet) {
        self.sets.insert(dim, dataset.distinct_values(dim).clone());
    }

    /// Deselect all values of one dimension.
    pub fn select_none(&mut self, dim: Dimension) {
        self.sets.insert(dim, BTreeSet::new());
    }

    /// Whether `record` passes every dimension. Exact string match only.
    pub fn admits(&self, record: &TransactionRecord) -> bool {
        Dimension::ALL
            .iter()
            .all(|dim| self.contains(*dim, dim.value_of(record)))
    }
}

// ---------------------------------------------------------------------------
// Filtered view
// ---------------------------------------------------------------------------

/// A subset of a [`RecordSet`], held as row indices in source order.
///
/// Borrowing keeps the source immutable; each filter change builds a new
/// view.
#[derive(Debug, Clone)]
pub struct FilteredView<'a> {
    dataset: &'a RecordSet,
    indices: Vec<usize>,
}

impl<'a> FilteredView<'a> {
    /// View over the given rows. Indices must be in bounds.
    pub fn new(dataset: &'a RecordSet, indices: Vec<usize>) -> Self {
        debug_assert!(indices.iter().all(|&i| i < dataset.len()));
        FilteredView { dataset, indices }
    }

    /// View over every row.
    pub fn full(dataset: &'a RecordSet) -> Self {
        Self::new(dataset, (0..dataset.len()).collect())
    }

    pub fn dataset(&self) -> &'a RecordSet {
        self.dataset
    }

    pub fn indices(&self) -> &[usize] {
        &self.indices
    }

    pub fn iter(&self) -> impl Iterator<Item = &'a TransactionRecord> + '_ {
        let records = &self.dataset.records;
        self.indices.iter().map(move |&i| &records[i])
    }

    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// Sub-view keeping only the rows that satisfy `keep`, in view order.
    pub fn narrowed(&self, keep: impl Fn(&TransactionRecord) -> bool) -> FilteredView<'a> {
        let records = &self.dataset.records;
        let indices = self
            .indices
            .iter()
            .copied()
            .filter(|&i| keep(&records[i]))
            .collect();
        FilteredView::new(self.dataset, indices)
    }
}

/// Return indices of records that pass all four dimensions.
///
/// A record passes a dimension when:
/// * The selection for that dimension is empty → nothing selected → fails
/// * Every observed value is selected → passes (no effective constraint)
/// * The record's value is in the selected set → passes
pub fn filtered_indices(dataset: &RecordSet, selection: &FilterSelection) -> Vec<usize> {
    if Dimension::ALL.iter().any(|d| selection.get(*d).is_empty()) {
        return Vec::new();
    }

    // Dimensions where everything observed is selected can be skipped.
    let active: Vec<Dimension> = Dimension::ALL
        .iter()
        .copied()
        .filter(|d| !selection.get(*d).is_superset(dataset.distinct_values(*d)))
        .collect();

    dataset
        .records
        .iter()
        .enumerate()
        .filter(|(_, rec)| {
            active
                .iter()
                .all(|dim| selection.contains(*dim, dim.value_of(rec)))
        })
        .map(|(i, _)| i)
        .collect()
}

/// Apply `selection` to `dataset`.
pub fn filter<'a>(dataset: &'a RecordSet, selection: &FilterSelection) -> FilteredView<'a> {
    FilteredView::new(dataset, filtered_indices(dataset, selection))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::fixtures::sample_set;

    #[test]
    fn all_observed_values_keep_every_row() {
        let ds = sample_set();
        let view = filter(&ds, &FilterSelection::all(&ds));
        assert_eq!(view.indices(), [0, 1, 2, 3, 4]);
    }

    #[test]
    fn any_empty_dimension_yields_nothing() {
        let ds = sample_set();
        for dim in Dimension::ALL {
            let mut sel = FilterSelection::all(&ds);
            sel.select_none(dim);
            assert!(filter(&ds, &sel).is_empty(), "{dim} empty should hide all");
        }
    }

    #[test]
    fn category_selection_is_exact() {
        let ds = sample_set();
        let mut sel = FilterSelection::all(&ds);
        sel.set(Dimension::Category, ["Electronics"]);
        let view = filter(&ds, &sel);
        assert_eq!(view.indices(), [0, 2, 4]);
        assert!(view.iter().all(|r| r.category == "Electronics"));

        sel.set(Dimension::Category, ["electronics"]);
        assert!(filter(&ds, &sel).is_empty());
    }

    #[test]
    fn dimensions_combine_with_and() {
        let ds = sample_set();
        let mut sel = FilterSelection::all(&ds);
        sel.set(Dimension::Category, ["Electronics"]);
        sel.set(Dimension::PaymentMethod, ["Cash", "Card"]);
        sel.set(Dimension::DiscountApplied, ["Yes"]);
        let view = filter(&ds, &sel);
        assert_eq!(view.indices(), [0, 4]);
    }

    #[test]
    fn unknown_values_do_not_widen_the_selection() {
        let ds = sample_set();
        let mut sel = FilterSelection::all(&ds);
        sel.set(Dimension::CustomerType, ["Member", "Guest"]);
        let view = filter(&ds, &sel);
        assert!(view.iter().all(|r| r.ctype == "Member"));
        assert_eq!(view.len(), 3);
    }

    #[test]
    fn toggle_adds_and_removes() {
        let ds = sample_set();
        let mut sel = FilterSelection::all(&ds);
        sel.toggle(Dimension::Category, "Grocery");
        assert!(!sel.contains(Dimension::Category, "Grocery"));
        sel.toggle(Dimension::Category, "Grocery");
        assert!(sel.contains(Dimension::Category, "Grocery"));
        sel.select_none(Dimension::Category);
        sel.select_all(Dimension::Category, &ds);
        assert_eq!(sel, FilterSelection::all(&ds));
    }

    #[test]
    fn filtering_leaves_source_untouched() {
        let ds = sample_set();
        let before = ds.records.clone();
        let mut sel = FilterSelection::all(&ds);
        sel.set(Dimension::Category, ["Grocery"]);
        let _ = filter(&ds, &sel);
        assert_eq!(ds.records, before);
    }

    #[test]
    fn narrowing_keeps_view_order_and_source_rows() {
        let ds = sample_set();
        let mut sel = FilterSelection::all(&ds);
        sel.set(Dimension::DiscountApplied, ["Yes"]);
        let view = filter(&ds, &sel);
        assert_eq!(view.indices(), [0, 3, 4]);

        let undated = view.narrowed(|r| r.date.is_none());
        assert_eq!(undated.indices(), [4]);
        assert!(view.narrowed(|r| r.totalsales > 5000.0).is_empty());
    }

    #[test]
    fn admits_matches_filtered_indices() {
        let ds = sample_set();
        let mut sel = FilterSelection::all(&ds);
        sel.set(Dimension::CustomerType, ["Normal"]);
        let expected: Vec<usize> = ds
            .records
            .iter()
            .enumerate()
            .filter(|(_, r)| sel.admits(r))
            .map(|(i, _)| i)
            .collect();
        assert_eq!(filtered_indices(&ds, &sel), expected);
    }
}
