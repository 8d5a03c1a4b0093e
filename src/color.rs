use std::collections::{BTreeMap, BTreeSet};

use eframe::egui::Color32;
use palette::{Hsl, IntoColor, Srgb};

use crate::data::model::Dimension;

/// Discount flags keep the same colours in every file.
const DISCOUNT_FLAGS: [(&str, Color32); 2] = [
    ("Yes", Color32::from_rgb(0x00, 0xCC, 0x96)),
    ("No", Color32::from_rgb(0xFF, 0x6F, 0x61)),
];

const CATEGORY_SEQUENCE: [Color32; 10] = [
    Color32::from_rgb(136, 204, 238),
    Color32::from_rgb(204, 102, 119),
    Color32::from_rgb(221, 204, 119),
    Color32::from_rgb(17, 119, 51),
    Color32::from_rgb(51, 34, 136),
    Color32::from_rgb(170, 68, 153),
    Color32::from_rgb(68, 170, 153),
    Color32::from_rgb(153, 153, 51),
    Color32::from_rgb(136, 34, 85),
    Color32::from_rgb(102, 17, 0),
];

const CUSTOMER_TYPE_SEQUENCE: [Color32; 10] = [
    Color32::from_rgb(229, 134, 6),
    Color32::from_rgb(93, 105, 177),
    Color32::from_rgb(82, 188, 163),
    Color32::from_rgb(153, 201, 69),
    Color32::from_rgb(204, 97, 176),
    Color32::from_rgb(36, 121, 108),
    Color32::from_rgb(218, 165, 27),
    Color32::from_rgb(47, 138, 196),
    Color32::from_rgb(118, 78, 159),
    Color32::from_rgb(237, 100, 90),
];

const PAYMENT_SEQUENCE: [Color32; 10] = [
    Color32::from_rgb(127, 60, 141),
    Color32::from_rgb(17, 165, 121),
    Color32::from_rgb(57, 105, 172),
    Color32::from_rgb(242, 183, 1),
    Color32::from_rgb(231, 63, 116),
    Color32::from_rgb(128, 186, 90),
    Color32::from_rgb(230, 131, 16),
    Color32::from_rgb(0, 134, 149),
    Color32::from_rgb(207, 28, 144),
    Color32::from_rgb(249, 123, 114),
];

/// For discount labels other than Yes/No.
const FLAG_SEQUENCE: [Color32; 4] = [
    Color32::from_rgb(102, 197, 204),
    Color32::from_rgb(246, 207, 113),
    Color32::from_rgb(248, 156, 116),
    Color32::from_rgb(220, 176, 242),
];

const UNMAPPED: Color32 = Color32::GRAY;

fn sequence(dim: Dimension) -> &'static [Color32] {
    match dim {
        Dimension::Category => &CATEGORY_SEQUENCE,
        Dimension::CustomerType => &CUSTOMER_TYPE_SEQUENCE,
        Dimension::PaymentMethod => &PAYMENT_SEQUENCE,
        Dimension::DiscountApplied => &FLAG_SEQUENCE,
    }
}

/// Endless golden-angle hues, used once a dimension's sequence runs out.
fn overflow_hues() -> impl Iterator<Item = Color32> {
    (0u32..).map(|i| {
        let hue = (i as f32 * 137.508 + 20.0) % 360.0;
        let rgb: Srgb = Hsl::new(hue, 0.55, 0.5).into_color();
        let (r, g, b) = rgb.into_format::<u8>().into_components();
        Color32::from_rgb(r, g, b)
    })
}

/// Colour of every label observed in one filter dimension.
///
/// Built once per dataset, so a label keeps its colour while filters change.
#[derive(Debug, Clone)]
pub struct LabelColors(BTreeMap<String, Color32>);

impl LabelColors {
    pub fn new(dim: Dimension, labels: &BTreeSet<String>) -> Self {
        let mut mapping = BTreeMap::new();
        if dim == Dimension::DiscountApplied {
            for (flag, color) in DISCOUNT_FLAGS {
                if let Some(label) = labels.iter().find(|l| l.eq_ignore_ascii_case(flag)) {
                    mapping.insert(label.clone(), color);
                }
            }
        }

        let free: Vec<String> = labels
            .iter()
            .filter(|l| !mapping.contains_key(*l))
            .cloned()
            .collect();
        let colors = sequence(dim).iter().copied().chain(overflow_hues());
        mapping.extend(free.into_iter().zip(colors));
        LabelColors(mapping)
    }

    pub fn color_for(&self, label: &str) -> Color32 {
        self.0.get(label).copied().unwrap_or(UNMAPPED)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labels(values: &[&str]) -> BTreeSet<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn discount_flags_are_pinned() {
        let colors = LabelColors::new(Dimension::DiscountApplied, &labels(&["No", "Yes"]));
        assert_eq!(colors.color_for("Yes"), Color32::from_rgb(0x00, 0xCC, 0x96));
        assert_eq!(colors.color_for("No"), Color32::from_rgb(0xFF, 0x6F, 0x61));

        // Case of the source label is kept as the key.
        let lower = LabelColors::new(Dimension::DiscountApplied, &labels(&["yes", "Unknown"]));
        assert_eq!(lower.color_for("yes"), Color32::from_rgb(0x00, 0xCC, 0x96));
        assert_eq!(lower.color_for("Unknown"), FLAG_SEQUENCE[0]);
    }

    #[test]
    fn labels_follow_the_dimension_sequence_in_sorted_order() {
        let colors = LabelColors::new(Dimension::PaymentMethod, &labels(&["M-Pesa", "Cash", "Card"]));
        assert_eq!(colors.color_for("Card"), PAYMENT_SEQUENCE[0]);
        assert_eq!(colors.color_for("Cash"), PAYMENT_SEQUENCE[1]);
        assert_eq!(colors.color_for("M-Pesa"), PAYMENT_SEQUENCE[2]);
        assert_eq!(colors.color_for("Cheque"), UNMAPPED);
    }

    #[test]
    fn long_label_lists_get_distinct_overflow_colours() {
        let names: Vec<String> = (0..14).map(|i| format!("cat-{i:02}")).collect();
        let set: BTreeSet<String> = names.iter().cloned().collect();
        let colors = LabelColors::new(Dimension::Category, &set);

        let assigned: BTreeSet<[u8; 4]> =
            names.iter().map(|n| colors.color_for(n).to_array()).collect();
        assert_eq!(assigned.len(), names.len());
        assert_eq!(colors.color_for("cat-00"), CATEGORY_SEQUENCE[0]);
    }
}
