use std::collections::{BTreeMap, BTreeSet};
use std::f64::consts::TAU;

use chrono::{Datelike, NaiveDate};
use eframe::egui::{Color32, RichText, Stroke, Ui};
use egui_extras::{Column, TableBuilder};
use egui_plot::{
    Bar, BarChart, BoxElem, BoxPlot, BoxSpread, Legend, Line, Plot, PlotPoints, Points, Polygon,
};

use crate::color::LabelColors;
use crate::data::metrics::{format_amount, format_optional, Metrics};
use crate::data::model::Dimension;
use crate::data::summary::SalesDistribution;
use crate::data::top::CategoryTotal;
use crate::data::view::ViewModel;
use crate::state::AppState;

const CHART_HEIGHT: f32 = 280.0;
const TREND_COLOR: Color32 = Color32::from_rgb(0x2E, 0x86, 0xDE);
const SALES_AXIS: &str = "Total Sales (KSh)";

// ---------------------------------------------------------------------------
// Dashboard (central panel)
// ---------------------------------------------------------------------------

/// Render every metric and chart of the current view.
pub fn dashboard(ui: &mut Ui, state: &AppState) {
    let Some(vm) = &state.view else {
        ui.centered_and_justified(|ui: &mut Ui| {
            match &state.load_error {
                Some(err) => ui.heading(
                    RichText::new(format!("Could not load the sales dataset.\n\n{err}"))
                        .color(Color32::RED),
                ),
                None => ui.heading("Open a sales file to begin  (File → Open…)"),
            };
        });
        return;
    };
    let colors = |dim: Dimension| state.label_colors.get(&dim);

    ui.heading("📊 NeluxTech Sales Dashboard");
    if vm.indices.is_empty() {
        ui.label(RichText::new("No transactions match the current filters.").italics());
    }
    ui.add_space(8.0);
    metrics_row(ui, &vm.metrics);
    ui.separator();

    trend_chart(ui, &vm.trend);
    ui.separator();

    breakdown_chart(ui, vm, colors(Dimension::CustomerType));
    ui.separator();

    payment_donut(ui, &vm.payment_share, colors(Dimension::PaymentMethod));
    ui.separator();

    ui.columns(2, |cols: &mut [Ui]| {
        gender_chart(&mut cols[0], vm, colors(Dimension::CustomerType));
        discount_box_plot(
            &mut cols[1],
            &vm.discount_distribution,
            colors(Dimension::DiscountApplied),
        );
    });
    ui.separator();

    monthly_highlights(ui, vm, state.config.top_n, colors(Dimension::PaymentMethod));
}

// ---------------------------------------------------------------------------
// Key metrics
// ---------------------------------------------------------------------------

fn metrics_row(ui: &mut Ui, metrics: &Metrics) {
    ui.columns(3, |cols: &mut [Ui]| {
        metric(&mut cols[0], "💰 Total Sales (KSh)", format_amount(metrics.total_sales));
        metric(
            &mut cols[1],
            "📈 Avg Sale per Transaction",
            format_optional(metrics.avg_sales),
        );
        metric(
            &mut cols[2],
            "🧾 Units Sold",
            format_amount(metrics.total_units as f64),
        );
    });
}

fn metric(ui: &mut Ui, label: &str, value: String) {
    ui.vertical(|ui: &mut Ui| {
        ui.label(label);
        ui.label(RichText::new(value).size(28.0).strong());
    });
}

// ---------------------------------------------------------------------------
// Sales trend
// ---------------------------------------------------------------------------

fn date_label(value: f64) -> String {
    NaiveDate::from_num_days_from_ce_opt(value.round() as i32)
        .map(|d| d.format("%Y-%m-%d").to_string())
        .unwrap_or_default()
}

fn trend_chart(ui: &mut Ui, trend: &[(NaiveDate, f64)]) {
    ui.heading("📅 Daily Sales Trend");

    let points: Vec<[f64; 2]> = trend
        .iter()
        .map(|(d, v)| [d.num_days_from_ce() as f64, *v])
        .collect();
    let line = Line::new(PlotPoints::from(points.clone()))
        .color(TREND_COLOR)
        .width(2.0)
        .name("totalsales");
    let markers = Points::new(PlotPoints::from(points))
        .color(TREND_COLOR)
        .radius(3.0);

    Plot::new("sales_trend")
        .height(CHART_HEIGHT)
        .x_axis_label("Date")
        .y_axis_label(SALES_AXIS)
        .x_axis_formatter(|mark, _range| date_label(mark.value))
        .label_formatter(|_name, point| {
            format!("{}\n{}", date_label(point.x), format_amount(point.y))
        })
        .show(ui, |plot_ui| {
            plot_ui.line(line);
            plot_ui.points(markers);
        });
}

// ---------------------------------------------------------------------------
// Grouped bars
// ---------------------------------------------------------------------------

/// One bar of a grouped chart: x group, colour series, height, hover text.
struct GroupedEntry {
    group: String,
    series: String,
    value: f64,
    hover: String,
}

/// Label for integer x positions, blank in between.
fn category_label(groups: &[String], value: f64) -> String {
    let idx = value.round();
    if (value - idx).abs() > 1e-6 || idx < 0.0 {
        return String::new();
    }
    groups.get(idx as usize).cloned().unwrap_or_default()
}

fn grouped_bars(
    ui: &mut Ui,
    id: &str,
    x_label: &str,
    entries: &[GroupedEntry],
    colors: Option<&LabelColors>,
) {
    let groups: Vec<String> = entries
        .iter()
        .map(|e| e.group.clone())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();
    let series: Vec<String> = entries
        .iter()
        .map(|e| e.series.clone())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();

    let slot = 0.8 / series.len().max(1) as f64;
    let centre = (series.len() as f64 - 1.0) / 2.0;
    let charts: Vec<BarChart> = series
        .iter()
        .enumerate()
        .map(|(si, name)| {
            let color = colors.map_or(Color32::LIGHT_BLUE, |cm| cm.color_for(name));
            let offset = (si as f64 - centre) * slot;
            let bars = entries
                .iter()
                .filter(|e| &e.series == name)
                .filter_map(|e| {
                    let gi = groups.iter().position(|g| *g == e.group)?;
                    Some(
                        Bar::new(gi as f64 + offset, e.value)
                            .width(slot * 0.95)
                            .name(&e.hover)
                            .fill(color),
                    )
                })
                .collect();
            BarChart::new(bars).name(name).color(color)
        })
        .collect();

    Plot::new(id)
        .height(CHART_HEIGHT)
        .legend(Legend::default())
        .x_axis_label(x_label)
        .y_axis_label(SALES_AXIS)
        .x_axis_formatter(move |mark, _range| category_label(&groups, mark.value))
        .show(ui, |plot_ui| {
            for chart in charts {
                plot_ui.bar_chart(chart);
            }
        });
}

fn breakdown_chart(ui: &mut Ui, vm: &ViewModel, colors: Option<&LabelColors>) {
    ui.heading("🧭 Sales Breakdown by Category & Customer Type");
    let entries: Vec<GroupedEntry> = vm
        .breakdown
        .iter()
        .map(|((category, ctype), g)| GroupedEntry {
            group: category.clone(),
            series: ctype.clone(),
            value: g.total_sales,
            hover: format!(
                "{category} · {ctype}\npaym: {}  discapld: {}  saleslevel: {}\n{} transactions",
                g.paym, g.discapld, g.saleslevel, g.rows
            ),
        })
        .collect();
    grouped_bars(ui, "category_breakdown", "Category", &entries, colors);
}

fn gender_chart(ui: &mut Ui, vm: &ViewModel, colors: Option<&LabelColors>) {
    ui.heading("👫 Sales by Gender & Customer Type");
    let entries: Vec<GroupedEntry> = vm
        .gender_by_ctype
        .iter()
        .map(|((gender, ctype), sales)| GroupedEntry {
            group: gender.clone(),
            series: ctype.clone(),
            value: *sales,
            hover: format!("{gender} · {ctype}"),
        })
        .collect();
    grouped_bars(ui, "gender_ctype", "cgender", &entries, colors);
}

// ---------------------------------------------------------------------------
// Payment share donut
// ---------------------------------------------------------------------------

const OUTER_RADIUS: f64 = 1.0;
const INNER_RADIUS: f64 = 0.4;

/// Point at `angle` radians clockwise from twelve o'clock.
fn polar(radius: f64, angle: f64) -> [f64; 2] {
    [radius * angle.sin(), radius * angle.cos()]
}

fn payment_donut(ui: &mut Ui, shares: &BTreeMap<String, f64>, colors: Option<&LabelColors>) {
    ui.heading("💳 Payment Method Contribution");

    let total: f64 = shares.values().sum();
    if total <= 0.0 {
        ui.label("No sales in the current selection.");
        return;
    }

    // Each slice is drawn as thin quads; egui only fills convex shapes.
    let mut polygons = Vec::new();
    let mut start = 0.0;
    for (label, value) in shares {
        let sweep = value / total * TAU;
        let color = colors.map_or(Color32::LIGHT_BLUE, |cm| cm.color_for(label));
        let name = format!("{label} ({:.1}%)", value / total * 100.0);
        let steps = ((sweep / TAU * 180.0).ceil() as usize).max(1);

        for i in 0..steps {
            let a0 = start + sweep * i as f64 / steps as f64;
            let a1 = start + sweep * (i + 1) as f64 / steps as f64;
            let quad = vec![
                polar(OUTER_RADIUS, a0),
                polar(OUTER_RADIUS, a1),
                polar(INNER_RADIUS, a1),
                polar(INNER_RADIUS, a0),
            ];
            polygons.push(
                Polygon::new(PlotPoints::from(quad))
                    .fill_color(color)
                    .stroke(Stroke::new(0.5, color))
                    .name(&name),
            );
        }
        start += sweep;
    }

    Plot::new("payment_share")
        .height(CHART_HEIGHT)
        .data_aspect(1.0)
        .legend(Legend::default())
        .show_axes(false)
        .show_grid(false)
        .show_x(false)
        .show_y(false)
        .allow_drag(false)
        .allow_zoom(false)
        .allow_scroll(false)
        .show(ui, |plot_ui| {
            for polygon in polygons {
                plot_ui.polygon(polygon);
            }
        });
}

// ---------------------------------------------------------------------------
// Discount distribution
// ---------------------------------------------------------------------------

fn discount_box_plot(
    ui: &mut Ui,
    distributions: &BTreeMap<String, SalesDistribution>,
    colors: Option<&LabelColors>,
) {
    ui.heading("🏷 Impact of Discounts on Sales");

    let flags: Vec<String> = distributions.keys().cloned().collect();
    let plots: Vec<BoxPlot> = distributions
        .iter()
        .enumerate()
        .map(|(i, (flag, d))| {
            let color = colors.map_or(Color32::LIGHT_GREEN, |cm| cm.color_for(flag));
            let elem = BoxElem::new(i as f64, BoxSpread::new(d.min, d.q1, d.median, d.q3, d.max))
                .name(format!("{flag} (n={})", d.count))
                .box_width(0.5)
                .fill(color.gamma_multiply(0.4))
                .stroke(Stroke::new(1.5, color));
            BoxPlot::new(vec![elem]).name(flag).color(color)
        })
        .collect();

    Plot::new("discount_distribution")
        .height(CHART_HEIGHT)
        .legend(Legend::default())
        .x_axis_label("discapld")
        .y_axis_label(SALES_AXIS)
        .x_axis_formatter(move |mark, _range| category_label(&flags, mark.value))
        .show(ui, |plot_ui| {
            for plot in plots {
                plot_ui.box_plot(plot);
            }
        });
}

// ---------------------------------------------------------------------------
// Monthly highlights
// ---------------------------------------------------------------------------

fn monthly_highlights(ui: &mut Ui, vm: &ViewModel, top_n: usize, colors: Option<&LabelColors>) {
    ui.heading("🧾 Monthly Highlights");
    let period = vm
        .top
        .period
        .map_or_else(|| "–".to_string(), |p| p.to_string());

    ui.columns(2, |cols: &mut [Ui]| {
        cols[0].strong(format!("📆 Top {top_n} Categories in {period}"));
        top_table(&mut cols[0], &vm.top.entries);

        cols[1].strong(format!("💳 Payment Method Performance ({period})"));
        latest_payment_chart(&mut cols[1], &vm.latest_payment, colors);
    });
}

fn top_table(ui: &mut Ui, entries: &[CategoryTotal]) {
    if entries.is_empty() {
        ui.label("No dated sales in the current selection.");
        return;
    }
    TableBuilder::new(ui)
        .striped(true)
        .vscroll(false)
        .column(Column::auto().at_least(140.0))
        .column(Column::remainder())
        .header(20.0, |mut header| {
            header.col(|ui| {
                ui.strong("category");
            });
            header.col(|ui| {
                ui.strong("totalsales");
            });
        })
        .body(|mut body| {
            for entry in entries {
                body.row(20.0, |mut row| {
                    row.col(|ui| {
                        ui.label(&entry.category);
                    });
                    row.col(|ui| {
                        ui.label(format_amount(entry.total_sales));
                    });
                });
            }
        });
}

fn latest_payment_chart(ui: &mut Ui, ranking: &[(String, f64)], colors: Option<&LabelColors>) {
    let names: Vec<String> = ranking.iter().map(|(name, _)| name.clone()).collect();
    let bars: Vec<Bar> = ranking
        .iter()
        .enumerate()
        .map(|(i, (name, sales))| {
            let color = colors.map_or(Color32::LIGHT_BLUE, |cm| cm.color_for(name));
            Bar::new(i as f64, *sales).width(0.6).name(name).fill(color)
        })
        .collect();

    Plot::new("latest_payment")
        .height(CHART_HEIGHT * 0.8)
        .x_axis_label("paym")
        .y_axis_label(SALES_AXIS)
        .x_axis_formatter(move |mark, _range| category_label(&names, mark.value))
        .show(ui, |plot_ui| {
            plot_ui.bar_chart(BarChart::new(bars));
        });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn category_labels_only_on_integer_ticks() {
        let groups = vec!["Electronics".to_string(), "Grocery".to_string()];
        assert_eq!(category_label(&groups, 0.0), "Electronics");
        assert_eq!(category_label(&groups, 1.0), "Grocery");
        assert_eq!(category_label(&groups, 0.5), "");
        assert_eq!(category_label(&groups, 2.0), "");
        assert_eq!(category_label(&groups, -1.0), "");
    }

    #[test]
    fn date_axis_round_trips_days() {
        let day = NaiveDate::from_ymd_opt(2024, 2, 29).unwrap();
        assert_eq!(date_label(day.num_days_from_ce() as f64), "2024-02-29");
    }

    #[test]
    fn polar_starts_at_twelve_o_clock() {
        let [x, y] = polar(1.0, 0.0);
        assert!(x.abs() < 1e-12 && (y - 1.0).abs() < 1e-12);
        let [x, y] = polar(1.0, TAU / 4.0);
        assert!((x - 1.0).abs() < 1e-12 && y.abs() < 1e-12);
    }
}
