//! The six subplot draws plus the little bits of chart math they share.

use super::render::{Colors, Renderer};
use crate::constants::{
    AXIS_LABEL_SIZE, INSET_BOTTOM, INSET_LEFT, INSET_RIGHT, INSET_TOP, LEGEND_SIZE, REPORT_SIZE,
    TICK_SIZE, TITLE_SIZE,
};
use crate::dataset::{SeriesTable, YearTable};
use crate::error::Result;

use image::Rgb;
use itertools::Itertools;

/// One padded subplot slot of the 2x3 grid
#[derive(Debug, Clone, Copy)]
pub(crate) struct Cell {
    pub x: f64,
    pub y: f64,
    pub w: f64,
    pub h: f64,
}

impl Cell {
    /// Inner axes rectangle, leaving room for title, labels, and ticks
    fn plot_area(&self) -> PlotArea {
        PlotArea {
            x0: self.x + INSET_LEFT,
            y0: self.y + INSET_TOP,
            x1: self.x + self.w - INSET_RIGHT,
            y1: self.y + self.h - INSET_BOTTOM,
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct PlotArea {
    x0: f64,
    y0: f64,
    x1: f64,
    y1: f64,
}

impl PlotArea {
    fn w(&self) -> f64 {
        self.x1 - self.x0
    }

    fn h(&self) -> f64 {
        self.y1 - self.y0
    }
}

/// Linear map of `value` from data space to pixel space.
/// A degenerate data range collapses to the output origin.
pub(crate) fn scale(value: f64, vmin: f64, vmax: f64, out0: f64, out1: f64) -> f64 {
    let span = vmax - vmin;
    if span.abs() < f64::EPSILON {
        return out0;
    }
    out0 + (value - vmin) / span * (out1 - out0)
}

/// Upper axis bound for bar charts: 5% headroom over the data maximum
pub(crate) fn axis_max(values: impl Iterator<Item = f64>) -> f64 {
    let max = values.fold(f64::NEG_INFINITY, f64::max);
    if max.is_finite() && max > 0.0 {
        max * 1.05
    } else {
        1.0
    }
}

/// `count + 1` evenly spaced tick values over [vmin, vmax]
pub(crate) fn value_ticks(vmin: f64, vmax: f64, count: usize) -> Vec<f64> {
    let count = count.max(1);
    (0..=count)
        .map(|i| vmin + (vmax - vmin) * i as f64 / count as f64)
        .collect()
}

fn format_tick(value: f64) -> String {
    if (value - value.round()).abs() < 1e-9 {
        format!("{:.0}", value)
    } else {
        format!("{:.1}", value)
    }
}

/// Wedge spans in degrees, counter-clockwise from `start_deg`, proportional
/// to each share of the total. Empty when the total is not positive.
pub(crate) fn pie_angles(shares: &[f64], start_deg: f64) -> Vec<(f64, f64)> {
    let total: f64 = shares.iter().sum();
    if total <= 0.0 {
        return Vec::new();
    }

    let mut angle = start_deg;
    shares
        .iter()
        .map(|share| {
            let span = share / total * 360.0;
            let wedge = (angle, angle + span);
            angle += span;
            wedge
        })
        .collect()
}

/// Unit vector for a counter-clockwise angle, in screen coordinates (y down)
fn unit_dir(deg: f64) -> (f64, f64) {
    let rad = deg.to_radians();
    (rad.cos(), -rad.sin())
}

fn draw_frame(renderer: &mut Renderer, area: &PlotArea) {
    renderer.draw_rect(area.x0, area.y0, area.w(), area.h(), Colors::WHITE);
    renderer.draw_line(area.x0, area.y0, area.x0, area.y1, Colors::BLACK);
    renderer.draw_line(area.x0, area.y1, area.x1, area.y1, Colors::BLACK);
}

fn draw_title(renderer: &mut Renderer, cell: &Cell, title: &str) {
    renderer.draw_text_centered(
        cell.x + cell.w / 2.0,
        cell.y + (INSET_TOP - TITLE_SIZE) / 2.0,
        title,
        TITLE_SIZE,
        Colors::BLACK,
    );
}

fn draw_xlabel(renderer: &mut Renderer, area: &PlotArea, label: &str) {
    renderer.draw_text_centered(
        (area.x0 + area.x1) / 2.0,
        area.y1 + INSET_BOTTOM - AXIS_LABEL_SIZE - 8.0,
        label,
        AXIS_LABEL_SIZE,
        Colors::BLACK,
    );
}

fn draw_ylabel(renderer: &mut Renderer, cell: &Cell, area: &PlotArea, label: &str) {
    let label_w = renderer.text_width(label, AXIS_LABEL_SIZE);
    renderer.draw_text_rotated(
        cell.x + 4.0,
        (area.y0 + area.y1 + label_w) / 2.0,
        label,
        AXIS_LABEL_SIZE,
        Colors::BLACK,
        Colors::LIGHT_BLUE,
    );
}

fn draw_y_ticks(renderer: &mut Renderer, area: &PlotArea, vmin: f64, vmax: f64, grid: bool) {
    for tick in value_ticks(vmin, vmax, 5) {
        let y = scale(tick, vmin, vmax, area.y1, area.y0);
        if grid {
            renderer.draw_line(area.x0 + 1.0, y, area.x1, y, Colors::GRID_GRAY);
        }
        renderer.draw_line(area.x0 - 6.0, y, area.x0, y, Colors::BLACK);
        let label = format_tick(tick);
        let label_w = renderer.text_width(&label, TICK_SIZE);
        renderer.draw_text(
            area.x0 - 12.0 - label_w,
            y - TICK_SIZE / 2.0,
            &label,
            TICK_SIZE,
            Colors::BLACK,
        );
    }
}

fn draw_legend(renderer: &mut Renderer, area: &PlotArea, entries: &[(&str, Rgb<u8>)]) {
    if entries.is_empty() {
        return;
    }

    let line_h = LEGEND_SIZE * 1.4;
    let max_w = entries
        .iter()
        .map(|(name, _)| renderer.text_width(name, LEGEND_SIZE))
        .fold(0.0, f64::max);
    let box_w = max_w + 46.0;
    let box_h = entries.len() as f64 * line_h + 12.0;
    let x = area.x1 - box_w - 8.0;
    let y = area.y0 + 8.0;

    renderer.draw_rect(x, y, box_w, box_h, Colors::WHITE);
    renderer.draw_rect_outline(x, y, box_w, box_h, Colors::DARK_GRAY);

    for (i, (name, color)) in entries.iter().enumerate() {
        let cy = y + 6.0 + i as f64 * line_h + line_h / 2.0;
        renderer.draw_line(x + 8.0, cy, x + 30.0, cy, *color);
        renderer.draw_circle(x + 19.0, cy, 3.0, *color);
        renderer.draw_text(
            x + 38.0,
            cy - LEGEND_SIZE / 2.0,
            name,
            LEGEND_SIZE,
            Colors::BLACK,
        );
    }
}

/// Subplot 1: horizontal bars of one year column, country per bar
#[allow(clippy::too_many_arguments)]
pub(crate) fn draw_horizontal_bars(
    renderer: &mut Renderer,
    cell: &Cell,
    table: &SeriesTable,
    year: &str,
    palette: &[[u8; 3]],
    title: &str,
    xlabel: &str,
    ylabel: &str,
) -> Result<()> {
    let area = cell.plot_area();
    draw_frame(renderer, &area);
    draw_title(renderer, cell, title);
    draw_xlabel(renderer, &area, xlabel);
    draw_ylabel(renderer, cell, &area, ylabel);

    let values = table.year_column(year)?;
    let vmax = axis_max(values.iter().flatten().copied());
    let slot = area.h() / values.len().max(1) as f64;

    for (i, (country, value)) in table.countries().iter().zip(&values).enumerate() {
        let y = area.y0 + i as f64 * slot;
        let bar_w = scale(value.unwrap_or(0.0), 0.0, vmax, 0.0, area.w());
        let color = Rgb(palette[i % palette.len()]);
        renderer.draw_rect(area.x0 + 1.0, y + slot * 0.1, bar_w, slot * 0.8, color);

        let label_w = renderer.text_width(country, TICK_SIZE);
        renderer.draw_text(
            area.x0 - 12.0 - label_w,
            y + slot / 2.0 - TICK_SIZE / 2.0,
            country,
            TICK_SIZE,
            Colors::BLACK,
        );
    }

    for tick in value_ticks(0.0, vmax, 5) {
        let x = scale(tick, 0.0, vmax, area.x0, area.x1);
        renderer.draw_line(x, area.y1, x, area.y1 + 6.0, Colors::BLACK);
        renderer.draw_text_centered(
            x,
            area.y1 + 12.0,
            &format_tick(tick),
            TICK_SIZE,
            Colors::BLACK,
        );
    }

    Ok(())
}

/// Subplot 2: vertical bars of one year column, half-slot bar width
#[allow(clippy::too_many_arguments)]
pub(crate) fn draw_vertical_bars(
    renderer: &mut Renderer,
    cell: &Cell,
    table: &SeriesTable,
    year: &str,
    palette: &[[u8; 3]],
    title: &str,
    xlabel: &str,
    ylabel: &str,
) -> Result<()> {
    let area = cell.plot_area();
    draw_frame(renderer, &area);
    draw_title(renderer, cell, title);
    draw_xlabel(renderer, &area, xlabel);
    draw_ylabel(renderer, cell, &area, ylabel);

    let values = table.year_column(year)?;
    let vmax = axis_max(values.iter().flatten().copied());
    draw_y_ticks(renderer, &area, 0.0, vmax, false);

    let slot = area.w() / values.len().max(1) as f64;
    let bar_w = slot * 0.5;

    for (i, (country, value)) in table.countries().iter().zip(&values).enumerate() {
        let cx = area.x0 + (i as f64 + 0.5) * slot;
        let bar_h = scale(value.unwrap_or(0.0), 0.0, vmax, 0.0, area.h());
        let color = Rgb(palette[i % palette.len()]);
        renderer.draw_rect(cx - bar_w / 2.0, area.y1 - bar_h, bar_w, bar_h, color);

        renderer.draw_line(cx, area.y1, cx, area.y1 + 6.0, Colors::BLACK);
        renderer.draw_text_centered(cx, area.y1 + 12.0, country, TICK_SIZE, Colors::BLACK);
    }

    Ok(())
}

fn padded_bounds(values: impl Iterator<Item = f64>) -> Option<(f64, f64)> {
    let (mut min, mut max) = (f64::INFINITY, f64::NEG_INFINITY);
    for v in values {
        min = min.min(v);
        max = max.max(v);
    }
    if !min.is_finite() || !max.is_finite() {
        return None;
    }
    let pad = ((max - min) * 0.05).max(0.1);
    Some((min - pad, max + pad))
}

/// Subplot 3: one line with point markers per focus country
#[allow(clippy::too_many_arguments)]
pub(crate) fn draw_lines(
    renderer: &mut Renderer,
    cell: &Cell,
    table: &YearTable,
    countries: &[String],
    title: &str,
    xlabel: &str,
    ylabel: &str,
) {
    let area = cell.plot_area();
    draw_frame(renderer, &area);
    draw_title(renderer, cell, title);
    draw_xlabel(renderer, &area, xlabel);
    draw_ylabel(renderer, cell, &area, ylabel);

    let series: Vec<(&str, Vec<(i32, f64)>, Rgb<u8>)> = countries
        .iter()
        .enumerate()
        .filter_map(|(i, country)| {
            let points = table.column(country)?;
            let color = Colors::SERIES_CYCLE[i % Colors::SERIES_CYCLE.len()];
            Some((country.as_str(), points, color))
        })
        .collect();

    let Some((ymin, ymax)) =
        padded_bounds(series.iter().flat_map(|(_, pts, _)| pts.iter().map(|&(_, v)| v)))
    else {
        return;
    };
    let years = table.years();
    let (xmin, xmax) = match (years.first(), years.last()) {
        (Some(&first), Some(&last)) => (f64::from(first), f64::from(last)),
        _ => return,
    };

    draw_y_ticks(renderer, &area, ymin, ymax, true);

    // X ticks: thin out to at most ~8 labelled years
    let step = (((xmax - xmin) / 8.0).ceil() as i32).max(1);
    let mut year = xmin as i32;
    while f64::from(year) <= xmax {
        let x = scale(f64::from(year), xmin, xmax, area.x0, area.x1);
        renderer.draw_line(x, area.y1, x, area.y1 + 6.0, Colors::BLACK);
        renderer.draw_text_centered(
            x,
            area.y1 + 12.0,
            &year.to_string(),
            TICK_SIZE,
            Colors::BLACK,
        );
        year += step;
    }

    for (_, points, color) in &series {
        for (a, b) in points.iter().tuple_windows() {
            let (x0, y0) = (
                scale(f64::from(a.0), xmin, xmax, area.x0, area.x1),
                scale(a.1, ymin, ymax, area.y1, area.y0),
            );
            let (x1, y1) = (
                scale(f64::from(b.0), xmin, xmax, area.x0, area.x1),
                scale(b.1, ymin, ymax, area.y1, area.y0),
            );
            renderer.draw_line(x0, y0, x1, y1, *color);
        }
        for &(year, value) in points {
            let x = scale(f64::from(year), xmin, xmax, area.x0, area.x1);
            let y = scale(value, ymin, ymax, area.y1, area.y0);
            renderer.draw_circle(x, y, 3.0, *color);
        }
    }

    let entries: Vec<(&str, Rgb<u8>)> = series
        .iter()
        .map(|&(name, _, color)| (name, color))
        .collect();
    draw_legend(renderer, &area, &entries);
}

/// Subplot 4: long-form point chart, one colour per country, year labels
/// rotated 90 degrees
#[allow(clippy::too_many_arguments)]
pub(crate) fn draw_points(
    renderer: &mut Renderer,
    cell: &Cell,
    table: &YearTable,
    countries: &[String],
    title: &str,
    xlabel: &str,
    ylabel: &str,
) {
    let area = cell.plot_area();
    draw_frame(renderer, &area);
    draw_title(renderer, cell, title);
    draw_xlabel(renderer, &area, xlabel);
    draw_ylabel(renderer, cell, &area, ylabel);

    let melted = table.melt();
    let records: Vec<(i32, &str, f64)> = melted
        .into_iter()
        .filter(|(_, country, _)| countries.iter().any(|c| c == country))
        .collect();

    let Some((ymin, ymax)) = padded_bounds(records.iter().map(|&(_, _, v)| v)) else {
        return;
    };
    draw_y_ticks(renderer, &area, ymin, ymax, true);

    let years = table.years();
    // Categorical x: one slot per year in table order
    let slot = area.w() / years.len().max(1) as f64;
    let x_of = |year: i32| -> Option<f64> {
        let idx = years.iter().position(|&y| y == year)?;
        Some(area.x0 + (idx as f64 + 0.5) * slot)
    };

    let label_step = years.len() / 16 + 1;
    for (idx, year) in years.iter().enumerate().step_by(label_step) {
        let x = area.x0 + (idx as f64 + 0.5) * slot;
        renderer.draw_line(x, area.y1, x, area.y1 + 6.0, Colors::BLACK);
        let label = year.to_string();
        let label_w = renderer.text_width(&label, TICK_SIZE);
        renderer.draw_text_rotated(
            x - TICK_SIZE / 2.0,
            area.y1 + 10.0 + label_w,
            &label,
            TICK_SIZE,
            Colors::BLACK,
            Colors::LIGHT_BLUE,
        );
    }

    for (i, country) in countries.iter().enumerate() {
        let color = Colors::SERIES_CYCLE[i % Colors::SERIES_CYCLE.len()];
        let points: Vec<(f64, f64)> = records
            .iter()
            .filter(|(_, c, _)| c == country)
            .filter_map(|&(year, _, value)| {
                Some((x_of(year)?, scale(value, ymin, ymax, area.y1, area.y0)))
            })
            .collect();

        for (a, b) in points.iter().tuple_windows() {
            renderer.draw_line(a.0, a.1, b.0, b.1, color);
        }
        for &(x, y) in &points {
            renderer.draw_circle(x, y, 4.0, color);
        }
    }

    let entries: Vec<(&str, Rgb<u8>)> = countries
        .iter()
        .enumerate()
        .map(|(i, c)| {
            (
                c.as_str(),
                Colors::SERIES_CYCLE[i % Colors::SERIES_CYCLE.len()],
            )
        })
        .collect();
    draw_legend(renderer, &area, &entries);
}

/// Subplot 5: donut pie of one year column across the focus countries,
/// one wedge exploded
pub(crate) fn draw_pie(
    renderer: &mut Renderer,
    cell: &Cell,
    table: &SeriesTable,
    year: &str,
    countries: &[String],
    exploded_country: &str,
    title: &str,
) {
    draw_title(renderer, cell, title);

    let shares: Vec<f64> = countries
        .iter()
        .map(|country| table.value(country, year).unwrap_or(0.0))
        .collect();
    let wedges = pie_angles(&shares, 180.0);
    if wedges.is_empty() {
        return;
    }

    let cx = cell.x + cell.w / 2.0;
    let cy = cell.y + INSET_TOP + (cell.h - INSET_TOP) / 2.0;
    let radius = ((cell.h - INSET_TOP).min(cell.w) / 2.0) * 0.72;

    for (i, (&(a0, a1), country)) in wedges.iter().zip(countries).enumerate() {
        let mid = (a0 + a1) / 2.0;
        let (mx, my) = unit_dir(mid);
        let explode = if country == exploded_country {
            0.1 * radius
        } else {
            0.0
        };
        let (wx, wy) = (cx + mx * explode, cy + my * explode);

        // Triangle fan over the wedge arc, 2 degree steps
        let steps = (((a1 - a0) / 2.0).ceil() as usize).max(1);
        let mut points = vec![(wx, wy)];
        for s in 0..=steps {
            let angle = a0 + (a1 - a0) * s as f64 / steps as f64;
            let (dx, dy) = unit_dir(angle);
            points.push((wx + dx * radius, wy + dy * radius));
        }
        let color = Colors::SERIES_CYCLE[i % Colors::SERIES_CYCLE.len()];
        renderer.draw_polygon(&points, color);
    }

    // White centre circle turns the pie into a donut
    renderer.draw_circle(cx, cy, 0.55 * radius, Colors::WHITE);

    for (&(a0, a1), country) in wedges.iter().zip(countries) {
        let share = (a1 - a0) / 360.0 * 100.0;
        if share <= 0.0 {
            continue;
        }
        let (mx, my) = unit_dir((a0 + a1) / 2.0);
        let explode = if country == exploded_country {
            0.1 * radius
        } else {
            0.0
        };

        let pct = format!("{:.0}%", share);
        renderer.draw_text_centered(
            cx + mx * (0.8 * radius + explode),
            cy + my * (0.8 * radius + explode) - TICK_SIZE / 2.0,
            &pct,
            TICK_SIZE,
            Colors::BLACK,
        );
        renderer.draw_text_centered(
            cx + mx * (1.18 * radius + explode),
            cy + my * (1.18 * radius + explode) - LEGEND_SIZE / 2.0,
            country,
            LEGEND_SIZE,
            Colors::BLACK,
        );
    }
}

/// Subplot 6: the literal report text, no axes
pub(crate) fn draw_report(renderer: &mut Renderer, cell: &Cell, text: &str) {
    let line_height = REPORT_SIZE * 1.35;
    for (i, line) in text.lines().enumerate() {
        renderer.draw_text(
            cell.x + 24.0,
            cell.y + 36.0 + i as f64 * line_height,
            line,
            REPORT_SIZE,
            Colors::BLACK,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scale_endpoints_and_midpoint() {
        assert_eq!(scale(0.0, 0.0, 10.0, 100.0, 200.0), 100.0);
        assert_eq!(scale(10.0, 0.0, 10.0, 100.0, 200.0), 200.0);
        assert_eq!(scale(5.0, 0.0, 10.0, 100.0, 200.0), 150.0);
        // Inverted output range (pixel y grows downward)
        assert_eq!(scale(10.0, 0.0, 10.0, 200.0, 100.0), 100.0);
    }

    #[test]
    fn test_scale_degenerate_range() {
        assert_eq!(scale(5.0, 5.0, 5.0, 100.0, 200.0), 100.0);
    }

    #[test]
    fn test_axis_max_headroom() {
        let max = axis_max([10.0, 40.0, 20.0].into_iter());
        assert!((max - 42.0).abs() < 1e-9);
        // No positive data falls back to a unit axis
        assert_eq!(axis_max(std::iter::empty()), 1.0);
        assert_eq!(axis_max([-3.0, 0.0].into_iter()), 1.0);
    }

    #[test]
    fn test_value_ticks_cover_range() {
        let ticks = value_ticks(0.0, 100.0, 5);
        assert_eq!(ticks.len(), 6);
        assert_eq!(ticks[0], 0.0);
        assert_eq!(ticks[5], 100.0);
        assert_eq!(ticks[1], 20.0);
    }

    #[test]
    fn test_format_tick() {
        assert_eq!(format_tick(20.0), "20");
        assert_eq!(format_tick(2.5), "2.5");
        assert_eq!(format_tick(0.0), "0");
    }

    #[test]
    fn test_pie_angles_full_turn_from_start() {
        let wedges = pie_angles(&[1.0, 1.0, 2.0], 180.0);
        assert_eq!(wedges.len(), 3);
        assert_eq!(wedges[0].0, 180.0);

        let span: f64 = wedges.iter().map(|(a0, a1)| a1 - a0).sum();
        assert!((span - 360.0).abs() < 1e-9);

        // Spans are proportional to shares and contiguous
        assert!((wedges[0].1 - wedges[0].0 - 90.0).abs() < 1e-9);
        assert!((wedges[2].1 - wedges[2].0 - 180.0).abs() < 1e-9);
        assert_eq!(wedges[0].1, wedges[1].0);
        assert_eq!(wedges[1].1, wedges[2].0);
    }

    #[test]
    fn test_pie_angles_zero_total() {
        assert!(pie_angles(&[0.0, 0.0], 180.0).is_empty());
        assert!(pie_angles(&[], 180.0).is_empty());
    }

    #[test]
    fn test_padded_bounds() {
        let (min, max) = padded_bounds([10.0, 20.0].into_iter()).unwrap();
        assert!(min < 10.0 && max > 20.0);
        assert!(padded_bounds(std::iter::empty()).is_none());
    }

    #[test]
    fn test_plot_area_inside_cell() {
        let cell = Cell {
            x: 100.0,
            y: 100.0,
            w: 900.0,
            h: 500.0,
        };
        let area = cell.plot_area();
        assert!(area.x0 > cell.x);
        assert!(area.y0 > cell.y);
        assert!(area.x1 < cell.x + cell.w);
        assert!(area.y1 < cell.y + cell.h);
        assert!(area.w() > 0.0 && area.h() > 0.0);
    }

    #[test]
    fn test_unit_dir_screen_orientation() {
        let (x, y) = unit_dir(0.0);
        assert!((x - 1.0).abs() < 1e-9 && y.abs() < 1e-9);
        // 90 degrees CCW points up, which is negative y on screen
        let (x, y) = unit_dir(90.0);
        assert!(x.abs() < 1e-9 && (y + 1.0).abs() < 1e-9);
    }
}
