use crate::config::Config;
use crate::constants::{CELL_PAD, SUPTITLE_BAND, SUPTITLE_SIZE};
use crate::dataset::{SeriesTable, YearTable};
use crate::error::Result;

use log::debug;
use std::fs;
use std::path::PathBuf;

mod charts;
mod render;

pub use render::{Colors, Renderer};

use charts::Cell;

/// The five processed tables feeding the fixed 2x3 panel.
///
/// Charts 1, 2, and 5 read a single year column from the wide tables;
/// charts 3 and 4 plot the year-indexed tables as time series. All five
/// must come from a successful [`crate::dataset::process_series`] call;
/// absence is handled there, not here.
pub struct PanelInputs<'a> {
    pub emissions: &'a SeriesTable,
    pub fertilizer: &'a SeriesTable,
    pub imports: &'a YearTable,
    pub exports: &'a YearTable,
    pub freshwater: &'a SeriesTable,
}

/// Assembles the six subplots into one figure.
pub fn render_panel(inputs: &PanelInputs<'_>, config: &Config) -> Result<Renderer> {
    let panel = &config.panel;
    let mut renderer = Renderer::new(panel.width, panel.height, Colors::LIGHT_BLUE)?;

    // Suptitle banner: white bold text on a black band
    renderer.draw_rect(0.0, 0.0, panel.width as f64, SUPTITLE_BAND, Colors::BLACK);
    renderer.draw_text_centered(
        panel.width as f64 / 2.0,
        (SUPTITLE_BAND - SUPTITLE_SIZE) / 2.0,
        &panel.suptitle,
        SUPTITLE_SIZE,
        Colors::WHITE,
    );

    let cells = grid(panel.width, panel.height);

    charts::draw_horizontal_bars(
        &mut renderer,
        &cells[0],
        inputs.emissions,
        &panel.target_year,
        &panel.palette,
        &panel.titles.emissions,
        "metric tons",
        "Countries",
    )?;
    charts::draw_vertical_bars(
        &mut renderer,
        &cells[1],
        inputs.fertilizer,
        &panel.target_year,
        &panel.palette,
        &panel.titles.fertilizer,
        "Countries",
        "% of fertilizer production",
    )?;
    charts::draw_lines(
        &mut renderer,
        &cells[2],
        inputs.imports,
        &panel.countries,
        &panel.titles.imports,
        "Years",
        "Percentage",
    );
    charts::draw_points(
        &mut renderer,
        &cells[3],
        inputs.exports,
        &panel.countries,
        &panel.titles.exports,
        "Years",
        "Value",
    );
    charts::draw_pie(
        &mut renderer,
        &cells[4],
        inputs.freshwater,
        &panel.target_year,
        &panel.countries,
        &panel.exploded_country,
        &panel.titles.freshwater,
    );
    charts::draw_report(&mut renderer, &cells[5], &config.report.text);

    Ok(renderer)
}

/// Renders the panel and writes it to the configured output path,
/// creating the parent directory when needed.
pub fn save_panel(inputs: &PanelInputs<'_>, config: &Config) -> Result<PathBuf> {
    let output = config.panel.output.clone();
    if let Some(parent) = output.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)?;
    }

    let renderer = render_panel(inputs, config)?;
    renderer.save(&output)?;
    debug!("panel written to {}", output.display());

    Ok(output)
}

/// Splits the area under the suptitle band into a 2x3 grid of padded cells
fn grid(width: u32, height: u32) -> [Cell; 6] {
    let cell_w = width as f64 / 3.0;
    let cell_h = (height as f64 - SUPTITLE_BAND) / 2.0;

    std::array::from_fn(|i| {
        let row = i / 3;
        let col = i % 3;
        Cell {
            x: col as f64 * cell_w + CELL_PAD,
            y: SUPTITLE_BAND + row as f64 * cell_h + CELL_PAD,
            w: cell_w - 2.0 * CELL_PAD,
            h: cell_h - 2.0 * CELL_PAD,
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grid_has_two_rows_of_three() {
        let cells = grid(3000, 1280);

        // All cells below the suptitle band and inside the figure
        for cell in &cells {
            assert!(cell.y >= SUPTITLE_BAND);
            assert!(cell.x >= 0.0);
            assert!(cell.x + cell.w <= 3000.0);
            assert!(cell.y + cell.h <= 1280.0);
            assert!(cell.w > 0.0 && cell.h > 0.0);
        }

        // Row/column structure
        assert_eq!(cells[0].y, cells[1].y);
        assert_eq!(cells[1].y, cells[2].y);
        assert_eq!(cells[3].y, cells[4].y);
        assert!(cells[3].y > cells[0].y);
        assert_eq!(cells[0].x, cells[3].x);
        assert!(cells[1].x > cells[0].x);
        assert!(cells[2].x > cells[1].x);
    }

    #[test]
    fn test_grid_cells_do_not_overlap() {
        let cells = grid(900, 600);
        for (i, a) in cells.iter().enumerate() {
            for b in cells.iter().skip(i + 1) {
                let disjoint_x = a.x + a.w <= b.x || b.x + b.w <= a.x;
                let disjoint_y = a.y + a.h <= b.y || b.y + b.h <= a.y;
                assert!(disjoint_x || disjoint_y);
            }
        }
    }
}
