pub mod config;
pub mod constants;
pub mod dataset;
pub mod error;
pub mod panel;

pub use config::Config;
pub use dataset::{SeriesTable, YearTable, process_series, process_series_from_reader};
pub use error::{AgriVisError, Result};
pub use panel::{PanelInputs, render_panel, save_panel};
