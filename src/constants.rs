/// Identifier columns expected ahead of the year columns
pub const COUNTRY_NAME_HEADER: &str = "Country Name";
pub const COUNTRY_CODE_HEADER: &str = "Country Code";
pub const SERIES_NAME_HEADER: &str = "Series Name";
pub const SERIES_CODE_HEADER: &str = "Series Code";

/// Year headers look like "2010 [YR2010]"; everything from this marker on is dropped
pub const YEAR_SUFFIX_MARKER: &str = " [";

/// World Bank exports encode a missing observation as ".."
pub const MISSING_VALUE: &str = "..";

/// Figure geometry (px), 2 rows x 3 columns of subplots
pub const FIGURE_WIDTH: u32 = 3000;
pub const FIGURE_HEIGHT: u32 = 1280;
pub const SUPTITLE_BAND: f64 = 80.0;
pub const CELL_PAD: f64 = 20.0;

/// Plot-area insets inside one subplot cell (room for titles, labels, ticks)
pub const INSET_LEFT: f64 = 170.0;
pub const INSET_RIGHT: f64 = 30.0;
pub const INSET_TOP: f64 = 60.0;
pub const INSET_BOTTOM: f64 = 110.0;

/// Font sizes (px)
pub const SUPTITLE_SIZE: f64 = 52.0;
pub const TITLE_SIZE: f64 = 28.0;
pub const AXIS_LABEL_SIZE: f64 = 24.0;
pub const TICK_SIZE: f64 = 18.0;
pub const LEGEND_SIZE: f64 = 18.0;
pub const REPORT_SIZE: f64 = 26.0;
