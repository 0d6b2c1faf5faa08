use thiserror::Error;

pub type Result<T> = std::result::Result<T, AgriVisError>;

#[derive(Debug, Error)]
pub enum AgriVisError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV parse error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Invalid CSV header: {0}")]
    CsvHeader(String),

    #[error("No data found for series: {series}")]
    SeriesNotFound { series: String },

    #[error("Invalid year header '{header}'")]
    YearParse {
        header: String,
        #[source]
        source: std::num::ParseIntError,
    },

    #[error("Year column '{year}' not present for series '{series}'")]
    YearColumn { year: String, series: String },

    #[error(transparent)]
    Image(#[from] image::ImageError),

    #[error("Font error: {0}")]
    Font(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<toml::de::Error> for AgriVisError {
    fn from(err: toml::de::Error) -> Self {
        AgriVisError::Config(format!("TOML parse error: {}", err))
    }
}
