use crate::error::{AgriVisError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Report configuration, loadable from TOML.
///
/// The defaults reproduce the built-in agricultural metrics report: five
/// World Bank series, the 2010 reference year, five focus countries, and
/// the fixed palette and titles. A partial TOML file overrides only the
/// sections it names.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    pub series: SeriesConfig,
    pub panel: PanelConfig,
    pub report: ReportConfig,
}

/// The five series pulled from the dataset, one per chart
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SeriesConfig {
    pub emissions: String,
    pub fertilizer: String,
    pub imports: String,
    pub exports: String,
    pub freshwater: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct PanelConfig {
    /// Year column every single-year chart reads (stripped header label)
    pub target_year: String,
    /// Focus countries for the line, point, and pie charts
    pub countries: Vec<String>,
    /// Bar colors, cycled when there are more bars than entries
    pub palette: Vec<[u8; 3]>,
    /// Pie wedge pulled out of the donut
    pub exploded_country: String,
    pub suptitle: String,
    pub titles: Titles,
    pub output: PathBuf,
    pub width: u32,
    pub height: u32,
}

/// Per-subplot titles, in panel order
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct Titles {
    pub emissions: String,
    pub fertilizer: String,
    pub imports: String,
    pub exports: String,
    pub freshwater: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ReportConfig {
    pub text: String,
}

impl Default for SeriesConfig {
    fn default() -> Self {
        Self {
            emissions:
                "Agricultural nitrous oxide emissions (thousand metric tons of CO2 equivalent)"
                    .to_string(),
            fertilizer: "Fertilizer consumption (% of fertilizer production)".to_string(),
            imports: "Agricultural raw materials imports (% of merchandise imports)".to_string(),
            exports: "Agricultural raw materials exports (% of merchandise exports)".to_string(),
            freshwater:
                "Annual freshwater withdrawals, agriculture (% of total freshwater withdrawal)"
                    .to_string(),
        }
    }
}

impl Default for PanelConfig {
    fn default() -> Self {
        Self {
            target_year: "2010".to_string(),
            countries: [
                "Australia",
                "China",
                "India",
                "Japan",
                "Russian Federation",
            ]
            .map(String::from)
            .to_vec(),
            palette: vec![
                [165, 42, 42],   // brown
                [255, 192, 203], // pink
                [128, 128, 128], // grey
                [128, 0, 128],   // purple
                [255, 255, 0],   // yellow
            ],
            exploded_country: "India".to_string(),
            suptitle: "Agricultural and Environmental Metrics Analysis".to_string(),
            titles: Titles::default(),
            output: PathBuf::from("figs/panel.png"),
            width: crate::constants::FIGURE_WIDTH,
            height: crate::constants::FIGURE_HEIGHT,
        }
    }
}

impl Default for Titles {
    fn default() -> Self {
        Self {
            emissions: "Agricultural nitrous oxide emissions in 2020 year".to_string(),
            fertilizer: "Fertilizer consumption in 2020 year".to_string(),
            imports: "Agricultural raw materials imports (% of merchandise imports)".to_string(),
            exports: "Agricultural raw materials exports (% of merchandise exports)".to_string(),
            freshwater:
                "Annual freshwater withdrawals, agriculture (% of total freshwater withdrawal)"
                    .to_string(),
        }
    }
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            text: "\
The data visualizations provide valuable insights into agricultural
and environmental metrics. The pie chart indicates India's significant
share (21%) in annual freshwater withdrawals for agriculture, contributing
substantially to total freshwater usage. Nitrous oxide emissions reveal
a diverse landscape, with Australia leading at 28%, followed closely by
China (25%). Fertilizer consumption, dominated by China (47%) and India
(20%), emphasizes their pivotal roles in global agricultural practices.
Raw material exports showcase Australia and Russia as major contributors,
each accounting for 25% and 22%, respectively. Overall, the visualizations
highlight distinct regional patterns, emphasizing the importance of tailored
environmental strategies for each country."
                .to_string(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            series: SeriesConfig::default(),
            panel: PanelConfig::default(),
            report: ReportConfig::default(),
        }
    }
}

impl Config {
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            AgriVisError::Config(format!(
                "Failed to read config file '{}': {}",
                path.display(),
                e
            ))
        })?;

        let config: Config = toml::from_str(&content).map_err(|e| {
            AgriVisError::Config(format!(
                "Failed to parse config file '{}': {}",
                path.display(),
                e
            ))
        })?;

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        let panel = &self.panel;

        if panel.target_year.len() != 4 || !panel.target_year.chars().all(|c| c.is_ascii_digit()) {
            return Err(AgriVisError::Config(format!(
                "target_year must be a 4-digit year, got '{}'",
                panel.target_year
            )));
        }

        if panel.countries.is_empty() {
            return Err(AgriVisError::Config(
                "countries cannot be empty".to_string(),
            ));
        }

        if panel.palette.is_empty() {
            return Err(AgriVisError::Config("palette cannot be empty".to_string()));
        }

        if !panel.countries.contains(&panel.exploded_country) {
            return Err(AgriVisError::Config(format!(
                "exploded_country '{}' is not in the countries list",
                panel.exploded_country
            )));
        }

        if panel.width < 900 || panel.height < 400 {
            return Err(AgriVisError::Config(format!(
                "figure size {}x{} is too small for a 2x3 panel",
                panel.width, panel.height
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_config_validates() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.panel.target_year, "2010");
        assert_eq!(config.panel.countries.len(), 5);
        assert_eq!(config.panel.palette.len(), 5);
        assert_eq!(config.panel.exploded_country, "India");
    }

    #[test]
    fn test_partial_toml_overrides_only_named_fields() {
        let toml_text = r#"
            [panel]
            target_year = "2015"
            output = "out/metrics.png"
        "#;
        let config: Config = toml::from_str(toml_text).unwrap();

        assert_eq!(config.panel.target_year, "2015");
        assert_eq!(config.panel.output, PathBuf::from("out/metrics.png"));
        // Untouched sections keep the report defaults
        assert_eq!(
            config.series.fertilizer,
            "Fertilizer consumption (% of fertilizer production)"
        );
        assert_eq!(config.panel.countries.len(), 5);
    }

    #[test]
    fn test_invalid_target_year_rejected() {
        let mut config = Config::default();
        config.panel.target_year = "20x0".to_string();
        assert!(config.validate().is_err());

        config.panel.target_year = "201".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_exploded_country_must_be_listed() {
        let mut config = Config::default();
        config.panel.exploded_country = "Brazil".to_string();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("Brazil"));
    }

    #[test]
    fn test_empty_palette_rejected() {
        let mut config = Config::default();
        config.panel.palette.clear();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_load_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(b"[panel]\ntarget_year = \"2012\"\n").unwrap();

        let config = Config::load_from_file(file.path()).unwrap();
        assert_eq!(config.panel.target_year, "2012");
    }

    #[test]
    fn test_load_from_file_rejects_invalid() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(b"[panel]\ntarget_year = \"bad\"\n").unwrap();
        assert!(Config::load_from_file(file.path()).is_err());
    }

    #[test]
    fn test_load_missing_file() {
        let err = Config::load_from_file(Path::new("no_such_config.toml")).unwrap_err();
        assert!(matches!(err, AgriVisError::Config(_)));
    }
}
