use crate::constants::{
    COUNTRY_CODE_HEADER, COUNTRY_NAME_HEADER, MISSING_VALUE, SERIES_CODE_HEADER,
    SERIES_NAME_HEADER, YEAR_SUFFIX_MARKER,
};
use crate::error::{AgriVisError, Result};

use csv::{ReaderBuilder, StringRecord, Trim};
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// One indicator filtered to a single series.
///
/// Wide orientation: one row per country, one column per year. Row and
/// column order are preserved from the source file; the identifier columns
/// (`Country Code`, `Series Code`, `Series Name`) are already dropped and
/// the year headers have their bracketed source-code suffix stripped.
#[derive(Debug, Clone, PartialEq)]
pub struct SeriesTable {
    series: String,
    countries: Vec<String>,
    years: Vec<String>,
    values: Vec<Vec<Option<f64>>>,
}

impl SeriesTable {
    pub fn series(&self) -> &str {
        &self.series
    }

    pub fn countries(&self) -> &[String] {
        &self.countries
    }

    pub fn years(&self) -> &[String] {
        &self.years
    }

    /// Number of countries reporting this series
    pub fn len(&self) -> usize {
        self.countries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.countries.is_empty()
    }

    /// Values of one country row, in year order
    pub fn row(&self, index: usize) -> Option<&[Option<f64>]> {
        self.values.get(index).map(Vec::as_slice)
    }

    /// One year's value for every country, in row order
    ///
    /// # Errors
    /// Returns `YearColumn` if the stripped year header does not exist.
    pub fn year_column(&self, year: &str) -> Result<Vec<Option<f64>>> {
        let col = self.years.iter().position(|y| y == year).ok_or_else(|| {
            AgriVisError::YearColumn {
                year: year.to_string(),
                series: self.series.clone(),
            }
        })?;
        Ok(self.values.iter().map(|row| row[col]).collect())
    }

    /// Single cell lookup by country name and year label
    pub fn value(&self, country: &str, year: &str) -> Option<f64> {
        let row = self.countries.iter().position(|c| c == country)?;
        let col = self.years.iter().position(|y| y == year)?;
        self.values[row][col]
    }

    /// Transposes into a year-indexed table, the equivalent of promoting the
    /// country row to headers and converting the year index to numbers.
    ///
    /// # Errors
    /// Returns `YearParse` if any stripped year header is not an integer.
    pub fn transpose(&self) -> Result<YearTable> {
        let mut years = Vec::with_capacity(self.years.len());
        for header in &self.years {
            let year = header
                .parse::<i32>()
                .map_err(|source| AgriVisError::YearParse {
                    header: header.clone(),
                    source,
                })?;
            years.push(year);
        }

        let values = (0..self.years.len())
            .map(|col| self.values.iter().map(|row| row[col]).collect())
            .collect();

        Ok(YearTable {
            years,
            countries: self.countries.clone(),
            values,
        })
    }
}

/// Transposed orientation: one row per year, one column per country.
///
/// The numeric year index doubles as the `Years` column used by the
/// time-series charts, so there is no separate duplicate field.
#[derive(Debug, Clone, PartialEq)]
pub struct YearTable {
    years: Vec<i32>,
    countries: Vec<String>,
    values: Vec<Vec<Option<f64>>>,
}

impl YearTable {
    pub fn years(&self) -> &[i32] {
        &self.years
    }

    pub fn countries(&self) -> &[String] {
        &self.countries
    }

    /// Values of one year row, in country order
    pub fn row(&self, index: usize) -> Option<&[Option<f64>]> {
        self.values.get(index).map(Vec::as_slice)
    }

    /// One country's time series as (year, value) pairs, missing years skipped
    pub fn column(&self, country: &str) -> Option<Vec<(i32, f64)>> {
        let col = self.countries.iter().position(|c| c == country)?;
        Some(
            self.years
                .iter()
                .zip(&self.values)
                .filter_map(|(&year, row)| row[col].map(|v| (year, v)))
                .collect(),
        )
    }

    /// Wide-to-long reshape: one (year, country, value) record per observed
    /// cell, year-major, matching a melt on the `Years` column.
    pub fn melt(&self) -> Vec<(i32, &str, f64)> {
        let mut records = Vec::new();
        for (&year, row) in self.years.iter().zip(&self.values) {
            for (country, value) in self.countries.iter().zip(row) {
                if let Some(v) = value {
                    records.push((year, country.as_str(), *v));
                }
            }
        }
        records
    }
}

/// Positions of the identifier columns plus the (index, stripped label) of
/// every year column, resolved once from the header record.
struct ColumnLayout {
    country_name: usize,
    series_name: usize,
    year_columns: Vec<(usize, String)>,
}

impl ColumnLayout {
    fn from_headers(headers: &StringRecord) -> Result<Self> {
        let position = |name: &str| -> Result<usize> {
            headers
                .iter()
                .position(|h| h == name)
                .ok_or_else(|| AgriVisError::CsvHeader(format!("Missing '{}' column", name)))
        };

        let country_name = position(COUNTRY_NAME_HEADER)?;
        let country_code = position(COUNTRY_CODE_HEADER)?;
        let series_name = position(SERIES_NAME_HEADER)?;
        let series_code = position(SERIES_CODE_HEADER)?;

        let identifiers = [country_name, country_code, series_name, series_code];
        let year_columns = headers
            .iter()
            .enumerate()
            .filter(|(i, _)| !identifiers.contains(i))
            .map(|(i, h)| (i, strip_year_suffix(h).to_string()))
            .collect();

        Ok(Self {
            country_name,
            series_name,
            year_columns,
        })
    }
}

/// Strips the bracketed source-code suffix from a year header,
/// e.g. "2010 [YR2010]" -> "2010". Headers without the marker pass through.
pub fn strip_year_suffix(header: &str) -> &str {
    match header.split_once(YEAR_SUFFIX_MARKER) {
        Some((year, _)) => year,
        None => header,
    }
}

fn parse_value(field: &str) -> Option<f64> {
    if field.is_empty() || field == MISSING_VALUE {
        return None;
    }
    field.parse().ok()
}

/// Loads the dataset and filters it to one series.
///
/// The match on `Series Name` is exact and case-sensitive. The file handle
/// is scoped to this call and released on every exit path.
///
/// # Errors
/// `SeriesNotFound` if no row carries the requested series name; callers
/// must handle absence before using the tables. I/O, CSV, and malformed
/// year headers surface as their own variants.
pub fn process_series<P: AsRef<Path>>(
    series_name: &str,
    path: P,
) -> Result<(SeriesTable, YearTable)> {
    let file = File::open(path)?;
    process_series_from_reader(series_name, file)
}

/// Same as [`process_series`] but over any reader, for callers that already
/// hold the bytes.
pub fn process_series_from_reader<R: Read>(
    series_name: &str,
    reader: R,
) -> Result<(SeriesTable, YearTable)> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .trim(Trim::All)
        .flexible(true)
        .from_reader(reader);

    let layout = {
        let headers = rdr
            .headers()
            .map_err(|e| AgriVisError::CsvHeader(format!("Failed to read headers: {}", e)))?;
        ColumnLayout::from_headers(headers)?
    };

    let mut countries = Vec::new();
    let mut values: Vec<Vec<Option<f64>>> = Vec::new();

    for record in rdr.records() {
        let record = record?;
        if record.get(layout.series_name) != Some(series_name) {
            continue;
        }

        let country = record
            .get(layout.country_name)
            .unwrap_or_default()
            .to_string();
        let row = layout
            .year_columns
            .iter()
            .map(|&(col, _)| record.get(col).and_then(parse_value))
            .collect();

        countries.push(country);
        values.push(row);
    }

    if countries.is_empty() {
        return Err(AgriVisError::SeriesNotFound {
            series: series_name.to_string(),
        });
    }

    let wide = SeriesTable {
        series: series_name.to_string(),
        countries,
        years: layout
            .year_columns
            .iter()
            .map(|(_, label)| label.clone())
            .collect(),
        values,
    };
    let transposed = wide.transpose()?;

    Ok((wide, transposed))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const FERTILIZER: &str = "Fertilizer consumption (% of fertilizer production)";

    fn sample_csv() -> String {
        let mut csv = String::from(
            "Country Name,Country Code,Series Name,Series Code,2009 [YR2009],2010 [YR2010]\n",
        );
        for (country, code, v09, v10) in [
            ("Australia", "AUS", "10.1", "12.5"),
            ("China", "CHN", "44.0", "47.2"),
            ("India", "IND", "19.5", "20.3"),
            ("Japan", "JPN", "..", "5.8"),
            ("Russian Federation", "RUS", "14.9", "14.2"),
        ] {
            csv.push_str(&format!(
                "{},{},{},AG.CON.FERT.PP.ZS,{},{}\n",
                country, code, FERTILIZER, v09, v10
            ));
        }
        // A second series that must be filtered out
        csv.push_str("Australia,AUS,Arable land (% of land area),AG.LND.ARBL.ZS,6.0,6.1\n");
        csv
    }

    #[test]
    fn test_strip_year_suffix() {
        assert_eq!(strip_year_suffix("2010 [YR2010]"), "2010");
        assert_eq!(strip_year_suffix("1995 [YR1995]"), "1995");
        // No marker: header passes through untouched
        assert_eq!(strip_year_suffix("2010"), "2010");
        assert_eq!(strip_year_suffix("Country Name"), "Country Name");
    }

    #[test]
    fn test_filter_drops_identifier_columns() {
        let (wide, _) = process_series_from_reader(FERTILIZER, sample_csv().as_bytes()).unwrap();

        assert_eq!(wide.len(), 5);
        assert_eq!(wide.years(), ["2009", "2010"]);
        for year in wide.years() {
            assert!(!year.contains('['));
        }
        assert_eq!(
            wide.countries(),
            ["Australia", "China", "India", "Japan", "Russian Federation"]
        );
    }

    #[test]
    fn test_values_and_missing_observations() {
        let (wide, _) = process_series_from_reader(FERTILIZER, sample_csv().as_bytes()).unwrap();

        assert_eq!(wide.value("China", "2010"), Some(47.2));
        assert_eq!(wide.value("Japan", "2009"), None); // ".." in the source
        assert_eq!(wide.value("Japan", "2010"), Some(5.8));
        assert_eq!(wide.value("China", "1999"), None);

        let col = wide.year_column("2010").unwrap();
        assert_eq!(col, [Some(12.5), Some(47.2), Some(20.3), Some(5.8), Some(14.2)]);
    }

    #[test]
    fn test_year_column_missing_year() {
        let (wide, _) = process_series_from_reader(FERTILIZER, sample_csv().as_bytes()).unwrap();
        let err = wide.year_column("1999").unwrap_err();
        assert!(matches!(err, AgriVisError::YearColumn { .. }));
    }

    #[test]
    fn test_transpose_years_are_numeric_index() {
        let (wide, transposed) =
            process_series_from_reader(FERTILIZER, sample_csv().as_bytes()).unwrap();

        assert_eq!(transposed.years(), [2009, 2010]);
        assert_eq!(transposed.countries(), wide.countries());
        assert_eq!(
            transposed.column("China").unwrap(),
            [(2009, 44.0), (2010, 47.2)]
        );
        // Missing 2009 observation is skipped, not zero-filled
        assert_eq!(transposed.column("Japan").unwrap(), [(2010, 5.8)]);
    }

    #[test]
    fn test_melt_is_year_major() {
        let (_, transposed) =
            process_series_from_reader(FERTILIZER, sample_csv().as_bytes()).unwrap();
        let records = transposed.melt();

        // 5 countries x 2 years, minus Japan's missing 2009
        assert_eq!(records.len(), 9);
        assert_eq!(records[0], (2009, "Australia", 10.1));
        assert!(records.iter().all(|&(y, _, _)| y == 2009 || y == 2010));
        let split = records.iter().position(|&(y, _, _)| y == 2010).unwrap();
        assert!(records[..split].iter().all(|&(y, _, _)| y == 2009));
    }

    #[test]
    fn test_series_not_found() {
        let err = process_series_from_reader("Nonexistent Series", sample_csv().as_bytes())
            .unwrap_err();
        assert!(matches!(err, AgriVisError::SeriesNotFound { .. }));
        assert_eq!(
            err.to_string(),
            "No data found for series: Nonexistent Series"
        );
    }

    #[test]
    fn test_match_is_case_sensitive_whole_string() {
        let upper = FERTILIZER.to_uppercase();
        assert!(process_series_from_reader(&upper, sample_csv().as_bytes()).is_err());
        assert!(process_series_from_reader("Fertilizer", sample_csv().as_bytes()).is_err());
    }

    #[test]
    fn test_missing_identifier_column() {
        let csv = "Country Name,Series Name,2010 [YR2010]\nAustralia,X,1.0\n";
        let err = process_series_from_reader("X", csv.as_bytes()).unwrap_err();
        assert!(matches!(err, AgriVisError::CsvHeader(_)));
    }

    #[test]
    fn test_non_numeric_year_header() {
        let csv = "Country Name,Country Code,Series Name,Series Code,Yr2010 [YR2010]\n\
                   Australia,AUS,X,XC,1.0\n";
        let err = process_series_from_reader("X", csv.as_bytes()).unwrap_err();
        assert!(matches!(err, AgriVisError::YearParse { .. }));
    }

    #[test]
    fn test_load_from_file_and_idempotence() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(sample_csv().as_bytes()).unwrap();

        let first = process_series(FERTILIZER, file.path()).unwrap();
        let second = process_series(FERTILIZER, file.path()).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_missing_file() {
        let err = process_series(FERTILIZER, "no_such_file.csv").unwrap_err();
        assert!(matches!(err, AgriVisError::Io(_)));
    }

    #[test]
    fn test_end_to_end_fertilizer_scenario() {
        let csv = "Country Name,Country Code,Series Name,Series Code,2010 [YR2010]\n\
                   Australia,AUS,Fertilizer consumption (% of fertilizer production),C,12.5\n\
                   China,CHN,Fertilizer consumption (% of fertilizer production),C,47.2\n\
                   India,IND,Fertilizer consumption (% of fertilizer production),C,20.3\n\
                   Japan,JPN,Fertilizer consumption (% of fertilizer production),C,5.8\n\
                   Russian Federation,RUS,Fertilizer consumption (% of fertilizer production),C,14.2\n";

        let (wide, transposed) = process_series_from_reader(FERTILIZER, csv.as_bytes()).unwrap();
        assert_eq!(wide.len(), 5);
        assert_eq!(wide.years(), ["2010"]);
        assert_eq!(transposed.years(), [2010]);
    }
}
