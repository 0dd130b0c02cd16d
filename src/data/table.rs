//! Regional Indicator Table
//! Typed schema for the indicator spreadsheet, validated right after loading.

use polars::prelude::*;
use std::collections::HashSet;
use std::fmt;
use thiserror::Error;

/// Join key column shared with the geometry asset.
pub const REGION_COLUMN: &str = "Région";

/// Regions expected in a complete national table.
pub const EXPECTED_REGION_COUNT: usize = 12;

#[derive(Error, Debug)]
pub enum SchemaError {
    #[error("Missing column(s): {}", .0.join(", "))]
    MissingColumns(Vec<String>),
    #[error("Row {row} has no region name")]
    MissingRegion { row: usize },
    #[error("Region '{0}' appears more than once")]
    DuplicateRegion(String),
    #[error("Region '{region}': {indicator} is missing or not numeric")]
    InvalidValue { region: String, indicator: Indicator },
    #[error("The table has no rows")]
    Empty,
    #[error("Polars error: {0}")]
    PolarsError(#[from] PolarsError),
}

/// Financial indicator columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Indicator {
    /// Chiffre d'affaires
    #[default]
    CA,
    /// Valeur ajoutée
    VA,
    /// Liquidité
    LA,
    /// Résultat
    RA,
}

impl Indicator {
    pub const ALL: [Indicator; 4] = [Indicator::CA, Indicator::VA, Indicator::LA, Indicator::RA];

    /// Column name in the source table.
    pub fn column(self) -> &'static str {
        match self {
            Indicator::CA => "CA",
            Indicator::VA => "VA",
            Indicator::LA => "LA",
            Indicator::RA => "RA",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Indicator::CA => "Chiffre d'affaires",
            Indicator::VA => "Valeur ajoutée",
            Indicator::LA => "Liquidité",
            Indicator::RA => "Résultat",
        }
    }

    /// Caption of the national total card.
    pub fn metric_caption(self) -> &'static str {
        match self {
            Indicator::CA => "💰 CA total",
            Indicator::VA => "🏭 VA totale",
            Indicator::LA => "💧 LA totale",
            Indicator::RA => "📈 RA total",
        }
    }
}

impl fmt::Display for Indicator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.column())
    }
}

/// One row of the table: a region and its four indicators.
#[derive(Debug, Clone, PartialEq)]
pub struct RegionalRecord {
    pub region: String,
    pub ca: f64,
    pub va: f64,
    pub la: f64,
    pub ra: f64,
}

impl RegionalRecord {
    pub fn value(&self, indicator: Indicator) -> f64 {
        match indicator {
            Indicator::CA => self.ca,
            Indicator::VA => self.va,
            Indicator::LA => self.la,
            Indicator::RA => self.ra,
        }
    }
}

/// Validated indicator table.
///
/// Columns are exactly `Région, CA, VA, LA, RA` in that order and rows keep the
/// source order. Region names are unique and every indicator is a number.
#[derive(Debug, Clone)]
pub struct RegionTable {
    df: DataFrame,
    records: Vec<RegionalRecord>,
}

impl RegionTable {
    /// Validate a freshly loaded DataFrame.
    ///
    /// Header names are matched after stripping a BOM and surrounding
    /// whitespace, in any order. Extra columns are dropped.
    pub fn from_dataframe(raw: &DataFrame) -> Result<Self, SchemaError> {
        let required: Vec<&str> = std::iter::once(REGION_COLUMN)
            .chain(Indicator::ALL.iter().map(|ind| ind.column()))
            .collect();

        let missing: Vec<String> = required
            .iter()
            .filter(|name| find_column(raw, name).is_none())
            .map(|name| name.to_string())
            .collect();
        if !missing.is_empty() {
            return Err(SchemaError::MissingColumns(missing));
        }

        if raw.height() == 0 {
            return Err(SchemaError::Empty);
        }

        let regions = read_regions(raw)?;

        let mut values: Vec<Vec<f64>> = Vec::with_capacity(Indicator::ALL.len());
        for indicator in Indicator::ALL {
            values.push(read_indicator(raw, indicator, &regions)?);
        }

        let records: Vec<RegionalRecord> = regions
            .into_iter()
            .enumerate()
            .map(|(i, region)| RegionalRecord {
                region,
                ca: values[0][i],
                va: values[1][i],
                la: values[2][i],
                ra: values[3][i],
            })
            .collect();

        Self::from_records(records)
    }

    /// Build a table from typed records, enforcing the same invariants.
    pub fn from_records(records: Vec<RegionalRecord>) -> Result<Self, SchemaError> {
        if records.is_empty() {
            return Err(SchemaError::Empty);
        }

        let mut seen = HashSet::new();
        for record in &records {
            if !seen.insert(record.region.as_str()) {
                return Err(SchemaError::DuplicateRegion(record.region.clone()));
            }
            for indicator in Indicator::ALL {
                if !record.value(indicator).is_finite() {
                    return Err(SchemaError::InvalidValue {
                        region: record.region.clone(),
                        indicator,
                    });
                }
            }
        }

        if records.len() != EXPECTED_REGION_COUNT {
            log::warn!(
                "Table has {} regions, expected {}",
                records.len(),
                EXPECTED_REGION_COUNT
            );
        }

        let column = |indicator: Indicator| {
            Column::new(
                indicator.column().into(),
                records.iter().map(|r| r.value(indicator)).collect::<Vec<f64>>(),
            )
        };

        let df = DataFrame::new(vec![
            Column::new(
                REGION_COLUMN.into(),
                records.iter().map(|r| r.region.clone()).collect::<Vec<String>>(),
            ),
            column(Indicator::CA),
            column(Indicator::VA),
            column(Indicator::LA),
            column(Indicator::RA),
        ])?;

        Ok(Self { df, records })
    }

    pub fn dataframe(&self) -> &DataFrame {
        &self.df
    }

    pub fn records(&self) -> &[RegionalRecord] {
        &self.records
    }

    /// Region names in table order.
    pub fn regions(&self) -> Vec<String> {
        self.records.iter().map(|r| r.region.clone()).collect()
    }

    pub fn height(&self) -> usize {
        self.records.len()
    }
}

fn normalize_header(name: &str) -> &str {
    name.trim_start_matches('\u{feff}').trim()
}

fn find_column<'a>(df: &'a DataFrame, name: &str) -> Option<&'a Column> {
    df.get_columns()
        .iter()
        .find(|col| normalize_header(col.name().as_str()) == name)
}

fn read_regions(df: &DataFrame) -> Result<Vec<String>, SchemaError> {
    let column = find_column(df, REGION_COLUMN)
        .ok_or_else(|| SchemaError::MissingColumns(vec![REGION_COLUMN.to_string()]))?;
    let as_str = column.cast(&DataType::String)?;
    let ca = as_str.as_materialized_series().str()?;

    ca.into_iter()
        .enumerate()
        .map(|(row, value)| match value {
            Some(name) if !name.trim().is_empty() => Ok(name.to_string()),
            _ => Err(SchemaError::MissingRegion { row: row + 1 }),
        })
        .collect()
}

fn read_indicator(
    df: &DataFrame,
    indicator: Indicator,
    regions: &[String],
) -> Result<Vec<f64>, SchemaError> {
    let column = find_column(df, indicator.column())
        .ok_or_else(|| SchemaError::MissingColumns(vec![indicator.column().to_string()]))?;
    let value_f64 = column.cast(&DataType::Float64)?;
    let value_ca = value_f64.f64()?;

    value_ca
        .into_iter()
        .zip(regions)
        .map(|(value, region)| match value {
            Some(v) if v.is_finite() => Ok(v),
            _ => Err(SchemaError::InvalidValue {
                region: region.clone(),
                indicator,
            }),
        })
        .collect()
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn record(region: &str, ca: f64, va: f64, la: f64, ra: f64) -> RegionalRecord {
        RegionalRecord {
            region: region.to_string(),
            ca,
            va,
            la,
            ra,
        }
    }

    pub(crate) fn sample_table() -> RegionTable {
        RegionTable::from_records(vec![
            record("Casablanca-Settat", 100.0, 40.0, 10.0, 7.0),
            record("Rabat-Salé-Kénitra", 50.0, 60.0, 5.0, -2.0),
            record("Souss-Massa", 25.0, 20.0, 15.0, 3.0),
        ])
        .unwrap()
    }

    fn raw_frame(columns: Vec<Column>) -> DataFrame {
        DataFrame::new(columns).unwrap()
    }

    #[test]
    fn accepts_shuffled_columns_and_drops_extras() {
        let raw = raw_frame(vec![
            Column::new("RA".into(), vec![1i64, 2]),
            Column::new("Notes".into(), vec!["x", "y"]),
            Column::new("Région".into(), vec!["Oriental", "Drâa-Tafilalet"]),
            Column::new("CA".into(), vec![10.5, 20.0]),
            Column::new("LA".into(), vec!["3", "4.25"]),
            Column::new("VA".into(), vec![7i64, 8]),
        ]);

        let table = RegionTable::from_dataframe(&raw).unwrap();
        assert_eq!(
            table
                .dataframe()
                .get_column_names()
                .iter()
                .map(|s| s.as_str())
                .collect::<Vec<_>>(),
            vec!["Région", "CA", "VA", "LA", "RA"]
        );
        assert_eq!(
            table.records()[1],
            record("Drâa-Tafilalet", 20.0, 8.0, 4.25, 2.0)
        );
    }

    #[test]
    fn header_bom_and_padding_are_ignored() {
        let raw = raw_frame(vec![
            Column::new("\u{feff}Région".into(), vec!["Oriental"]),
            Column::new(" CA ".into(), vec![1.0]),
            Column::new("VA".into(), vec![1.0]),
            Column::new("LA".into(), vec![1.0]),
            Column::new("RA".into(), vec![1.0]),
        ]);

        let table = RegionTable::from_dataframe(&raw).unwrap();
        assert_eq!(table.regions(), vec!["Oriental".to_string()]);
    }

    #[test]
    fn missing_columns_are_all_listed() {
        let raw = raw_frame(vec![
            Column::new("Region".into(), vec!["Oriental"]),
            Column::new("CA".into(), vec![1.0]),
            Column::new("VA".into(), vec![1.0]),
        ]);

        match RegionTable::from_dataframe(&raw) {
            Err(SchemaError::MissingColumns(cols)) => {
                assert_eq!(cols, vec!["Région", "LA", "RA"]);
            }
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn non_numeric_value_names_region_and_indicator() {
        let raw = raw_frame(vec![
            Column::new("Région".into(), vec!["Oriental", "Fès-Meknès"]),
            Column::new("CA".into(), vec!["1", "n/a"]),
            Column::new("VA".into(), vec![1.0, 2.0]),
            Column::new("LA".into(), vec![1.0, 2.0]),
            Column::new("RA".into(), vec![1.0, 2.0]),
        ]);

        match RegionTable::from_dataframe(&raw) {
            Err(SchemaError::InvalidValue { region, indicator }) => {
                assert_eq!(region, "Fès-Meknès");
                assert_eq!(indicator, Indicator::CA);
            }
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn blank_region_is_rejected() {
        let raw = raw_frame(vec![
            Column::new("Région".into(), vec![Some("Oriental"), None]),
            Column::new("CA".into(), vec![1.0, 2.0]),
            Column::new("VA".into(), vec![1.0, 2.0]),
            Column::new("LA".into(), vec![1.0, 2.0]),
            Column::new("RA".into(), vec![1.0, 2.0]),
        ]);

        assert!(matches!(
            RegionTable::from_dataframe(&raw),
            Err(SchemaError::MissingRegion { row: 2 })
        ));
    }

    #[test]
    fn duplicate_regions_are_rejected() {
        let err = RegionTable::from_records(vec![
            record("Oriental", 1.0, 1.0, 1.0, 1.0),
            record("Oriental", 2.0, 2.0, 2.0, 2.0),
        ])
        .unwrap_err();
        assert!(matches!(err, SchemaError::DuplicateRegion(name) if name == "Oriental"));
    }

    #[test]
    fn join_key_is_case_and_accent_sensitive() {
        let table = RegionTable::from_records(vec![
            record("Fès-Meknès", 1.0, 1.0, 1.0, 1.0),
            record("Fes-Meknes", 2.0, 2.0, 2.0, 2.0),
            record("fès-meknès", 3.0, 3.0, 3.0, 3.0),
        ])
        .unwrap();
        assert_eq!(table.height(), 3);
    }

    #[test]
    fn empty_table_is_rejected() {
        assert!(matches!(
            RegionTable::from_records(Vec::new()),
            Err(SchemaError::Empty)
        ));
    }

    #[test]
    fn indicators_default_to_ca_and_name_their_columns() {
        assert_eq!(Indicator::default(), Indicator::CA);
        let columns: Vec<String> = Indicator::ALL.iter().map(|i| i.to_string()).collect();
        assert_eq!(columns, ["CA", "VA", "LA", "RA"]);
        assert_eq!(sample_table().records()[1].value(Indicator::RA), -2.0);
    }
}
