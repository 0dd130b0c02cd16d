//! Indicator Processor Module
//! Aggregations over the validated table: national totals, shares, ranking and lookup.

use super::table::{Indicator, RegionTable, RegionalRecord, REGION_COLUMN};
use polars::prelude::*;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ProcessorError {
    #[error("Polars error: {0}")]
    PolarsError(#[from] PolarsError),
}

/// National totals of the four indicators.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Totals {
    pub ca: f64,
    pub va: f64,
    pub la: f64,
    pub ra: f64,
}

impl Totals {
    pub fn get(&self, indicator: Indicator) -> f64 {
        match indicator {
            Indicator::CA => self.ca,
            Indicator::VA => self.va,
            Indicator::LA => self.la,
            Indicator::RA => self.ra,
        }
    }
}

/// A region's part of the national total.
#[derive(Debug, Clone, PartialEq)]
pub struct Share {
    pub region: String,
    pub value: f64,
    /// `value / total * 100`, or 0 when the total is 0.
    pub percent: f64,
}

/// Aggregation operations over a `RegionTable`.
pub struct IndicatorProcessor;

impl IndicatorProcessor {
    /// Sum of each indicator column.
    pub fn totals(table: &RegionTable) -> Result<Totals, ProcessorError> {
        let sums = table
            .dataframe()
            .clone()
            .lazy()
            .select(Indicator::ALL.map(|ind| col(ind.column()).sum()))
            .collect()?;

        let sum_of = |indicator: Indicator| -> Result<f64, ProcessorError> {
            Ok(sums
                .column(indicator.column())?
                .f64()?
                .get(0)
                .unwrap_or(0.0))
        };

        Ok(Totals {
            ca: sum_of(Indicator::CA)?,
            va: sum_of(Indicator::VA)?,
            la: sum_of(Indicator::LA)?,
            ra: sum_of(Indicator::RA)?,
        })
    }

    /// Regions sorted by the indicator, largest first. Ties keep table order.
    pub fn ranked(
        table: &RegionTable,
        indicator: Indicator,
    ) -> Result<Vec<(String, f64)>, ProcessorError> {
        let sorted = table
            .dataframe()
            .clone()
            .lazy()
            .select([col(REGION_COLUMN), col(indicator.column())])
            .sort_by_exprs(
                [col(indicator.column())],
                SortMultipleOptions::default()
                    .with_order_descending(true)
                    .with_maintain_order(true),
            )
            .collect()?;

        Self::region_value_pairs(&sorted, indicator)
    }

    /// Each region's share of the positive values, largest first.
    ///
    /// Zero and negative values get a 0% share, so the shares of a table
    /// with any positive value sum to 100.
    pub fn shares(table: &RegionTable, indicator: Indicator) -> Result<Vec<Share>, ProcessorError> {
        let total: f64 = table
            .records()
            .iter()
            .map(|r| r.value(indicator).max(0.0))
            .sum();

        Ok(Self::ranked(table, indicator)?
            .into_iter()
            .map(|(region, value)| Share {
                percent: if total > 0.0 && value > 0.0 {
                    value / total * 100.0
                } else {
                    0.0
                },
                region,
                value,
            })
            .collect())
    }

    /// Rows whose region equals `region` exactly.
    pub fn region_rows(
        table: &RegionTable,
        region: &str,
    ) -> Result<Vec<RegionalRecord>, ProcessorError> {
        let filtered = table
            .dataframe()
            .clone()
            .lazy()
            .filter(col(REGION_COLUMN).eq(lit(region)))
            .collect()?;

        let regions = filtered.column(REGION_COLUMN)?.as_materialized_series().str()?;
        let values: Vec<&Float64Chunked> = Indicator::ALL
            .iter()
            .map(|ind| filtered.column(ind.column()).and_then(|c| c.f64()))
            .collect::<PolarsResult<_>>()?;

        Ok((0..filtered.height())
            .filter_map(|i| {
                Some(RegionalRecord {
                    region: regions.get(i)?.to_string(),
                    ca: values[0].get(i)?,
                    va: values[1].get(i)?,
                    la: values[2].get(i)?,
                    ra: values[3].get(i)?,
                })
            })
            .collect())
    }

    /// Minimum and maximum of an indicator, for color scaling.
    pub fn value_range(table: &RegionTable, indicator: Indicator) -> (f64, f64) {
        table
            .records()
            .iter()
            .map(|r| r.value(indicator))
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
                (lo.min(v), hi.max(v))
            })
    }

    fn region_value_pairs(
        df: &DataFrame,
        indicator: Indicator,
    ) -> Result<Vec<(String, f64)>, ProcessorError> {
        let regions = df.column(REGION_COLUMN)?.as_materialized_series().str()?;
        let values = df.column(indicator.column())?.f64()?;

        Ok(regions
            .into_iter()
            .zip(values.into_iter())
            .filter_map(|(region, value)| Some((region?.to_string(), value?)))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::table::tests::{record, sample_table};

    #[test]
    fn totals_equal_column_sums() {
        let table = sample_table();
        let totals = IndicatorProcessor::totals(&table).unwrap();

        for indicator in Indicator::ALL {
            let expected: f64 = table.records().iter().map(|r| r.value(indicator)).sum();
            assert!((totals.get(indicator) - expected).abs() < 1e-9);
        }
        assert_eq!(totals.ca, 175.0);
        assert_eq!(totals.ra, 8.0);
    }

    #[test]
    fn ranking_is_non_increasing() {
        let table = sample_table();
        for indicator in Indicator::ALL {
            let ranked = IndicatorProcessor::ranked(&table, indicator).unwrap();
            assert_eq!(ranked.len(), table.height());
            assert!(ranked.windows(2).all(|w| w[0].1 >= w[1].1));
        }

        let by_va = IndicatorProcessor::ranked(&table, Indicator::VA).unwrap();
        let order: Vec<&str> = by_va.iter().map(|(r, _)| r.as_str()).collect();
        assert_eq!(
            order,
            vec!["Rabat-Salé-Kénitra", "Casablanca-Settat", "Souss-Massa"]
        );
    }

    #[test]
    fn ranking_ties_keep_table_order() {
        let table = RegionTable::from_records(vec![
            record("Oriental", 5.0, 0.0, 0.0, 0.0),
            record("Guelmim-Oued Noun", 9.0, 0.0, 0.0, 0.0),
            record("Dakhla-Oued Ed-Dahab", 5.0, 0.0, 0.0, 0.0),
        ])
        .unwrap();

        let ranked = IndicatorProcessor::ranked(&table, Indicator::CA).unwrap();
        let order: Vec<&str> = ranked.iter().map(|(r, _)| r.as_str()).collect();
        assert_eq!(
            order,
            vec!["Guelmim-Oued Noun", "Oriental", "Dakhla-Oued Ed-Dahab"]
        );
    }

    #[test]
    fn shares_match_value_over_positive_total() {
        let table = sample_table();
        for indicator in Indicator::ALL {
            let shares = IndicatorProcessor::shares(&table, indicator).unwrap();
            let total: f64 = shares.iter().map(|s| s.value.max(0.0)).sum();
            let sum_pct: f64 = shares.iter().map(|s| s.percent).sum();

            assert!((sum_pct - 100.0).abs() < 1e-9);
            for share in &shares {
                let expected = share.value.max(0.0) / total * 100.0;
                assert!((share.percent - expected).abs() < 1e-9);
            }
        }
    }

    #[test]
    fn negative_values_get_no_share() {
        // RA: 7, -2, 3
        let shares = IndicatorProcessor::shares(&sample_table(), Indicator::RA).unwrap();
        let expected = [
            ("Casablanca-Settat", 70.0),
            ("Souss-Massa", 30.0),
            ("Rabat-Salé-Kénitra", 0.0),
        ];
        assert_eq!(shares.len(), expected.len());
        for (share, (region, percent)) in shares.iter().zip(expected) {
            assert_eq!(share.region, region);
            assert!((share.percent - percent).abs() < 1e-9);
        }
        assert_eq!(shares[2].value, -2.0);

        // totals stay signed
        assert_eq!(IndicatorProcessor::totals(&sample_table()).unwrap().ra, 8.0);
    }

    #[test]
    fn all_negative_values_give_zero_shares() {
        let table = RegionTable::from_records(vec![
            record("Oriental", 0.0, 0.0, 0.0, -4.0),
            record("Souss-Massa", 0.0, 0.0, 0.0, -1.0),
        ])
        .unwrap();
        let shares = IndicatorProcessor::shares(&table, Indicator::RA).unwrap();
        assert!(shares.iter().all(|s| s.percent == 0.0));
    }

    #[test]
    fn two_region_example() {
        let table = RegionTable::from_records(vec![
            record("Casablanca-Settat", 100.0, 0.0, 0.0, 0.0),
            record("Rabat-Salé-Kénitra", 50.0, 0.0, 0.0, 0.0),
        ])
        .unwrap();

        let totals = IndicatorProcessor::totals(&table).unwrap();
        assert_eq!(totals.ca, 150.0);

        let shares = IndicatorProcessor::shares(&table, Indicator::CA).unwrap();
        assert_eq!(shares[0].region, "Casablanca-Settat");
        assert_eq!(format!("{:.1}", shares[0].percent), "66.7");
        assert_eq!(format!("{:.1}", shares[1].percent), "33.3");
    }

    #[test]
    fn zero_total_gives_zero_shares() {
        let flat = RegionTable::from_records(vec![
            record("Oriental", 0.0, 0.0, 0.0, 0.0),
            record("Souss-Massa", 0.0, 0.0, 0.0, 0.0),
        ])
        .unwrap();
        let shares = IndicatorProcessor::shares(&flat, Indicator::LA).unwrap();
        assert!(shares.iter().all(|s| s.percent == 0.0));
    }

    #[test]
    fn each_region_has_exactly_one_row() {
        let table = sample_table();
        for source in table.records() {
            let rows = IndicatorProcessor::region_rows(&table, &source.region).unwrap();
            assert_eq!(rows, vec![source.clone()]);
        }
        assert!(IndicatorProcessor::region_rows(&table, "Atlantis")
            .unwrap()
            .is_empty());
    }

    #[test]
    fn value_range_spans_column() {
        assert_eq!(
            IndicatorProcessor::value_range(&sample_table(), Indicator::RA),
            (-2.0, 7.0)
        );
    }
}
