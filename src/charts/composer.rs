//! View Composer
//! Builds everything the dashboard draws from the table, the geometry and the selection.
//!
//! Composition is a pure function: the same inputs always give an equal
//! `DashboardView`, so the UI can rebuild it every frame.

use super::scale::normalize;
use super::Selection;
use crate::data::{Indicator, IndicatorProcessor, ProcessorError, RegionTable, RegionalRecord, Totals};
use crate::geo::{Bounds, GeometryAsset};

/// Margin added around the fitted map bounds.
const MAP_PADDING: f64 = 0.02;

/// A region drawn on the choropleth.
#[derive(Debug, Clone, PartialEq)]
pub struct MapRegion {
    pub record: RegionalRecord,
    pub value: f64,
    /// Position on the color scale, in [0, 1].
    pub color_t: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChoroplethView {
    pub indicator: Indicator,
    pub regions: Vec<MapRegion>,
    /// Fitted to the drawn regions only. `None` when nothing matched.
    pub bounds: Option<Bounds>,
    pub value_range: (f64, f64),
    /// Table regions with no feature of the same name.
    pub unmatched: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PieSlice {
    pub region: String,
    pub value: f64,
    pub percent: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BarEntry {
    pub region: String,
    pub value: f64,
    pub color_t: f64,
}

/// Everything one render pass draws.
#[derive(Debug, Clone, PartialEq)]
pub struct DashboardView {
    pub indicator: Indicator,
    pub totals: Totals,
    pub map: ChoroplethView,
    pub pie: Vec<PieSlice>,
    pub pie_title: String,
    pub ranking: Vec<BarEntry>,
    pub detail_region: Option<String>,
    pub detail: Option<RegionalRecord>,
}

/// Composes `DashboardView`s.
pub struct ViewComposer;

impl ViewComposer {
    pub fn compose(
        table: &RegionTable,
        geometry: &GeometryAsset,
        selection: &Selection,
    ) -> Result<DashboardView, ProcessorError> {
        let indicator = selection.indicator;
        let totals = IndicatorProcessor::totals(table)?;
        let (min, max) = IndicatorProcessor::value_range(table, indicator);

        let map = Self::choropleth(table, geometry, indicator, (min, max));

        let pie = IndicatorProcessor::shares(table, indicator)?
            .into_iter()
            .map(|share| PieSlice {
                region: share.region,
                value: share.value,
                percent: share.percent,
            })
            .collect();

        let ranking = IndicatorProcessor::ranked(table, indicator)?
            .into_iter()
            .map(|(region, value)| BarEntry {
                color_t: normalize(value, min, max),
                region,
                value,
            })
            .collect();

        let detail = match &selection.region {
            Some(region) => IndicatorProcessor::region_rows(table, region)?.into_iter().next(),
            None => None,
        };

        Ok(DashboardView {
            indicator,
            totals,
            map,
            pie,
            pie_title: format!(
                "Répartition du total national de {} par région",
                indicator
            ),
            ranking,
            detail_region: selection.region.clone(),
            detail,
        })
    }

    fn choropleth(
        table: &RegionTable,
        geometry: &GeometryAsset,
        indicator: Indicator,
        value_range: (f64, f64),
    ) -> ChoroplethView {
        let report = geometry.join(&table.regions());
        if !report.unmatched.is_empty() {
            log::debug!("Regions without geometry: {:?}", report.unmatched);
        }

        let regions: Vec<MapRegion> = table
            .records()
            .iter()
            .filter(|record| geometry.shape(&record.region).is_some())
            .map(|record| {
                let value = record.value(indicator);
                MapRegion {
                    record: record.clone(),
                    value,
                    color_t: normalize(value, value_range.0, value_range.1),
                }
            })
            .collect();

        ChoroplethView {
            indicator,
            bounds: geometry
                .bounds_of(&report.matched)
                .map(|b| b.padded(MAP_PADDING)),
            regions,
            value_range,
            unmatched: report.unmatched,
        }
    }
}
