//! Data module - indicator table loading, validation and aggregation

mod loader;
mod processor;
mod table;

pub use loader::{DataLoader, DataSource, LoadOutcome, LoaderError};
pub use processor::{IndicatorProcessor, ProcessorError, Totals};
pub use table::{Indicator, RegionTable, RegionalRecord, REGION_COLUMN};

#[cfg(test)]
pub(crate) use table::tests as fixtures;
