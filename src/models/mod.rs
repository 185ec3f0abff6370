pub mod reference;
pub mod series;
pub mod stats;
pub mod temperature;

pub use reference::SeasonalReference;
pub use series::{AnalyzedCitySeries, AnalyzedRecord, CitySeries};
pub use stats::{DescriptiveStats, NormalRange, RangeSource, SeasonStats, SeasonalStats};
pub use temperature::{parse_timestamp, RawRecord, Season, TemperatureRecord};
