pub mod city_analyzer;
pub mod describe;
pub mod normal_range;
pub mod season;

pub use city_analyzer::{is_anomaly, rolling_stats, CityAnalysis, CityAnalyzer};
pub use describe::describe;
pub use normal_range::{range_around, NormalRangeResolver};
pub use season::{season_for_date, season_of};
