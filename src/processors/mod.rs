pub mod batch_runner;

pub use batch_runner::{
    partition, BatchResult, BatchRunner, BatchTiming, CityGroup, CityOutcome, CityResult,
};
