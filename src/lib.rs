//! Data centre Power Usage Effectiveness analytics
//!
//! Readings of the IT and total facility power, together with the outside
//! temperature, are loaded from a CSV file into a [Dataset] where each
//! reading gets its PUE and its efficiency [Status].
//! A linear [PredictionModel] of the PUE with respect to the IT load and the
//! outside temperature is then fitted to the dataset.
//!
//! ```no_run
//! # fn main() -> Result<(), pue_analytics::Error> {
//! let (dataset, model) = pue_analytics::analyse("data/simulated_pue.csv")?;
//! println!("{} inefficient readings", dataset.inefficient().len());
//! println!("PUE at 160kW and 20C: {:.2}", model.predict(160., 20.));
//! # Ok(())
//! # }
//! ```

use std::path::Path;

pub mod dashboard;
pub mod dataset;
mod error;
pub mod model;
pub mod reading;
pub mod report;

pub use dataset::{load_dataset, Dataset, DatasetLoader, EfficiencyAlert};
pub use error::Error;
pub use model::{fit_model, PredictionModel};
pub use reading::{pue, DerivedReading, Reading, Status, PUE_THRESHOLD};

/// Default readings file
pub const DATA_PATH: &str = "data/simulated_pue.csv";
/// Default PUE results file
pub const RESULTS_PATH: &str = "data/pue_results.csv";

/// Loads the readings and fits the PUE model to them
pub fn analyse<P: AsRef<Path>>(path: P) -> Result<(Dataset, PredictionModel), Error> {
    let dataset = load_dataset(path)?;
    let model = fit_model(&dataset)?;
    Ok((dataset, model))
}
