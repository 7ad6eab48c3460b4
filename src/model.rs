//! Linear PUE model
//!
//! The PUE is regressed on the IT power and the outside temperature with
//! ordinary least squares:
//! `pue = β0 + β1 * it_power + β2 * outside_temp`.
//!
//! The model is fitted on the whole dataset, so [PredictionModel::score] on
//! that same dataset is an in-sample figure and overestimates the predictive
//! quality of the model.

use std::fmt;

use nalgebra::{DMatrix, DVector};

use crate::dataset::Dataset;

#[derive(thiserror::Error, Debug)]
pub enum ModelError {
    #[error("cannot fit a PUE model on an empty dataset")]
    Empty,
    #[error("least squares solver failed: {0}")]
    Solver(&'static str),
}
type Result<T> = std::result::Result<T, ModelError>;

/// Fitted linear PUE model
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PredictionModel {
    intercept: f64,
    it_power: f64,
    outside_temp: f64,
    n_sample: usize,
}

/// Fits the PUE model to the readings of the dataset
///
/// The features are centered and the slopes are the minimum-norm least
/// squares solution computed from the SVD of the centered design matrix, so
/// collinear or too few readings still return coefficients. Non-finite PUE
/// values are not filtered and propagate into the coefficients.
pub fn fit_model(dataset: &Dataset) -> Result<PredictionModel> {
    let n_sample = dataset.len();
    if n_sample == 0 {
        return Err(ModelError::Empty);
    }
    let n = n_sample as f64;
    let it_power_mean = dataset.it_power_iter().sum::<f64>() / n;
    let outside_temp_mean = dataset.outside_temp_iter().sum::<f64>() / n;
    let pue_mean = dataset.pue_iter().sum::<f64>() / n;

    let a = DMatrix::from_fn(n_sample, 2, |i, j| match j {
        0 => dataset[i].it_power - it_power_mean,
        _ => dataset[i].outside_temp - outside_temp_mean,
    });
    let b = DVector::from_iterator(n_sample, dataset.pue_iter().map(|pue| pue - pue_mean));

    let svd = a.svd(true, true);
    let sv_max = svd.singular_values.iter().cloned().fold(0f64, f64::max);
    let eps = f64::EPSILON * n_sample.max(2) as f64 * sv_max;
    let slopes = svd.solve(&b, eps).map_err(ModelError::Solver)?;

    let model = PredictionModel {
        intercept: pue_mean - slopes[0] * it_power_mean - slopes[1] * outside_temp_mean,
        it_power: slopes[0],
        outside_temp: slopes[1],
        n_sample,
    };
    log::debug!("{model}");
    Ok(model)
}

impl PredictionModel {
    /// Creates a model from its coefficients `(β0, β1, β2)`
    pub fn new(intercept: f64, it_power: f64, outside_temp: f64) -> Self {
        Self {
            intercept,
            it_power,
            outside_temp,
            n_sample: 0,
        }
    }
    /// Returns the coefficients `[β0, β1, β2]`
    pub fn coefficients(&self) -> [f64; 3] {
        [self.intercept, self.it_power, self.outside_temp]
    }
    pub fn intercept(&self) -> f64 {
        self.intercept
    }
    /// Number of readings the model was fitted on
    pub fn n_sample(&self) -> usize {
        self.n_sample
    }
    /// Predicts the PUE for a given IT load [kW] and outside temperature [C]
    ///
    /// The inputs are not bounded and neither is the prediction.
    pub fn predict(&self, it_load: f64, outside_temp: f64) -> f64 {
        self.intercept + self.it_power * it_load + self.outside_temp * outside_temp
    }
    /// Coefficient of determination R² of the model on `dataset`
    pub fn score(&self, dataset: &Dataset) -> f64 {
        let n = dataset.len() as f64;
        let pue_mean = dataset.pue_iter().sum::<f64>() / n;
        let (ss_res, ss_tot) = dataset.iter().fold((0f64, 0f64), |(res, tot), r| {
            let e = r.pue() - self.predict(r.it_power, r.outside_temp);
            let d = r.pue() - pue_mean;
            (res + e * e, tot + d * d)
        });
        if ss_tot == 0. {
            if ss_res == 0. {
                1.
            } else {
                0.
            }
        } else {
            1. - ss_res / ss_tot
        }
    }
}
impl fmt::Display for PredictionModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "PUE = {:.6} + {:.6} x IT load [kW] + {:.6} x outside temp. [C]",
            self.intercept, self.it_power, self.outside_temp
        )
    }
}
