use crate::{dashboard::DashboardError, dataset::DatasetError, model::ModelError, report::ReportError};

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("Error in the `dataset` module")]
    Dataset(#[from] DatasetError),
    #[error("Error in the `model` module")]
    Model(#[from] ModelError),
    #[error("Error in the `report` module")]
    Report(#[from] ReportError),
    #[error("Error in the `dashboard` module")]
    Dashboard(#[from] DashboardError),
}
