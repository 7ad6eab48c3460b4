//! PUE predictor
//!
//! Fits the linear PUE model to the readings and predicts the PUE for a
//! given IT load and outside temperature.

use pue_analytics::{analyse, DATA_PATH};
use structopt::StructOpt;

#[derive(Debug, StructOpt)]
#[structopt(name = "pue-predict", about = "Linear PUE prediction")]
struct Opt {
    /// Path to the readings CSV file
    #[structopt(long, default_value = DATA_PATH)]
    data: String,
    /// IT load [kW]
    #[structopt(short, long, default_value = "160", allow_hyphen_values = true)]
    it_load: f64,
    /// Outside temperature [C]
    #[structopt(short, long, default_value = "20", allow_hyphen_values = true)]
    temp: f64,
    /// Print the model coefficients and its in-sample R²
    #[structopt(short, long)]
    verbose: bool,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let opt = Opt::from_args();

    let (dataset, model) = analyse(&opt.data)?;
    if opt.verbose {
        println!("{}", model);
        println!(
            "R² = {:.4} (in-sample, over {} readings)",
            model.score(&dataset),
            model.n_sample()
        );
    }

    let prediction = model.predict(opt.it_load, opt.temp);
    println!(
        "Predicted PUE at {}kW IT load and {}°C: {:.2}",
        opt.it_load, opt.temp, prediction
    );

    Ok(())
}
