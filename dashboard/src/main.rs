use std::io;

use pue_analytics::{
    analyse,
    dashboard::{ChartRenderer, Dashboard, PredictionQuery, RenderMode, TableRenderer},
    DATA_PATH,
};
use structopt::StructOpt;

#[derive(Debug, StructOpt)]
#[structopt(name = "pue-dashboard", about = "Data centre PUE dashboard")]
struct Opt {
    /// Path to the readings CSV file
    #[structopt(long, default_value = DATA_PATH)]
    data: String,
    /// Rendering mode: table or chart
    #[structopt(short, long, default_value = "table")]
    render: RenderMode,
    /// Path to the PUE trend chart (chart mode)
    #[structopt(long, default_value = "pue_trend.svg")]
    chart: String,
    /// IT load [kW] of the PUE prediction
    #[structopt(short, long)]
    it_load: Option<f64>,
    /// Outside temperature [C] of the PUE prediction
    #[structopt(short, long, allow_hyphen_values = true)]
    temp: Option<f64>,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let opt = Opt::from_args();

    let (dataset, model) = analyse(&opt.data)?;
    let dashboard = Dashboard::new(&dataset, &model);
    let query = PredictionQuery {
        it_load: opt.it_load,
        outside_temp: opt.temp,
    };

    let stdout = io::stdout().lock();
    log::info!("rendering the dashboard as {}", opt.render);
    match opt.render {
        RenderMode::Table => dashboard.present(&mut TableRenderer::new(stdout), query)?,
        RenderMode::Chart => {
            dashboard.present(&mut ChartRenderer::new(stdout, &opt.chart), query)?
        }
    }

    Ok(())
}
