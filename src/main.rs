use chrono::NaiveDateTime;
use pue_analytics::{
    reading::parse_timestamp,
    report::{pue_table, write_results},
    Dataset, DATA_PATH, RESULTS_PATH,
};
use structopt::StructOpt;

#[derive(Debug, StructOpt)]
#[structopt(name = "pue-analytics", about = "Data centre PUE batch report")]
struct Opt {
    /// Path to the readings CSV file
    #[structopt(long, default_value = DATA_PATH)]
    data: String,
    /// Path to the PUE results CSV file
    #[structopt(short, long, default_value = RESULTS_PATH)]
    output: String,
    /// Readings start time
    #[structopt(short, long, parse(try_from_str = parse_timestamp))]
    start: Option<NaiveDateTime>,
    /// Readings end time
    #[structopt(short, long, parse(try_from_str = parse_timestamp))]
    end: Option<NaiveDateTime>,
    /// Print the dataset statistics
    #[structopt(long)]
    summary: bool,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let opt = Opt::from_args();

    let mut loader = Dataset::loader(&opt.data);
    if let Some(arg) = opt.start {
        loader = loader.start_time(arg);
    }
    if let Some(arg) = opt.end {
        loader = loader.end_time(arg);
    }
    let dataset = loader.load()?;

    println!("=== PUE Table ===");
    println!("{}", pue_table(&dataset));
    if opt.summary {
        if let Some(summary) = dataset.summary() {
            print!("\n{}", summary);
        }
    }

    write_results(&dataset, &opt.output)?;
    println!("\nResults saved to {}", opt.output);

    Ok(())
}
