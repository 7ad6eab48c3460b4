use std::{
    fmt,
    fs::File,
    io::{self, BufReader, Read},
    ops::Deref,
    path::{Path, PathBuf},
    time::Instant,
};

use chrono::NaiveDateTime;
use flate2::read::GzDecoder;
use strum::IntoEnumIterator;

use crate::reading::{DerivedReading, Reading, Status, PUE_THRESHOLD};

#[derive(thiserror::Error, Debug)]
pub enum DatasetError {
    #[error("failed to open {1:?}")]
    Open(#[source] io::Error, PathBuf),
    #[error("failed to read {1:?}")]
    Read(#[source] io::Error, PathBuf),
    #[error("failed to deserialize the readings CSV")]
    Csv(#[from] csv::Error),
}
type Result<T> = std::result::Result<T, DatasetError>;

/// Readings CSV loader
///
/// Files with a `.gz` extension are decompressed on the fly.
pub struct DatasetLoader {
    path: PathBuf,
    time_range: (Option<NaiveDateTime>, Option<NaiveDateTime>),
}
impl DatasetLoader {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            time_range: (None, None),
        }
    }
    /// Discards the readings before `time`
    pub fn start_time(self, time: NaiveDateTime) -> Self {
        Self {
            time_range: (Some(time), self.time_range.1),
            ..self
        }
    }
    /// Discards the readings after `time`
    pub fn end_time(self, time: NaiveDateTime) -> Self {
        Self {
            time_range: (self.time_range.0, Some(time)),
            ..self
        }
    }
    fn contents(&self) -> Result<String> {
        let file = File::open(&self.path).map_err(|e| DatasetError::Open(e, self.path.clone()))?;
        let mut contents = String::new();
        if self.path.extension().is_some_and(|ext| ext == "gz") {
            GzDecoder::new(file).read_to_string(&mut contents)
        } else {
            BufReader::new(file).read_to_string(&mut contents)
        }
        .map_err(|e| DatasetError::Read(e, self.path.clone()))?;
        Ok(contents)
    }
    pub fn load(self) -> Result<Dataset> {
        log::info!("Loading {:?}...", self.path);
        let now = Instant::now();
        let contents = self.contents()?;
        let (start, end) = self.time_range;
        let dataset = Dataset::read_filtered(contents.as_bytes(), |reading| {
            start.map_or(true, |t| reading.timestamp >= t)
                && end.map_or(true, |t| reading.timestamp <= t)
        })?;
        log::info!(
            "... loaded {} readings in {}ms",
            dataset.len(),
            now.elapsed().as_millis()
        );
        Ok(dataset)
    }
}

/// Loads and derives the readings of a CSV file
pub fn load_dataset<P: AsRef<Path>>(path: P) -> Result<Dataset> {
    DatasetLoader::new(path).load()
}

/// Chronological sequence of derived readings
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Dataset(Vec<DerivedReading>);
impl Deref for Dataset {
    type Target = Vec<DerivedReading>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}
impl FromIterator<Reading> for Dataset {
    fn from_iter<T: IntoIterator<Item = Reading>>(iter: T) -> Self {
        Self(iter.into_iter().map(Reading::derive).collect())
    }
}
impl From<Vec<Reading>> for Dataset {
    fn from(readings: Vec<Reading>) -> Self {
        readings.into_iter().collect()
    }
}
impl<'a> IntoIterator for &'a Dataset {
    type Item = &'a DerivedReading;
    type IntoIter = std::slice::Iter<'a, DerivedReading>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}
impl Dataset {
    pub fn loader<P: AsRef<Path>>(path: P) -> DatasetLoader {
        DatasetLoader::new(path)
    }
    /// Reads all the readings from a CSV source
    pub fn from_reader<R: Read>(rdr: R) -> Result<Self> {
        Self::read_filtered(rdr, |_| true)
    }
    fn read_filtered<R, F>(rdr: R, keep: F) -> Result<Self>
    where
        R: Read,
        F: Fn(&Reading) -> bool,
    {
        let mut rdr = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(rdr);
        let mut readings = Vec::new();
        for result in rdr.deserialize() {
            let reading: Reading = result?;
            if keep(&reading) {
                readings.push(reading.derive());
            }
        }
        Ok(Self(readings))
    }
    /// Iterator over the PUE values
    pub fn pue_iter(&self) -> impl Iterator<Item = f64> + '_ {
        self.iter().map(|r| r.pue())
    }
    /// Iterator over the IT power [kW]
    pub fn it_power_iter(&self) -> impl Iterator<Item = f64> + '_ {
        self.iter().map(|r| r.it_power)
    }
    /// Iterator over the total power [kW]
    pub fn total_power_iter(&self) -> impl Iterator<Item = f64> + '_ {
        self.iter().map(|r| r.total_power)
    }
    /// Iterator over the outside temperature [C]
    pub fn outside_temp_iter(&self) -> impl Iterator<Item = f64> + '_ {
        self.iter().map(|r| r.outside_temp)
    }
    /// Returns the range of the IT power
    pub fn it_power_range(&self) -> Option<(f64, f64)> {
        minmax(self.it_power_iter())
    }
    /// Returns the range of the outside temperature
    pub fn outside_temp_range(&self) -> Option<(f64, f64)> {
        minmax(self.outside_temp_iter())
    }
    /// Returns the first and last timestamps
    pub fn time_range(&self) -> Option<(NaiveDateTime, NaiveDateTime)> {
        Some((self.first()?.timestamp, self.last()?.timestamp))
    }
    /// The readings with a PUE above the threshold, in chronological order
    pub fn inefficient(&self) -> Inefficiencies<'_> {
        Inefficiencies(
            self.iter()
                .filter(|r| r.status() == Status::Inefficient)
                .collect(),
        )
    }
    pub fn summary(&self) -> Option<Summary> {
        let (start, end) = self.time_range()?;
        let counts = Status::iter()
            .map(|status| (status, self.iter().filter(|r| r.status() == status).count()))
            .collect();
        Some(Summary {
            n_record: self.len(),
            time_range: (start, end),
            pue: Stats::new(self.pue_iter().collect()),
            it_power: Stats::new(self.it_power_iter().collect()),
            total_power: Stats::new(self.total_power_iter().collect()),
            outside_temp: Stats::new(self.outside_temp_iter().collect()),
            status_counts: counts,
        })
    }
}

fn minmax(values: impl Iterator<Item = f64>) -> Option<(f64, f64)> {
    let (min, max) = values.fold((f64::INFINITY, f64::NEG_INFINITY), |(min, max), x| {
        (min.min(x), max.max(x))
    });
    (min <= max).then_some((min, max))
}

/// Subset of the readings flagged as inefficient
#[derive(Debug)]
pub struct Inefficiencies<'a>(Vec<&'a DerivedReading>);
impl<'a> Deref for Inefficiencies<'a> {
    type Target = Vec<&'a DerivedReading>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}
impl Inefficiencies<'_> {
    pub fn alert(&self) -> EfficiencyAlert {
        if self.is_empty() {
            EfficiencyAlert::AllEfficient
        } else {
            EfficiencyAlert::Inefficient(self.len())
        }
    }
}

/// Outcome of the inefficiency query
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EfficiencyAlert {
    AllEfficient,
    Inefficient(usize),
}
impl fmt::Display for EfficiencyAlert {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EfficiencyAlert::AllEfficient => {
                write!(f, "✅ All PUE values are within efficient range!")
            }
            EfficiencyAlert::Inefficient(n) => write!(
                f,
                "⚠️ {} entries with inefficient PUE (>{}). Consider reviewing cooling or power systems during these times.",
                n, PUE_THRESHOLD
            ),
        }
    }
}

/// Mean, standard deviation and range of a sample
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Stats {
    pub mean: f64,
    pub std: f64,
    pub min: f64,
    pub max: f64,
}
impl Stats {
    fn new(x: Vec<f64>) -> Self {
        let n = x.len() as f64;
        let mean = x.iter().sum::<f64>() / n;
        let std = (x.iter().map(|x| x - mean).fold(0f64, |s, x| s + x * x) / n).sqrt();
        Self {
            mean,
            std,
            min: x.iter().cloned().fold(f64::INFINITY, f64::min),
            max: x.iter().cloned().fold(f64::NEG_INFINITY, f64::max),
        }
    }
}

/// Dataset statistics
#[derive(Debug, Clone)]
pub struct Summary {
    pub n_record: usize,
    pub time_range: (NaiveDateTime, NaiveDateTime),
    pub pue: Stats,
    pub it_power: Stats,
    pub total_power: Stats,
    pub outside_temp: Stats,
    pub status_counts: Vec<(Status, usize)>,
}
impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "SUMMARY:")?;
        writeln!(f, " - # of records: {}", self.n_record)?;
        writeln!(
            f,
            " - time range: [{} - {}]",
            self.time_range.0, self.time_range.1
        )?;
        for (status, count) in &self.status_counts {
            writeln!(f, " - # of {} readings: {}", status, count)?;
        }
        writeln!(
            f,
            "    {:^20}: ({:^12}, {:^12})  ({:^12}, {:^12})",
            "VARIABLE", "MEAN", "STD", "MIN", "MAX"
        )?;
        for (key, stats) in [
            ("PUE", &self.pue),
            ("IT power [kW]", &self.it_power),
            ("total power [kW]", &self.total_power),
            ("outside temp. [C]", &self.outside_temp),
        ] {
            writeln!(
                f,
                "  - {:20}: {:>12.3?}  {:>12.3?}",
                key,
                (stats.mean, stats.std),
                (stats.min, stats.max)
            )?;
        }
        Ok(())
    }
}
