//! PUE dashboard
//!
//! The dashboard walks through the dataset and the fitted model section by
//! section and hands every widget to a [Render] implementation:
//! [TableRenderer] writes everything as plain text, [ChartRenderer] (feature
//! `plot`) draws the PUE trend as an SVG chart instead.

use std::io;

use chrono::NaiveDateTime;
use strum_macros::{Display, EnumString};

use crate::{
    dataset::{Dataset, EfficiencyAlert},
    model::PredictionModel,
    reading::{DerivedReading, PUE_THRESHOLD},
};

#[cfg(feature = "plot")]
mod chart;
mod table;
#[cfg(feature = "plot")]
pub use chart::{draw_trend, ChartRenderer};
pub use table::TableRenderer;

/// Headroom added to the largest IT power of the dataset [kW]
pub const IT_LOAD_HEADROOM: f64 = 50.;
/// Headroom added to the largest outside temperature of the dataset [C]
pub const OUTSIDE_TEMP_HEADROOM: f64 = 10.;
pub const DEFAULT_IT_LOAD: f64 = 160.;
pub const DEFAULT_OUTSIDE_TEMP: f64 = 20.;

const INTRODUCTION: &str = "### What is PUE?
**Power Usage Effectiveness (PUE)** is a key metric used to measure the energy efficiency of a data centre.
It is calculated as:

**PUE = Total Facility Energy / IT Equipment Energy**

- **Total Facility Energy** = All energy used in the data centre (servers, cooling, lighting, etc.)
- **IT Equipment Energy** = Energy used directly by computing equipment (servers, storage, network)

**Goal:** PUE of 1.0 means perfect efficiency (all energy goes to IT).
Most data centres operate between 1.5–2.0. Lower is better!

This dashboard helps visualize PUE trends and identify inefficiencies in energy usage.";
const TREND_NOTE: &str = "💡 The line chart shows how PUE changes over time. Values above 1.8 may indicate inefficiency in cooling or power usage.";
const PREDICTION_NOTE: &str = "💡 This predicts how energy efficiency may change based on IT load and environmental conditions.";
const FOOTER: &str = "---
**Note:** This is a demo using simulated data. In a real data centre, PUE can vary due to cooling, UPS efficiency, and environmental conditions.";

#[derive(thiserror::Error, Debug)]
pub enum DashboardError {
    #[error("{name} = {value} is outside the [{min}, {max}] range")]
    OutOfRange {
        name: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },
    #[error("the dashboard needs at least one reading")]
    NoReadings,
    #[error("failed to write the dashboard")]
    Io(#[from] io::Error),
    #[cfg(feature = "plot")]
    #[error("failed to draw the PUE chart: {0}")]
    Chart(String),
}
type Result<T> = std::result::Result<T, DashboardError>;

/// Dashboard rendering mode
#[derive(EnumString, Display, Debug, Clone, Copy, PartialEq, Eq)]
#[strum(serialize_all = "lowercase")]
pub enum RenderMode {
    Table,
    Chart,
}

/// Severity of a dashboard message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Info,
    Success,
    Warning,
}

/// Time series shown as a line chart
#[derive(Debug, Clone)]
pub struct Series {
    pub name: &'static str,
    pub points: Vec<(NaiveDateTime, f64)>,
    /// horizontal reference line
    pub threshold: Option<f64>,
}

/// Bounded numeric input
#[derive(Debug, Clone, PartialEq)]
pub struct Slider {
    pub name: &'static str,
    pub label: &'static str,
    pub min: f64,
    pub max: f64,
    pub value: f64,
}
impl Slider {
    /// Bounds a slider by the integer part of a data range plus some headroom
    ///
    /// The default value is clamped into the bounds.
    fn new(
        name: &'static str,
        label: &'static str,
        (min, max): (f64, f64),
        headroom: f64,
        default: f64,
    ) -> Self {
        let (min, max) = (min.trunc(), max.trunc() + headroom);
        Self {
            name,
            label,
            min,
            max,
            value: default.clamp(min, max),
        }
    }
    /// Moves the slider, rejecting values outside its bounds
    pub fn set(&mut self, value: f64) -> Result<()> {
        if value >= self.min && value <= self.max {
            self.value = value;
            Ok(())
        } else {
            Err(DashboardError::OutOfRange {
                name: self.name,
                value,
                min: self.min,
                max: self.max,
            })
        }
    }
}

/// Inputs of the PUE prediction, the slider defaults are used if not set
#[derive(Debug, Default, Clone, Copy)]
pub struct PredictionQuery {
    pub it_load: Option<f64>,
    pub outside_temp: Option<f64>,
}

/// Rendering capability of the dashboard
pub trait Render {
    fn title(&mut self, title: &str) -> Result<()>;
    fn subheader(&mut self, title: &str) -> Result<()>;
    fn markdown(&mut self, text: &str) -> Result<()>;
    fn table(&mut self, columns: &[&str], rows: &[Vec<String>]) -> Result<()>;
    fn line_chart(&mut self, series: &Series) -> Result<()>;
    fn message(&mut self, level: Level, text: &str) -> Result<()>;
    fn slider(&mut self, slider: &Slider) -> Result<()>;
}

/// PUE dashboard of a dataset and of its fitted model
pub struct Dashboard<'a> {
    dataset: &'a Dataset,
    model: &'a PredictionModel,
}
impl<'a> Dashboard<'a> {
    pub fn new(dataset: &'a Dataset, model: &'a PredictionModel) -> Self {
        Self { dataset, model }
    }
    /// The IT load and outside temperature sliders set to the query values
    pub fn sliders(&self, query: PredictionQuery) -> Result<(Slider, Slider)> {
        let mut it_load = Slider::new(
            "it_load",
            "IT Load (kW)",
            self.dataset
                .it_power_range()
                .ok_or(DashboardError::NoReadings)?,
            IT_LOAD_HEADROOM,
            DEFAULT_IT_LOAD,
        );
        let mut outside_temp = Slider::new(
            "outside_temp",
            "Outside Temperature (°C)",
            self.dataset
                .outside_temp_range()
                .ok_or(DashboardError::NoReadings)?,
            OUTSIDE_TEMP_HEADROOM,
            DEFAULT_OUTSIDE_TEMP,
        );
        if let Some(value) = query.it_load {
            it_load.set(value)?;
        }
        if let Some(value) = query.outside_temp {
            outside_temp.set(value)?;
        }
        Ok((it_load, outside_temp))
    }
    /// Predicted PUE for the query, within the slider bounds
    pub fn prediction(&self, query: PredictionQuery) -> Result<f64> {
        let (it_load, outside_temp) = self.sliders(query)?;
        Ok(self.model.predict(it_load.value, outside_temp.value))
    }
    /// The PUE time series with the efficiency threshold
    pub fn trend(&self) -> Series {
        Series {
            name: "PUE",
            points: self
                .dataset
                .iter()
                .map(|r| (r.timestamp, r.pue()))
                .collect(),
            threshold: Some(PUE_THRESHOLD),
        }
    }
    /// Renders all the dashboard sections
    pub fn present<R: Render>(&self, renderer: &mut R, query: PredictionQuery) -> Result<()> {
        let (it_load, outside_temp) = self.sliders(query)?;

        renderer.title("🔋 Data Centre PUE Dashboard")?;
        renderer.markdown(INTRODUCTION)?;

        renderer.subheader("📊 Raw Data")?;
        renderer.table(
            &["timestamp", "it_power", "total_power", "outside_temp", "PUE"],
            &self.dataset.iter().map(raw_row).collect::<Vec<_>>(),
        )?;

        renderer.subheader("📈 PUE Trend Over Time")?;
        renderer.line_chart(&self.trend())?;
        renderer.markdown(TREND_NOTE)?;

        renderer.subheader("⚠️ Efficiency Alerts")?;
        let inefficient = self.dataset.inefficient();
        let alert = inefficient.alert();
        match alert {
            EfficiencyAlert::AllEfficient => renderer.message(Level::Success, &alert.to_string())?,
            EfficiencyAlert::Inefficient(_) => {
                renderer.message(Level::Warning, &alert.to_string())?;
                renderer.table(
                    &["timestamp", "it_power", "total_power", "outside_temp", "PUE"],
                    &inefficient.iter().map(|r| raw_row(r)).collect::<Vec<_>>(),
                )?;
            }
        }

        renderer.subheader("📊 PUE Status by Entry")?;
        renderer.table(
            &["timestamp", "PUE", "Status"],
            &self
                .dataset
                .iter()
                .map(|r| {
                    vec![
                        r.timestamp.to_string(),
                        r.pue().to_string(),
                        r.status().label().to_string(),
                    ]
                })
                .collect::<Vec<_>>(),
        )?;

        renderer.subheader("🔮 PUE Prediction Example")?;
        renderer.slider(&it_load)?;
        renderer.slider(&outside_temp)?;
        let predicted_pue = self.model.predict(it_load.value, outside_temp.value);
        log::info!(
            "predicted PUE at ({} kW, {} C): {}",
            it_load.value,
            outside_temp.value,
            predicted_pue
        );
        renderer.message(
            Level::Info,
            &format!(
                "Predicted PUE for {} kW IT load and {}°C: {:.2}",
                it_load.value, outside_temp.value, predicted_pue
            ),
        )?;
        renderer.markdown(PREDICTION_NOTE)?;

        renderer.markdown(FOOTER)
    }
}

fn raw_row(r: &DerivedReading) -> Vec<String> {
    vec![
        r.timestamp.to_string(),
        r.it_power.to_string(),
        r.total_power.to_string(),
        r.outside_temp.to_string(),
        r.pue().to_string(),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::fit_model;

    const READINGS: &str = "timestamp,it_power,total_power,outside_temp
2024-01-01 00:00:00,100,150,15
2024-01-01 01:00:00,120,240,28
2024-01-01 02:00:00,150,225,18
2024-01-01 03:00:00,180,330,22
";

    /// Records the widgets instead of drawing them
    #[derive(Default)]
    struct Recorder {
        subheaders: Vec<String>,
        messages: Vec<(Level, String)>,
        tables: Vec<(usize, usize)>,
        charts: Vec<Series>,
        sliders: Vec<Slider>,
    }
    impl Render for Recorder {
        fn title(&mut self, _title: &str) -> Result<()> {
            Ok(())
        }
        fn subheader(&mut self, title: &str) -> Result<()> {
            self.subheaders.push(title.to_string());
            Ok(())
        }
        fn markdown(&mut self, _text: &str) -> Result<()> {
            Ok(())
        }
        fn table(&mut self, columns: &[&str], rows: &[Vec<String>]) -> Result<()> {
            self.tables.push((columns.len(), rows.len()));
            Ok(())
        }
        fn line_chart(&mut self, series: &Series) -> Result<()> {
            self.charts.push(series.clone());
            Ok(())
        }
        fn message(&mut self, level: Level, text: &str) -> Result<()> {
            self.messages.push((level, text.to_string()));
            Ok(())
        }
        fn slider(&mut self, slider: &Slider) -> Result<()> {
            self.sliders.push(slider.clone());
            Ok(())
        }
    }

    #[test]
    fn slider_bounds() {
        let dataset = Dataset::from_reader(READINGS.as_bytes()).unwrap();
        let model = fit_model(&dataset).unwrap();
        let dashboard = Dashboard::new(&dataset, &model);
        let (it_load, outside_temp) = dashboard.sliders(PredictionQuery::default()).unwrap();
        assert_eq!((it_load.min, it_load.max, it_load.value), (100., 230., 160.));
        assert_eq!(
            (outside_temp.min, outside_temp.max, outside_temp.value),
            (15., 38., 20.)
        );
    }

    #[test]
    fn out_of_range_inputs_are_rejected() {
        let dataset = Dataset::from_reader(READINGS.as_bytes()).unwrap();
        let model = fit_model(&dataset).unwrap();
        let dashboard = Dashboard::new(&dataset, &model);
        let query = PredictionQuery {
            it_load: Some(400.),
            outside_temp: None,
        };
        assert!(matches!(
            dashboard.prediction(query),
            Err(DashboardError::OutOfRange {
                name: "it_load",
                ..
            })
        ));
        let query = PredictionQuery {
            it_load: Some(230.),
            outside_temp: Some(15.),
        };
        assert_eq!(
            dashboard.prediction(query).unwrap(),
            model.predict(230., 15.)
        );
    }

    #[test]
    fn default_is_clamped() {
        let mut slider = Slider::new("x", "x", (10.7, 20.2), 5., 160.);
        assert_eq!((slider.min, slider.max, slider.value), (10., 25., 25.));
        assert!(slider.set(9.9).is_err());
        slider.set(12.).unwrap();
        assert_eq!(slider.value, 12.);
    }

    #[test]
    fn sections() {
        let dataset = Dataset::from_reader(READINGS.as_bytes()).unwrap();
        let model = fit_model(&dataset).unwrap();
        let mut recorder = Recorder::default();
        Dashboard::new(&dataset, &model)
            .present(&mut recorder, PredictionQuery::default())
            .unwrap();
        assert_eq!(recorder.subheaders.len(), 5);
        assert_eq!(recorder.tables, vec![(5, 4), (5, 2), (3, 4)]);
        assert_eq!(recorder.charts.len(), 1);
        assert_eq!(recorder.charts[0].points.len(), 4);
        assert_eq!(recorder.charts[0].threshold, Some(1.8));
        assert_eq!(recorder.sliders.len(), 2);
        assert_eq!(recorder.messages[0].0, Level::Warning);
        assert!(recorder.messages[0].1.contains("2 entries"));
        let expected = format!(
            "Predicted PUE for 160 kW IT load and 20°C: {:.2}",
            model.predict(160., 20.)
        );
        assert_eq!(recorder.messages[1], (Level::Info, expected));
    }

    #[test]
    fn all_efficient_dashboard() {
        let csv = "timestamp,it_power,total_power,outside_temp
2024-01-01 00:00:00,100,150,15
2024-01-01 01:00:00,120,210,20
2024-01-01 02:00:00,150,270,25
";
        let dataset = Dataset::from_reader(csv.as_bytes()).unwrap();
        let model = fit_model(&dataset).unwrap();
        let mut recorder = Recorder::default();
        Dashboard::new(&dataset, &model)
            .present(&mut recorder, PredictionQuery::default())
            .unwrap();
        assert_eq!(recorder.messages[0].0, Level::Success);
        assert_eq!(recorder.tables.len(), 2);
    }

    #[test]
    fn empty_dataset() {
        let dataset = Dataset::default();
        let model = PredictionModel::new(1.5, 0., 0.);
        let mut recorder = Recorder::default();
        assert!(matches!(
            Dashboard::new(&dataset, &model).present(&mut recorder, PredictionQuery::default()),
            Err(DashboardError::NoReadings)
        ));
    }

    #[test]
    fn render_modes() {
        assert_eq!("chart".parse::<RenderMode>().unwrap(), RenderMode::Chart);
        assert_eq!(RenderMode::Table.to_string(), "table");
        assert!("pie".parse::<RenderMode>().is_err());
    }
}
