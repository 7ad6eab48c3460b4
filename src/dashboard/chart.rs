use std::{
    fmt::Display,
    io::Write,
    path::{Path, PathBuf},
};

use plotters::{coord::Shift, prelude::*};

use super::{DashboardError, Level, Render, Result, Series, Slider, TableRenderer};

fn chart_error<E: Display>(e: E) -> DashboardError {
    DashboardError::Chart(e.to_string())
}

/// Dashboard rendering with the PUE trend drawn as an SVG chart
///
/// All the other widgets are written as text.
pub struct ChartRenderer<W: Write> {
    text: TableRenderer<W>,
    path: PathBuf,
}
impl<W: Write> ChartRenderer<W> {
    pub fn new<P: AsRef<Path>>(out: W, path: P) -> Self {
        Self {
            text: TableRenderer::new(out),
            path: path.as_ref().to_path_buf(),
        }
    }
    pub fn into_inner(self) -> W {
        self.text.into_inner()
    }
}
impl<W: Write> Render for ChartRenderer<W> {
    fn title(&mut self, title: &str) -> Result<()> {
        self.text.title(title)
    }
    fn subheader(&mut self, title: &str) -> Result<()> {
        self.text.subheader(title)
    }
    fn markdown(&mut self, text: &str) -> Result<()> {
        self.text.markdown(text)
    }
    fn table(&mut self, columns: &[&str], rows: &[Vec<String>]) -> Result<()> {
        self.text.table(columns, rows)
    }
    fn line_chart(&mut self, series: &Series) -> Result<()> {
        {
            let plot = SVGBackend::new(&self.path, (768, 512)).into_drawing_area();
            draw_trend(&plot, series)?;
        }
        log::info!("{} chart saved to {:?}", series.name, self.path);
        self.text
            .markdown(&format!("{} chart: {}", series.name, self.path.display()))
    }
    fn message(&mut self, level: Level, text: &str) -> Result<()> {
        self.text.message(level, text)
    }
    fn slider(&mut self, slider: &Slider) -> Result<()> {
        self.text.slider(slider)
    }
}

/// Draws a time series against the hours elapsed since its first sample
///
/// Non-finite values are left out of the chart.
pub fn draw_trend<DB: DrawingBackend>(plot: &DrawingArea<DB, Shift>, series: &Series) -> Result<()> {
    plot.fill(&WHITE).map_err(chart_error)?;

    let Some(&(t0, _)) = series.points.first() else {
        log::warn!("no {} data to plot", series.name);
        return Ok(());
    };
    let xy: Vec<(f64, f64)> = series
        .points
        .iter()
        .filter(|(_, y)| y.is_finite())
        .map(|(t, y)| ((*t - t0).num_seconds() as f64 / 3600., *y))
        .collect();
    if xy.is_empty() {
        log::warn!("no finite {} value to plot", series.name);
        return Ok(());
    }

    let xrange = xy.iter().map(|(x, _)| *x).fold(1f64, f64::max);
    let (min_value, max_value) = xy
        .iter()
        .map(|(_, y)| *y)
        .chain(series.threshold)
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(min, max), y| {
            (min.min(y), max.max(y))
        });
    let minmax_padding = 0.1 * (max_value - min_value).max(1.);
    let mut chart = ChartBuilder::on(plot)
        .set_label_area_size(LabelAreaPosition::Left, 60)
        .set_label_area_size(LabelAreaPosition::Bottom, 40)
        .margin(10)
        .build_cartesian_2d(
            -xrange * 1e-2..xrange * (1. + 1e-2),
            min_value - minmax_padding..max_value + minmax_padding,
        )
        .map_err(chart_error)?;
    chart
        .configure_mesh()
        .x_desc(format!("Time since {} [h]", t0))
        .y_desc(series.name)
        .draw()
        .map_err(chart_error)?;

    let mut colors = colorous::TABLEAU10.iter().cycle();

    let color = colors.next().unwrap_or(&colorous::TABLEAU10[0]);
    let rgb = RGBColor(color.r, color.g, color.b);
    chart
        .draw_series(LineSeries::new(xy.iter().cloned(), &rgb))
        .map_err(chart_error)?
        .label(series.name)
        .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], &rgb));
    if let Some(threshold) = series.threshold {
        let color = colors.nth(2).unwrap_or(&colorous::TABLEAU10[3]);
        let rgb = RGBColor(color.r, color.g, color.b);
        chart
            .draw_series(LineSeries::new(
                vec![(0., threshold), (xrange, threshold)],
                rgb.stroke_width(2),
            ))
            .map_err(chart_error)?
            .label(format!("threshold ({})", threshold))
            .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], &rgb));
    }
    chart
        .configure_series_labels()
        .border_style(&BLACK)
        .background_style(&WHITE.mix(0.8))
        .position(SeriesLabelPosition::UpperRight)
        .draw()
        .map_err(chart_error)?;
    plot.present().map_err(chart_error)?;
    Ok(())
}
