use std::io::Write;

use itertools::Itertools;

use super::{Level, Render, Result, Series, Slider};

/// Plain text rendering of the dashboard
pub struct TableRenderer<W: Write> {
    out: W,
}
impl<W: Write> TableRenderer<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }
    pub fn into_inner(self) -> W {
        self.out
    }
}
impl<W: Write> Render for TableRenderer<W> {
    fn title(&mut self, title: &str) -> Result<()> {
        let width = title.chars().count();
        writeln!(self.out, "{}\n{}\n", title, "=".repeat(width))?;
        Ok(())
    }
    fn subheader(&mut self, title: &str) -> Result<()> {
        let width = title.chars().count();
        writeln!(self.out, "{}\n{}", title, "-".repeat(width))?;
        Ok(())
    }
    fn markdown(&mut self, text: &str) -> Result<()> {
        writeln!(self.out, "{}\n", text)?;
        Ok(())
    }
    fn table(&mut self, columns: &[&str], rows: &[Vec<String>]) -> Result<()> {
        let widths: Vec<usize> = columns
            .iter()
            .enumerate()
            .map(|(j, column)| {
                rows.iter()
                    .filter_map(|row| row.get(j))
                    .map(|cell| cell.chars().count())
                    .chain(std::iter::once(column.chars().count()))
                    .max()
                    .unwrap_or_default()
            })
            .collect();
        writeln!(self.out, "{}", line(columns.iter().copied(), &widths))?;
        writeln!(
            self.out,
            "{}",
            widths.iter().map(|&width| "-".repeat(width)).join("  ")
        )?;
        for row in rows {
            writeln!(self.out, "{}", line(row.iter().map(String::as_str), &widths))?;
        }
        writeln!(self.out)?;
        Ok(())
    }
    fn line_chart(&mut self, series: &Series) -> Result<()> {
        let rows: Vec<_> = series
            .points
            .iter()
            .map(|(t, y)| {
                let marker = match series.threshold {
                    Some(threshold) if *y > threshold => "*",
                    _ => "",
                };
                vec![t.to_string(), format!("{:.3}", y), marker.to_string()]
            })
            .collect();
        self.table(&["time", series.name, ">threshold"], &rows)
    }
    fn message(&mut self, level: Level, text: &str) -> Result<()> {
        let tag = match level {
            Level::Info => "INFO",
            Level::Success => "OK",
            Level::Warning => "WARNING",
        };
        writeln!(self.out, "[{}] {}\n", tag, text)?;
        Ok(())
    }
    fn slider(&mut self, slider: &Slider) -> Result<()> {
        writeln!(
            self.out,
            "{}: {} (range {} - {})",
            slider.label, slider.value, slider.min, slider.max
        )?;
        Ok(())
    }
}

fn line<'a>(cells: impl Iterator<Item = &'a str>, widths: &[usize]) -> String {
    cells
        .zip(widths)
        .map(|(cell, &width)| format!("{:>width$}", cell, width = width))
        .join("  ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        dashboard::{Dashboard, PredictionQuery},
        dataset::Dataset,
        model::fit_model,
    };

    #[test]
    fn aligned_table() {
        let mut renderer = TableRenderer::new(Vec::new());
        renderer
            .table(
                &["a", "value"],
                &[
                    vec!["x".to_string(), "1.5".to_string()],
                    vec!["long".to_string(), "2".to_string()],
                ],
            )
            .unwrap();
        let text = String::from_utf8(renderer.into_inner()).unwrap();
        let lines: Vec<_> = text.lines().collect();
        assert_eq!(lines[0], "   a  value");
        assert_eq!(lines[1], "----  -----");
        assert_eq!(lines[2], "   x    1.5");
        assert_eq!(lines[3], "long      2");
    }

    #[test]
    fn text_dashboard() {
        let csv = "timestamp,it_power,total_power,outside_temp
2024-01-01 00:00:00,100,150,15
2024-01-01 01:00:00,120,240,28
2024-01-01 02:00:00,150,270,25
";
        let dataset = Dataset::from_reader(csv.as_bytes()).unwrap();
        let model = fit_model(&dataset).unwrap();
        let mut renderer = TableRenderer::new(Vec::new());
        Dashboard::new(&dataset, &model)
            .present(&mut renderer, PredictionQuery::default())
            .unwrap();
        let text = String::from_utf8(renderer.into_inner()).unwrap();
        assert!(text.starts_with("🔋 Data Centre PUE Dashboard"));
        assert!(text.contains("[WARNING] ⚠️ 1 entries with inefficient PUE (>1.8)"));
        assert!(text.contains("✅ Efficient"));
        assert!(text.contains("IT Load (kW): 160 (range 100 - 200)"));
        assert!(text.contains("[INFO] Predicted PUE for 160 kW IT load and 20°C:"));
        assert!(text.trim_end().ends_with("environmental conditions."));
    }
}
