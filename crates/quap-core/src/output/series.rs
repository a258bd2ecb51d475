//! Renderers for density series over a shared grid.
//!
//! Every renderer takes the grid and any number of named series aligned
//! with it, so the prior, exact posterior, and approximation can be shown
//! on one x-axis.

use quap_math::{ApproxError, DensitySeries, Grid};
use serde::Serialize;

use crate::error::Result;

/// Turns named density series into a text payload.
pub trait SeriesRenderer {
    fn render(&self, grid: &Grid, series: &[&DensitySeries]) -> Result<String>;
}

/// Selectable renderer for the `series` command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum RenderKind {
    /// JSON document with the grid and each named series
    #[default]
    Json,
    /// Comma-separated values, one row per grid point
    Csv,
    /// Terminal line chart
    Chart,
}

impl RenderKind {
    pub fn renderer(self) -> Box<dyn SeriesRenderer> {
        match self {
            RenderKind::Json => Box::new(JsonRenderer),
            RenderKind::Csv => Box::new(CsvRenderer),
            RenderKind::Chart => Box::new(AsciiChartRenderer::default()),
        }
    }
}

fn check_aligned(grid: &Grid, series: &[&DensitySeries]) -> Result<()> {
    for s in series {
        if s.len() != grid.len() {
            return Err(ApproxError::LengthMismatch {
                expected: grid.len(),
                actual: s.len(),
            }
            .into());
        }
    }
    Ok(())
}

/// `{"x": [...], "series": [{"name": ..., "values": [...]}, ...]}`.
///
/// Non-finite densities (boundary singularities) serialize as `null`.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonRenderer;

#[derive(Serialize)]
struct SeriesDocument<'a> {
    x: &'a [f64],
    series: &'a [&'a DensitySeries],
}

impl SeriesRenderer for JsonRenderer {
    fn render(&self, grid: &Grid, series: &[&DensitySeries]) -> Result<String> {
        check_aligned(grid, series)?;
        let doc = SeriesDocument {
            x: grid.points(),
            series,
        };
        Ok(serde_json::to_string_pretty(&doc)?)
    }
}

/// Header `x,<name>,...` followed by one row per grid point.
#[derive(Debug, Clone, Copy, Default)]
pub struct CsvRenderer;

fn csv_field(name: &str) -> String {
    if name.contains([',', '"', '\n']) {
        format!("\"{}\"", name.replace('"', "\"\""))
    } else {
        name.to_string()
    }
}

impl SeriesRenderer for CsvRenderer {
    fn render(&self, grid: &Grid, series: &[&DensitySeries]) -> Result<String> {
        check_aligned(grid, series)?;
        let mut out = String::from("x");
        for s in series {
            out.push(',');
            out.push_str(&csv_field(s.name()));
        }
        out.push('\n');

        for (i, x) in grid.iter().enumerate() {
            out.push_str(&x.to_string());
            for s in series {
                out.push(',');
                out.push_str(&s.values()[i].to_string());
            }
            out.push('\n');
        }
        Ok(out)
    }
}

/// Plot glyphs, assigned to series in order.
const GLYPHS: [char; 4] = ['.', '*', 'o', '+'];

/// Fixed-size terminal line chart.
///
/// Each column samples the nearest grid point; later series draw over
/// earlier ones where they collide. Non-finite values are skipped.
#[derive(Debug, Clone, Copy)]
pub struct AsciiChartRenderer {
    width: usize,
    height: usize,
}

impl Default for AsciiChartRenderer {
    fn default() -> Self {
        AsciiChartRenderer {
            width: 72,
            height: 20,
        }
    }
}

impl AsciiChartRenderer {
    /// Chart with the given plot area (at least 2x2).
    pub fn new(width: usize, height: usize) -> Self {
        AsciiChartRenderer {
            width: width.max(2),
            height: height.max(2),
        }
    }
}

impl SeriesRenderer for AsciiChartRenderer {
    fn render(&self, grid: &Grid, series: &[&DensitySeries]) -> Result<String> {
        check_aligned(grid, series)?;
        let n = grid.len();
        if n == 0 {
            return Ok(String::new());
        }

        let ymax = series
            .iter()
            .flat_map(|s| s.values().iter().copied())
            .filter(|v| v.is_finite())
            .fold(0.0f64, f64::max);
        let ymax = if ymax > 0.0 { ymax } else { 1.0 };

        let (w, h) = (self.width, self.height);
        let mut canvas = vec![vec![' '; w]; h];
        for (k, s) in series.iter().enumerate() {
            let glyph = GLYPHS[k % GLYPHS.len()];
            for col in 0..w {
                let idx = col * (n - 1) / (w - 1);
                let v = s.values()[idx];
                if !v.is_finite() || v < 0.0 {
                    continue;
                }
                let level = ((v / ymax) * (h - 1) as f64).round() as usize;
                canvas[h - 1 - level.min(h - 1)][col] = glyph;
            }
        }

        let mut out = String::new();
        for (r, row) in canvas.iter().enumerate() {
            let label = if r == 0 || r == h - 1 || r == (h - 1) / 2 {
                format!("{:>8.3}", ymax * (h - 1 - r) as f64 / (h - 1) as f64)
            } else {
                " ".repeat(8)
            };
            out.push_str(&label);
            out.push_str(" |");
            out.extend(row.iter());
            out.push('\n');
        }
        out.push_str(&" ".repeat(8));
        out.push_str(" +");
        out.push_str(&"-".repeat(w));
        out.push('\n');

        let left = format!("{:.3}", grid.start());
        let right = format!("{:.3}", grid.end());
        let gap = w.saturating_sub(left.len() + right.len());
        out.push_str(&" ".repeat(10));
        out.push_str(&left);
        out.push_str(&" ".repeat(gap));
        out.push_str(&right);
        out.push('\n');

        for (k, s) in series.iter().enumerate() {
            out.push_str(&format!("  {} {}\n", GLYPHS[k % GLYPHS.len()], s.name()));
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CoreError;

    fn fixture() -> (Grid, DensitySeries, DensitySeries) {
        let grid = Grid::new(0.0, 1.0, 0.25).unwrap();
        let flat = grid.map("flat", |_| 1.0);
        let ramp = grid.map("ramp, doubled", |x| 2.0 * x);
        (grid, flat, ramp)
    }

    #[test]
    fn csv_has_header_and_rows() {
        let (grid, flat, ramp) = fixture();
        let out = CsvRenderer.render(&grid, &[&flat, &ramp]).unwrap();
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines[0], "x,flat,\"ramp, doubled\"");
        assert_eq!(lines.len(), 1 + grid.len());
        assert_eq!(lines[1], "0,1,0");
        assert_eq!(lines[5], "1,1,2");
    }

    #[test]
    fn json_document_shape() {
        let (grid, flat, ramp) = fixture();
        let out = JsonRenderer.render(&grid, &[&flat, &ramp]).unwrap();
        let doc: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(doc["x"].as_array().unwrap().len(), 5);
        assert_eq!(doc["series"][0]["name"], "flat");
        assert_eq!(doc["series"][1]["values"][4], 2.0);
    }

    #[test]
    fn json_writes_singularities_as_null() {
        let grid = Grid::new(0.0, 1.0, 0.5).unwrap();
        let s = DensitySeries::new("u", vec![f64::INFINITY, 0.6, f64::INFINITY]);
        let out = JsonRenderer.render(&grid, &[&s]).unwrap();
        let doc: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert!(doc["series"][0]["values"][0].is_null());
    }

    #[test]
    fn chart_dimensions_and_legend() {
        let (grid, flat, ramp) = fixture();
        let chart = AsciiChartRenderer::new(10, 5)
            .render(&grid, &[&flat, &ramp])
            .unwrap();
        let lines: Vec<&str> = chart.lines().collect();
        // 5 plot rows + axis + x labels + 2 legend lines
        assert_eq!(lines.len(), 9);
        assert!(lines[0].starts_with("   2.000 |"));
        assert!(lines[5].ends_with(&"-".repeat(10)));
        assert!(lines[7].contains(". flat"));
        assert!(lines[8].contains("* ramp, doubled"));
        // ramp peaks in the top-right corner
        assert_eq!(lines[0].chars().last(), Some('*'));
    }

    #[test]
    fn misaligned_series_are_rejected() {
        let (grid, _, _) = fixture();
        let short = DensitySeries::new("short", vec![1.0; 3]);
        for kind in [RenderKind::Json, RenderKind::Csv, RenderKind::Chart] {
            let err = kind.renderer().render(&grid, &[&short]).unwrap_err();
            assert!(matches!(
                err,
                CoreError::Approx(ApproxError::LengthMismatch { expected: 5, actual: 3 })
            ));
        }
    }

    mod props {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #![proptest_config(ProptestConfig::with_cases(64))]

            #[test]
            fn csv_and_chart_shapes(step in 0.01..0.5f64, width in 2usize..120, height in 2usize..40) {
                let grid = Grid::unit(step).unwrap();
                let a = grid.map("a", |x| x * (1.0 - x));
                let b = grid.map("b", |x| x * x);

                let csv = CsvRenderer.render(&grid, &[&a, &b]).unwrap();
                prop_assert_eq!(csv.lines().count(), grid.len() + 1);

                let chart = AsciiChartRenderer::new(width, height).render(&grid, &[&a, &b]).unwrap();
                // plot rows, axis, x labels, one legend line per series
                prop_assert_eq!(chart.lines().count(), height + 2 + 2);
            }
        }
    }
}
