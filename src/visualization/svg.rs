//! SVG rendering of violin and swarm plots

use super::kde::GaussianKde;
use super::PlotSurface;
use crate::error::{CompareError, Result};
use std::fmt::{self, Write as _};
use std::path::Path;
use tracing::debug;

const MARGIN_LEFT: f64 = 64.0;
const MARGIN_RIGHT: f64 = 24.0;
const MARGIN_TOP: f64 = 48.0;
const MARGIN_BOTTOM: f64 = 48.0;
const MARKER_RADIUS: f64 = 4.0;
const KDE_POINTS: usize = 100;
const KDE_CUT: f64 = 2.0;
const N_TICKS: usize = 5;

#[derive(Debug, Clone)]
enum Layer {
    Violin { label: String, values: Vec<f64> },
    Swarm { label: String, values: Vec<f64> },
}

impl Layer {
    fn label(&self) -> &str {
        match self {
            Layer::Violin { label, .. } | Layer::Swarm { label, .. } => label,
        }
    }

    fn values(&self) -> &[f64] {
        match self {
            Layer::Violin { values, .. } | Layer::Swarm { values, .. } => values,
        }
    }
}

/// A plot surface that renders to a standalone SVG document
#[derive(Debug, Clone)]
pub struct SvgSurface {
    width: u32,
    height: u32,
    title: Option<String>,
    layers: Vec<Layer>,
}

impl SvgSurface {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            title: None,
            layers: Vec::new(),
        }
    }

    /// Number of violin and swarm layers drawn so far
    pub fn layer_count(&self) -> usize {
        self.layers.len()
    }

    /// Category labels in order of first appearance
    pub fn categories(&self) -> Vec<&str> {
        let mut categories: Vec<&str> = Vec::new();
        for layer in &self.layers {
            if !categories.contains(&layer.label()) {
                categories.push(layer.label());
            }
        }
        categories
    }

    /// Render the SVG document
    pub fn render(&self) -> String {
        self.to_string()
    }

    /// Render and write the SVG document to `path`
    pub fn save(&self, path: &Path) -> Result<()> {
        std::fs::write(path, self.render())?;
        debug!(path = %path.display(), layers = self.layers.len(), "Saved plot");
        Ok(())
    }

    /// Padded value range over every layer
    fn value_range(&self) -> (f64, f64) {
        let all = self.layers.iter().flat_map(|l| l.values().iter().copied());
        let (min, max) = all.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
            (lo.min(v), hi.max(v))
        });
        if !min.is_finite() || !max.is_finite() {
            return (0.0, 1.0);
        }
        let pad = if max > min { (max - min) * 0.15 } else { 0.05 };
        (min - pad, max + pad)
    }

    fn push(&mut self, layer: Layer) -> Result<()> {
        let values = layer.values();
        if values.is_empty() {
            return Err(CompareError::PlotError(format!(
                "no values to draw for '{}'",
                layer.label()
            )));
        }
        if values.iter().any(|v| !v.is_finite()) {
            return Err(CompareError::PlotError(format!(
                "non-finite value in '{}'",
                layer.label()
            )));
        }
        self.layers.push(layer);
        Ok(())
    }
}

impl Default for SvgSurface {
    fn default() -> Self {
        Self::new(640, 480)
    }
}

impl fmt::Display for SvgSurface {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let width = self.width as f64;
        let height = self.height as f64;
        let plot_w = (width - MARGIN_LEFT - MARGIN_RIGHT).max(1.0);
        let plot_h = (height - MARGIN_TOP - MARGIN_BOTTOM).max(1.0);

        let (y_min, y_max) = self.value_range();
        let to_px = |v: f64| MARGIN_TOP + plot_h * (1.0 - (v - y_min) / (y_max - y_min));

        let categories = self.categories();
        let band = plot_w / categories.len().max(1) as f64;
        let center_of = |label: &str| {
            let idx = categories.iter().position(|c| *c == label).unwrap_or(0);
            MARGIN_LEFT + band * (idx as f64 + 0.5)
        };

        writeln!(
            f,
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}">"#,
            w = self.width,
            h = self.height
        )?;
        writeln!(f, r#"<rect width="100%" height="100%" fill="white"/>"#)?;

        if let Some(title) = &self.title {
            writeln!(
                f,
                r#"<text x="{:.1}" y="{:.1}" text-anchor="middle" font-family="sans-serif" font-size="16">{}</text>"#,
                width / 2.0,
                MARGIN_TOP / 2.0 + 6.0,
                escape(title)
            )?;
        }

        // Y axis with ticks
        writeln!(
            f,
            r#"<line x1="{x:.1}" y1="{t:.1}" x2="{x:.1}" y2="{b:.1}" stroke="black"/>"#,
            x = MARGIN_LEFT,
            t = MARGIN_TOP,
            b = MARGIN_TOP + plot_h
        )?;
        for i in 0..N_TICKS {
            let v = y_min + (y_max - y_min) * i as f64 / (N_TICKS - 1) as f64;
            let y = to_px(v);
            writeln!(
                f,
                r#"<line x1="{:.1}" y1="{y:.1}" x2="{:.1}" y2="{y:.1}" stroke="black"/>"#,
                MARGIN_LEFT - 4.0,
                MARGIN_LEFT
            )?;
            writeln!(
                f,
                r#"<text x="{:.1}" y="{:.1}" text-anchor="end" font-family="sans-serif" font-size="11">{:.3}</text>"#,
                MARGIN_LEFT - 7.0,
                y + 4.0,
                v
            )?;
        }

        for label in &categories {
            writeln!(
                f,
                r#"<text x="{:.1}" y="{:.1}" text-anchor="middle" font-family="sans-serif" font-size="12">{}</text>"#,
                center_of(label),
                MARGIN_TOP + plot_h + 20.0,
                escape(label)
            )?;
        }

        for layer in &self.layers {
            let cx = center_of(layer.label());
            match layer {
                Layer::Violin { values, .. } => render_violin(&mut *f, values, cx, band * 0.4, &to_px)?,
                Layer::Swarm { values, .. } => render_swarm(&mut *f, values, cx, &to_px)?,
            }
        }

        writeln!(f, "</svg>")
    }
}

impl PlotSurface for SvgSurface {
    fn set_title(&mut self, title: &str) {
        self.title = Some(title.to_string());
    }

    fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    fn violin(&mut self, label: &str, values: &[f64]) -> Result<()> {
        self.push(Layer::Violin {
            label: label.to_string(),
            values: values.to_vec(),
        })
    }

    fn swarm(&mut self, label: &str, values: &[f64]) -> Result<()> {
        self.push(Layer::Swarm {
            label: label.to_string(),
            values: values.to_vec(),
        })
    }
}

fn render_violin(
    out: &mut dyn fmt::Write,
    values: &[f64],
    cx: f64,
    half_width: f64,
    to_px: &dyn Fn(f64) -> f64,
) -> fmt::Result {
    let kde = match GaussianKde::new(values) {
        Some(kde) => kde,
        None => {
            // All values equal: the density collapses to a line
            let y = to_px(values[0]);
            return writeln!(
                out,
                r##"<line x1="{:.1}" y1="{y:.1}" x2="{:.1}" y2="{y:.1}" stroke="#4c72b0" stroke-width="2"/>"##,
                cx - half_width,
                cx + half_width
            );
        }
    };

    let grid = kde.grid(KDE_POINTS, KDE_CUT);
    let peak = grid.iter().map(|(_, d)| *d).fold(0.0f64, f64::max);
    if peak <= 0.0 {
        return Ok(());
    }

    out.write_str(r#"<path d=""#)?;
    for (i, (v, d)) in grid.iter().enumerate() {
        let cmd = if i == 0 { 'M' } else { 'L' };
        write!(out, "{}{:.2},{:.2} ", cmd, cx + half_width * d / peak, to_px(*v))?;
    }
    for (v, d) in grid.iter().rev() {
        write!(out, "L{:.2},{:.2} ", cx - half_width * d / peak, to_px(*v))?;
    }
    writeln!(out, r##"Z" fill="#a1c9f4" fill-opacity="0.7" stroke="#4c72b0"/>"##)
}

/// Marker centers such that no two overlap, nudged sideways from `cx`
fn swarm_layout(values: &[f64], cx: f64, to_px: &dyn Fn(f64) -> f64) -> Vec<(f64, f64)> {
    let diameter = MARKER_RADIUS * 2.0;
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

    let mut placed: Vec<(f64, f64)> = Vec::with_capacity(sorted.len());
    for v in sorted {
        let y = to_px(v);
        let mut k = 0usize;
        let x = loop {
            // 0, +d, -d, +2d, -2d, ...
            let step = ((k + 1) / 2) as f64 * diameter;
            let candidate = if k % 2 == 1 { cx + step } else { cx - step };
            let clear = placed
                .iter()
                .all(|(px, py)| ((px - candidate).powi(2) + (py - y).powi(2)).sqrt() >= diameter - 1e-9);
            if clear {
                break candidate;
            }
            k += 1;
        };
        placed.push((x, y));
    }
    placed
}

fn render_swarm(out: &mut dyn fmt::Write, values: &[f64], cx: f64, to_px: &dyn Fn(f64) -> f64) -> fmt::Result {
    for (x, y) in swarm_layout(values, cx, to_px) {
        writeln!(
            out,
            r##"<circle cx="{:.2}" cy="{:.2}" r="{:.1}" fill="#333333"/>"##,
            x, y, MARKER_RADIUS
        )?;
    }
    Ok(())
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_contains_layers() {
        let mut surface = SvgSurface::default();
        surface.set_title("Logistic <baseline>");
        surface.violin("Logistic", &[0.7, 0.8, 0.75, 0.9]).unwrap();
        surface.swarm("Logistic", &[0.7, 0.8, 0.75, 0.9]).unwrap();

        let svg = surface.render();
        assert!(svg.starts_with("<svg"));
        assert!(svg.contains("Logistic &lt;baseline&gt;"));
        assert!(svg.contains("<path"));
        assert_eq!(svg.matches("<circle").count(), 4);
        assert_eq!(surface.categories(), vec!["Logistic"]);
    }

    #[test]
    fn test_identical_values_draw_a_line() {
        let mut surface = SvgSurface::default();
        surface.violin("Dummy", &[0.75; 5]).unwrap();
        surface.swarm("Dummy", &[0.75; 5]).unwrap();

        let svg = surface.render();
        assert!(!svg.contains("<path"));
        assert_eq!(svg.matches("<circle").count(), 5);
    }

    #[test]
    fn test_swarm_markers_do_not_overlap() {
        let placed = swarm_layout(&[0.5, 0.5, 0.5], 100.0, &|v| v * 100.0);
        let xs: Vec<f64> = placed.iter().map(|(x, _)| *x).collect();
        assert_eq!(xs, vec![100.0, 108.0, 92.0]);

        let mut svg = String::new();
        render_swarm(&mut svg, &[0.5, 0.5, 0.5], 100.0, &|v| v * 100.0).unwrap();
        let cxs: Vec<&str> = svg.lines().map(|l| l.split('"').nth(1).unwrap()).collect();
        assert_eq!(cxs, vec!["100.00", "108.00", "92.00"]);
    }

    /// Accepts a fixed number of bytes, then refuses every write
    struct Limited {
        remaining: usize,
    }

    impl fmt::Write for Limited {
        fn write_str(&mut self, s: &str) -> fmt::Result {
            if s.len() > self.remaining {
                return Err(fmt::Error);
            }
            self.remaining -= s.len();
            Ok(())
        }
    }

    #[test]
    fn test_write_errors_propagate() {
        let mut surface = SvgSurface::default();
        surface.violin("Tree", &[0.6, 0.7, 0.8]).unwrap();
        surface.swarm("Tree", &[0.6, 0.7, 0.8]).unwrap();
        let full = surface.render();

        let mut sink = Limited { remaining: full.len() };
        assert!(write!(sink, "{}", surface).is_ok());

        let mut short = Limited { remaining: full.len() - 1 };
        assert!(write!(short, "{}", surface).is_err());

        let mut layer_sink = Limited { remaining: 10 };
        assert!(render_swarm(&mut layer_sink, &[0.5, 0.6], 100.0, &|v| v * 100.0).is_err());
        assert!(render_violin(&mut layer_sink, &[0.5, 0.6, 0.9], 100.0, 20.0, &|v| v * 100.0).is_err());
    }

    #[test]
    fn test_rejects_bad_values() {
        let mut surface = SvgSurface::default();
        assert!(surface.violin("x", &[]).is_err());
        assert!(surface.swarm("x", &[f64::NAN]).is_err());
        assert_eq!(surface.layer_count(), 0);
    }

    #[test]
    fn test_save_writes_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("plot.svg");

        let mut surface = SvgSurface::default();
        surface.swarm("a", &[0.1, 0.2]).unwrap();
        surface.save(&path).unwrap();

        let written = std::fs::read_to_string(&path).unwrap();
        assert!(written.contains("</svg>"));
    }
}
