//! Visualization module: score distribution plots.
//!
//! Plots are drawn onto a [`PlotSurface`]. [`SvgSurface`] renders to a
//! standalone SVG document.

pub mod kde;
pub mod svg;

pub use kde::GaussianKde;
pub use svg::SvgSurface;

use crate::error::Result;

/// A drawing target that accepts categorical distribution plots
pub trait PlotSurface {
    /// Replace the plot title
    fn set_title(&mut self, title: &str);

    /// Current title, if one was set
    fn title(&self) -> Option<&str>;

    /// Draw a violin (mirrored density) of `values` in category `label`
    fn violin(&mut self, label: &str, values: &[f64]) -> Result<()>;

    /// Draw one non-overlapping marker per value in category `label`
    fn swarm(&mut self, label: &str, values: &[f64]) -> Result<()>;
}
