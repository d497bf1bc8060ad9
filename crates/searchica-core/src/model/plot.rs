//! The scatter-plot payload returned next to the results.
//!
//! The service produces a Plotly-style figure: a list of traces and a
//! layout. Only the first trace carries documents, and its point `i` is the
//! document at result index `i`. Nothing in the wire format enforces that,
//! so [`PlotPayload::validate_against`] checks it before a payload is shown.

use std::borrow::Cow;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Marker size the service uses when it sends a single number.
pub const DEFAULT_MARKER_SIZE: f64 = 10.0;

/// How much a hovered marker grows relative to the base size.
pub const EMPHASIS_FACTOR: f64 = 2.0;

/// A complete figure: traces plus layout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlotPayload {
    #[serde(default)]
    pub data: Vec<Trace>,
    #[serde(default)]
    pub layout: Layout,
}

/// The empty scatter shown before any search has completed.
impl Default for PlotPayload {
    fn default() -> Self {
        Self {
            data: vec![Trace::default()],
            layout: Layout::default(),
        }
    }
}

impl PlotPayload {
    /// The trace whose points correspond to the result list.
    pub fn primary_trace(&self) -> Option<&Trace> {
        self.data.first()
    }

    pub fn point_count(&self) -> usize {
        self.primary_trace().map_or(0, Trace::len)
    }

    /// Check the positional correspondence with a result list of
    /// `results` entries.
    ///
    /// The first trace must have exactly one point per result, and every
    /// per-point array it carries must line up with those points. Empty
    /// per-point arrays are allowed; they mean "use the default".
    pub fn validate_against(&self, results: usize) -> Result<()> {
        let Some(trace) = self.primary_trace() else {
            return if results == 0 {
                Ok(())
            } else {
                Err(Error::MissingTrace { results })
            };
        };

        if trace.x.len() != results {
            return Err(Error::Correspondence {
                results,
                points: trace.x.len(),
            });
        }

        let check = |field: &'static str, actual: usize, optional: bool| {
            if (optional && actual == 0) || actual == results {
                Ok(())
            } else {
                Err(Error::ParallelArray {
                    field,
                    expected: results,
                    actual,
                })
            }
        };

        check("y", trace.y.len(), false)?;
        check("marker.color", trace.marker.color.len(), true)?;
        check("marker.opacity", trace.marker.opacity.len(), true)?;
        check("hovertext", trace.hovertext.len(), true)?;
        check("customdata", trace.customdata.len(), true)?;
        if let MarkerSize::PerPoint(sizes) = &trace.marker.size {
            check("marker.size", sizes.len(), true)?;
        }
        Ok(())
    }

    /// The figure to draw while list row `hovered` is hovered.
    ///
    /// With a hover inside the first trace, that trace gets a per-point size
    /// array in which only the hovered marker is enlarged; every other marker
    /// keeps the size it already had. `self` is never
    /// modified: the emphasized figure is a copy, and without a (valid)
    /// hover the original is borrowed as is.
    #[must_use]
    pub fn with_emphasis(&self, hovered: Option<usize>) -> Cow<'_, Self> {
        let Some(index) = hovered else {
            return Cow::Borrowed(self);
        };
        let Some(trace) = self.primary_trace() else {
            return Cow::Borrowed(self);
        };
        if index >= trace.len() {
            return Cow::Borrowed(self);
        }

        let sizes = (0..trace.len())
            .map(|i| {
                let size = trace.marker.size_at(i);
                if i == index { size * EMPHASIS_FACTOR } else { size }
            })
            .collect();

        let mut emphasized = self.clone();
        emphasized.data[0].marker.size = MarkerSize::PerPoint(sizes);
        Cow::Owned(emphasized)
    }
}

/// One scatter trace.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Trace {
    pub x: Vec<f64>,
    pub y: Vec<f64>,
    pub mode: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub marker: Marker,
    pub customdata: Vec<serde_json::Value>,
    pub hovertext: Vec<String>,
    pub hoverinfo: String,
}

impl Default for Trace {
    fn default() -> Self {
        Self {
            x: Vec::new(),
            y: Vec::new(),
            mode: "markers".to_string(),
            kind: "scatter".to_string(),
            marker: Marker::default(),
            customdata: Vec::new(),
            hovertext: Vec::new(),
            hoverinfo: "text".to_string(),
        }
    }
}

impl Trace {
    pub fn len(&self) -> usize {
        self.x.len().min(self.y.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn points(&self) -> impl DoubleEndedIterator<Item = (f64, f64)> + ExactSizeIterator + '_ {
        self.x.iter().copied().zip(self.y.iter().copied())
    }

    pub fn point(&self, index: usize) -> Option<(f64, f64)> {
        Some((*self.x.get(index)?, *self.y.get(index)?))
    }

    /// Hover text for a point, split on the `<br>` line breaks the service
    /// embeds.
    pub fn hover_lines(&self, index: usize) -> Vec<String> {
        self.hovertext
            .get(index)
            .map(|text| {
                text.replace("<br/>", "<br>")
                    .replace("<br />", "<br>")
                    .split("<br>")
                    .map(|line| line.trim().to_string())
                    .filter(|line| !line.is_empty())
                    .collect()
            })
            .unwrap_or_default()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Marker {
    pub color: Vec<String>,
    pub size: MarkerSize,
    pub opacity: Vec<f64>,
}

impl Default for Marker {
    fn default() -> Self {
        Self {
            color: Vec::new(),
            size: MarkerSize::Uniform(DEFAULT_MARKER_SIZE),
            opacity: Vec::new(),
        }
    }
}

impl Marker {
    /// The size every non-emphasized marker is drawn at.
    pub fn base_size(&self) -> f64 {
        match self.size {
            MarkerSize::Uniform(size) if size.is_finite() && size > 0.0 => size,
            _ => DEFAULT_MARKER_SIZE,
        }
    }

    pub fn size_at(&self, index: usize) -> f64 {
        match &self.size {
            MarkerSize::Uniform(_) => self.base_size(),
            MarkerSize::PerPoint(sizes) => sizes
                .get(index)
                .copied()
                .filter(|size| size.is_finite() && *size > 0.0)
                .unwrap_or(DEFAULT_MARKER_SIZE),
        }
    }

    pub fn color_at(&self, index: usize) -> Option<&str> {
        self.color.get(index).map(String::as_str)
    }
}

/// Plotly accepts either one size for all markers or one per point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MarkerSize {
    Uniform(f64),
    PerPoint(Vec<f64>),
}

impl Default for MarkerSize {
    fn default() -> Self {
        Self::Uniform(DEFAULT_MARKER_SIZE)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Layout {
    pub showlegend: bool,
    pub hovermode: String,
    pub xaxis: Axis,
    pub yaxis: Axis,
    pub plot_bgcolor: String,
}

impl Default for Layout {
    fn default() -> Self {
        Self {
            showlegend: false,
            hovermode: "closest".to_string(),
            xaxis: Axis::default(),
            yaxis: Axis::default(),
            plot_bgcolor: "white".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Axis {
    pub showgrid: bool,
    pub showticklabels: bool,
    pub zeroline: bool,
}
