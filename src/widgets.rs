//! Widget payloads produced by metric renderers.
//!
//! Metrics describe their visual presentation as plain data: headers,
//! counters, tables, histograms and tab groups. Drawing those widgets
//! is the job of an external rendering frontend; this crate only hands
//! over the serializable tree.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::distribution::Distribution;

/// A single labelled figure shown in a counter row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CounterData {
    /// Short caption under the figure.
    pub label: String,
    /// Preformatted figure text.
    pub value: String,
}

impl CounterData {
    /// Creates a counter from a label and preformatted value.
    pub fn new(label: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            value: value.into(),
        }
    }
}

/// A named histogram series inside a histogram widget.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistogramSeries {
    /// Legend name of the series.
    pub name: String,
    /// Binned data to plot.
    pub distribution: Distribution,
}

impl HistogramSeries {
    /// Creates a named series from a distribution.
    pub fn new(name: impl Into<String>, distribution: Distribution) -> Self {
        Self {
            name: name.into(),
            distribution,
        }
    }
}

/// One tab inside a tab group widget.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TabData {
    /// Tab caption.
    pub title: String,
    /// Widget shown when the tab is active.
    pub widget: WidgetInfo,
}

impl TabData {
    /// Creates a tab wrapping a widget.
    pub fn new(title: impl Into<String>, widget: WidgetInfo) -> Self {
        Self {
            title: title.into(),
            widget,
        }
    }
}

/// A renderable widget described as data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum WidgetInfo {
    /// A section heading.
    Header {
        /// Heading text.
        label: String,
    },
    /// A row of labelled figures.
    Counters {
        /// Figures shown left to right.
        counters: Vec<CounterData>,
    },
    /// A small table of values.
    Table {
        /// Table caption.
        title: String,
        /// Header cells.
        column_names: Vec<String>,
        /// Row cells, one inner vector per row.
        rows: Vec<Vec<Value>>,
    },
    /// One or two histogram series with an optional highlighted band.
    Histogram {
        /// Plot caption.
        title: String,
        /// Main series.
        primary: HistogramSeries,
        /// Comparison series, when a baseline exists.
        secondary: Option<HistogramSeries>,
        /// Left edge of the highlighted band.
        left: Option<f64>,
        /// Right edge of the highlighted band.
        right: Option<f64>,
    },
    /// A group of widgets shown one at a time.
    Tabs {
        /// Group caption.
        title: String,
        /// Tabs in display order.
        tabs: Vec<TabData>,
    },
}

impl WidgetInfo {
    /// Creates a section heading.
    pub fn header(label: impl Into<String>) -> Self {
        Self::Header {
            label: label.into(),
        }
    }

    /// Creates a counter row.
    pub fn counters(counters: Vec<CounterData>) -> Self {
        Self::Counters { counters }
    }

    /// Creates a table widget.
    pub fn table(
        title: impl Into<String>,
        column_names: Vec<String>,
        rows: Vec<Vec<Value>>,
    ) -> Self {
        Self::Table {
            title: title.into(),
            column_names,
            rows,
        }
    }

    /// Creates a tab group.
    pub fn tabs(title: impl Into<String>, tabs: Vec<TabData>) -> Self {
        Self::Tabs {
            title: title.into(),
            tabs,
        }
    }
}
