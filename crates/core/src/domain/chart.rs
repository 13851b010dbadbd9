//! Chart-ready output types.
//!
//! `ChartConfig` follows the Highcharts options layout so the rendering layer
//! can hand the serialized JSON straight to the client.

use serde::{Deserialize, Serialize};

/// `[timestamp_ms, value]` on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ChartPoint(pub i64, pub f64);

impl ChartPoint {
    pub fn timestamp_ms(&self) -> i64 {
        self.0
    }

    pub fn value(&self) -> f64 {
        self.1
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartSeries {
    pub country: String,
    pub points: Vec<ChartPoint>,
}

/// Human-facing text on the chart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChartLabels {
    pub title: String,
    pub subtitle: String,
    pub y_axis_format: String,
    pub y_axis_title: String,
}

impl Default for ChartLabels {
    fn default() -> Self {
        Self {
            title: "인구 대비 COVID-19 확진자 비율".to_string(),
            subtitle: "Source: Johns Hopkins University Center for Systems Science and Engineering"
                .to_string(),
            y_axis_format: "{value} 건/백만 명".to_string(),
            y_axis_title: "누적 비율".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartConfig {
    pub chart: ChartOptions,
    pub title: Text,
    pub subtitle: Text,
    pub x_axis: XAxis,
    pub y_axis: Vec<YAxis>,
    pub plot_options: PlotOptions,
    pub series: Vec<SeriesEntry>,
    pub navigation: Navigation,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartOptions {
    #[serde(rename = "type")]
    pub kind: String,
    pub border_color: String,
    pub border_width: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Text {
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct XAxis {
    #[serde(rename = "type")]
    pub kind: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct YAxis {
    pub labels: AxisLabels,
    pub title: StyledText,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AxisLabels {
    pub format: String,
    pub style: Style,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StyledText {
    pub text: String,
    pub style: Style,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Style {
    pub color: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlotOptions {
    pub spline: SplineOptions,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SplineOptions {
    pub line_width: u32,
    pub states: States,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct States {
    pub hover: Hover,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Hover {
    pub line_width: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeriesEntry {
    pub name: String,
    pub data: Vec<ChartPoint>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Navigation {
    pub menu_item_style: MenuItemStyle,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MenuItemStyle {
    pub font_size: String,
}
