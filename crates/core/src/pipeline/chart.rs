//! Per-capita matrix → chart series → chart configuration.

use crate::domain::chart::{
    AxisLabels, ChartConfig, ChartLabels, ChartOptions, ChartPoint, ChartSeries, Hover,
    MenuItemStyle, Navigation, PlotOptions, SeriesEntry, SplineOptions, States, Style, StyledText,
    Text, XAxis, YAxis,
};
use crate::domain::matrix::PerCapitaMatrix;
use crate::error::Result;
use crate::time::epoch::{round_to, utc_midnight_millis};

pub const CHART_VALUE_PLACES: i32 = 1;

const CHART_TYPE: &str = "spline";
const BORDER_COLOR: &str = "#9DB0AC";
const BORDER_WIDTH: u32 = 3;
const AXIS_COLOR: &str = "blue";
const LINE_WIDTH: u32 = 3;
const HOVER_LINE_WIDTH: u32 = 5;
const MENU_FONT_SIZE: &str = "10px";

/// One series per matrix column, points in ascending date order.
pub fn build_series(matrix: &PerCapitaMatrix) -> Vec<ChartSeries> {
    matrix
        .countries()
        .iter()
        .map(|country| ChartSeries {
            country: country.clone(),
            points: matrix
                .column(country)
                .map(|(date, value)| {
                    ChartPoint(utc_midnight_millis(date), round_to(*value, CHART_VALUE_PLACES))
                })
                .collect(),
        })
        .collect()
}

pub fn assemble(series: Vec<ChartSeries>, labels: &ChartLabels) -> ChartConfig {
    let axis_style = || Style {
        color: AXIS_COLOR.to_string(),
    };

    ChartConfig {
        chart: ChartOptions {
            kind: CHART_TYPE.to_string(),
            border_color: BORDER_COLOR.to_string(),
            border_width: BORDER_WIDTH,
        },
        title: Text {
            text: labels.title.clone(),
        },
        subtitle: Text {
            text: labels.subtitle.clone(),
        },
        x_axis: XAxis {
            kind: "datetime".to_string(),
        },
        y_axis: vec![YAxis {
            labels: AxisLabels {
                format: labels.y_axis_format.clone(),
                style: axis_style(),
            },
            title: StyledText {
                text: labels.y_axis_title.clone(),
                style: axis_style(),
            },
        }],
        plot_options: PlotOptions {
            spline: SplineOptions {
                line_width: LINE_WIDTH,
                states: States {
                    hover: Hover {
                        line_width: HOVER_LINE_WIDTH,
                    },
                },
            },
        },
        series: series
            .into_iter()
            .map(|s| SeriesEntry {
                name: s.country,
                data: s.points,
            })
            .collect(),
        navigation: Navigation {
            menu_item_style: MenuItemStyle {
                font_size: MENU_FONT_SIZE.to_string(),
            },
        },
    }
}

/// Serializes the chart to JSON. Dates anywhere in the structure come out as
/// `YYYY-MM-DD` strings through chrono's serde support.
pub fn to_json(chart: &ChartConfig) -> Result<String> {
    Ok(serde_json::to_string(chart)?)
}

pub fn to_json_pretty(chart: &ChartConfig) -> Result<String> {
    Ok(serde_json::to_string_pretty(chart)?)
}
