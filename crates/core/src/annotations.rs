//! Chart annotations for a pressure test.
//!
//! An [`AnnotationSet`] is a declarative list of overlays (points, labels, lines and
//! shaded bands) keyed by id, rebuilt in full from the test on every request. Entries
//! are added in a fixed precedence:
//!
//! 1. anomaly markers (`anomaly{i}`) when highlighting anomalies
//! 2. per note `k`: `point{k}`, `label{k}` and a vertical `line{k}`
//! 3. `meanLine`
//! 4. `targetLine` (target pressure, or 75% of the series maximum)
//! 5. `normalRange` when both bounds are set
//! 6. `comparisonDate` when a comparison series is shown

use crate::color::hex_to_rgba;
use crate::constants::DEFAULT_TARGET_RATIO;
use crate::stats::{compute_stats, point_change, StatsResult};
use crate::time::{format_date, seconds_to_human_readable};
use crate::CoreError;
use records::TestRecord;
use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

const ANOMALY_FILL: &str = "rgba(255, 99, 132, 0.7)";
const ANOMALY_BORDER: &str = "rgba(255, 99, 132, 1)";
const MEAN_COLOUR: &str = "rgba(255, 159, 64, 0.7)";
const TARGET_COLOUR: &str = "rgba(46, 134, 193, 0.8)";
const RANGE_FILL: &str = "rgba(144, 238, 144, 0.2)";
const RANGE_BORDER: &str = "rgba(144, 238, 144, 0.8)";

const ANOMALY_RADIUS: u8 = 5;
const NOTE_RADIUS: u8 = 6;

/// Which statistic to emphasise on the chart.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Highlight {
    #[default]
    None,
    Anomalies,
}

impl FromStr for Highlight {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "" | "none" => Ok(Highlight::None),
            "anomalies" => Ok(Highlight::Anomalies),
            other => Err(CoreError::InvalidInput(format!(
                "unknown highlight mode '{other}' (expected 'none' or 'anomalies')"
            ))),
        }
    }
}

/// Line rendering style for the pressure dataset.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartStyle {
    #[default]
    Smooth,
    Stepped,
    Linear,
}

impl ChartStyle {
    pub fn tension(self) -> f64 {
        match self {
            ChartStyle::Smooth => 0.4,
            ChartStyle::Stepped => 0.0,
            ChartStyle::Linear => 0.1,
        }
    }

    pub fn stepped(self) -> bool {
        self == ChartStyle::Stepped
    }
}

impl FromStr for ChartStyle {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "" | "smooth" => Ok(ChartStyle::Smooth),
            "stepped" => Ok(ChartStyle::Stepped),
            "linear" => Ok(ChartStyle::Linear),
            other => Err(CoreError::InvalidInput(format!(
                "unknown chart type '{other}' (expected 'smooth', 'stepped' or 'linear')"
            ))),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Font {
    pub size: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weight: Option<String>,
}

impl Font {
    fn regular(size: u32) -> Self {
        Self { size, weight: None }
    }

    fn bold(size: u32) -> Self {
        Self {
            size,
            weight: Some("bold".into()),
        }
    }
}

/// Caption attached to a line or band.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnnotationLabel {
    pub display: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub background_color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font: Option<Font>,
}

impl AnnotationLabel {
    fn hidden() -> Self {
        Self::default()
    }

    fn at_start(content: String, background: &str, font: Font) -> Self {
        Self {
            display: true,
            content: Some(content),
            position: Some("start".into()),
            background_color: Some(background.into()),
            color: None,
            font: Some(font),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PointAnnotation {
    pub x_value: f64,
    pub y_value: f64,
    pub background_color: String,
    pub border_color: String,
    pub border_width: u32,
    pub radius: u32,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LabelAnnotation {
    pub x_value: f64,
    pub y_value: f64,
    pub content: String,
    pub background_color: String,
    pub color: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub border_color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub border_width: Option<u32>,
    pub border_radius: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub x_adjust: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub y_adjust: Option<i32>,
    pub font: Font,
    pub padding: u32,
}

/// A vertical (`x_min == x_max`) or horizontal (`y_min == y_max`) line.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LineAnnotation {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub x_min: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub x_max: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub y_min: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub y_max: Option<f64>,
    pub border_color: String,
    pub border_width: u32,
    pub border_dash: Vec<u32>,
    pub label: AnnotationLabel,
}

/// A horizontal shaded band spanning the full x range.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BandAnnotation {
    pub y_min: f64,
    pub y_max: f64,
    pub background_color: String,
    pub border_color: String,
    pub border_width: u32,
    pub label: AnnotationLabel,
}

/// One chart overlay instruction, tagged by `type` on the wire.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Annotation {
    Point(PointAnnotation),
    Label(LabelAnnotation),
    Line(LineAnnotation),
    #[serde(rename = "box")]
    Band(BandAnnotation),
}

/// Annotations keyed by id, in insertion order. Serialises as a JSON object.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct AnnotationSet {
    entries: Vec<(String, Annotation)>,
}

impl AnnotationSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace the annotation with this id. Replacement keeps the original slot.
    pub fn insert(&mut self, id: impl Into<String>, annotation: Annotation) {
        let id = id.into();
        match self.entries.iter_mut().find(|(key, _)| *key == id) {
            Some(slot) => slot.1 = annotation,
            None => self.entries.push((id, annotation)),
        }
    }

    pub fn get(&self, id: &str) -> Option<&Annotation> {
        self.entries
            .iter()
            .find(|(key, _)| key == id)
            .map(|(_, annotation)| annotation)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(key, _)| key.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Annotation)> {
        self.entries
            .iter()
            .map(|(key, annotation)| (key.as_str(), annotation))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Serialize for AnnotationSet {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (key, annotation) in &self.entries {
            map.serialize_entry(key, annotation)?;
        }
        map.end()
    }
}

/// Dataset rendering hints derived from the chosen [`ChartStyle`].
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct DatasetStyle {
    pub tension: f64,
    pub stepped: bool,
}

impl From<ChartStyle> for DatasetStyle {
    fn from(style: ChartStyle) -> Self {
        Self {
            tension: style.tension(),
            stepped: style.stepped(),
        }
    }
}

/// Everything a chart needs besides the raw series.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartOverlay {
    pub stats: Option<StatsResult>,
    pub annotations: AnnotationSet,
    /// Marker radius per sample; 0 hides the marker.
    pub point_radius: Vec<u8>,
    pub tooltips: Vec<PointTooltip>,
    pub style: DatasetStyle,
}

/// Hover text for one sample.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct PointTooltip {
    /// `Time 1m 5s`, with ` - Note Available` when a note sits on the sample.
    pub title: String,
    /// Change from the previous sample; absent for the first.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub change: Option<String>,
}

/// Build the annotation set for a test.
///
/// `stats` should be [`compute_stats`] of `test.data_points`; without it there is no
/// mean line and no anomaly markers.
pub fn build_annotations(
    test: &TestRecord,
    stats: Option<&StatsResult>,
    highlight: Highlight,
    compare_with: Option<&TestRecord>,
) -> AnnotationSet {
    let mut annotations = AnnotationSet::new();

    if highlight == Highlight::Anomalies {
        for &index in stats.map(|s| s.anomalies.as_slice()).unwrap_or_default() {
            let Some(&value) = test.data_points.get(index) else {
                continue;
            };
            annotations.insert(
                format!("anomaly{index}"),
                Annotation::Point(PointAnnotation {
                    x_value: index as f64,
                    y_value: value,
                    background_color: ANOMALY_FILL.into(),
                    border_color: ANOMALY_BORDER.into(),
                    border_width: 2,
                    radius: 6,
                }),
            );
        }
    }

    for (k, note) in test.notes.iter().enumerate() {
        let x = note.timestamp as f64;
        let colour = note.color.as_ref();

        annotations.insert(
            format!("point{k}"),
            Annotation::Point(PointAnnotation {
                x_value: x,
                y_value: note.pressure,
                background_color: hex_to_rgba(colour, 0.7),
                border_color: hex_to_rgba(colour, 1.0),
                border_width: 2,
                radius: 6,
            }),
        );

        annotations.insert(
            format!("label{k}"),
            Annotation::Label(LabelAnnotation {
                x_value: x,
                y_value: note.pressure,
                content: note.note.clone(),
                background_color: "white".into(),
                color: "#333".into(),
                border_color: Some(hex_to_rgba(colour, 1.0)),
                border_width: Some(1),
                border_radius: 4,
                position: Some("top".into()),
                x_adjust: Some(0),
                y_adjust: Some(-15),
                font: Font::regular(12),
                padding: 6,
            }),
        );

        annotations.insert(
            format!("line{k}"),
            Annotation::Line(LineAnnotation {
                x_min: Some(x),
                x_max: Some(x),
                y_min: None,
                y_max: None,
                border_color: hex_to_rgba(colour, 0.5),
                border_width: 1,
                border_dash: vec![5, 5],
                label: AnnotationLabel::hidden(),
            }),
        );
    }

    if let Some(stats) = stats {
        let mean = stats.mean_value();
        annotations.insert(
            "meanLine",
            horizontal_line(mean, MEAN_COLOUR, format!("Mean: {}", stats.mean)),
        );
    }

    let target = test
        .target_pressure
        .filter(|t| *t != 0.0)
        .or_else(|| test.max_point().map(|max| max * DEFAULT_TARGET_RATIO));
    if let Some(target) = target {
        annotations.insert(
            "targetLine",
            horizontal_line(target, TARGET_COLOUR, "Target".into()),
        );
    }

    let low = test.normal_range_low.filter(|v| *v != 0.0);
    let high = test.normal_range_high.filter(|v| *v != 0.0);
    if let (Some(low), Some(high)) = (low, high) {
        let mut label =
            AnnotationLabel::at_start("Normal Range".into(), RANGE_BORDER, Font::regular(11));
        label.color = Some("#000".into());
        annotations.insert(
            "normalRange",
            Annotation::Band(BandAnnotation {
                y_min: low,
                y_max: high,
                background_color: RANGE_FILL.into(),
                border_color: RANGE_BORDER.into(),
                border_width: 1,
                label,
            }),
        );
    }

    if let Some(other) = compare_with {
        if let Some(max) = other.max_point() {
            annotations.insert(
                "comparisonDate",
                Annotation::Label(LabelAnnotation {
                    x_value: other.data_points.len() as f64 / 2.0,
                    y_value: max,
                    content: format!(
                        "Comparison: {}",
                        format_date(other.created_at.as_deref())
                    ),
                    background_color: ANOMALY_FILL.into(),
                    color: "white".into(),
                    border_color: None,
                    border_width: None,
                    border_radius: 4,
                    position: None,
                    x_adjust: None,
                    y_adjust: None,
                    font: Font::bold(12),
                    padding: 6,
                }),
            );
        }
    }

    annotations
}

/// Marker radius for every sample: notes win over highlighted anomalies.
pub fn point_radii(
    test: &TestRecord,
    stats: Option<&StatsResult>,
    highlight: Highlight,
) -> Vec<u8> {
    let mut radii = vec![0u8; test.data_points.len()];

    if highlight == Highlight::Anomalies {
        for &index in stats.map(|s| s.anomalies.as_slice()).unwrap_or_default() {
            if let Some(radius) = radii.get_mut(index) {
                *radius = ANOMALY_RADIUS;
            }
        }
    }

    for note in &test.notes {
        if let Ok(index) = usize::try_from(note.timestamp) {
            if let Some(radius) = radii.get_mut(index) {
                *radius = NOTE_RADIUS;
            }
        }
    }

    radii
}

/// Compute stats, annotations and marker radii for one chart.
pub fn build_overlay(
    test: &TestRecord,
    highlight: Highlight,
    style: ChartStyle,
    compare_with: Option<&TestRecord>,
) -> ChartOverlay {
    let stats = compute_stats(&test.data_points);
    let annotations = build_annotations(test, stats.as_ref(), highlight, compare_with);
    let point_radius = point_radii(test, stats.as_ref(), highlight);
    let tooltips = point_tooltips(test, &point_radius);
    tracing::debug!(
        annotations = annotations.len(),
        points = test.data_points.len(),
        "built chart overlay"
    );

    ChartOverlay {
        stats,
        annotations,
        point_radius,
        tooltips,
        style: style.into(),
    }
}

/// One tooltip per sample. Samples are one second apart.
pub fn point_tooltips(test: &TestRecord, radii: &[u8]) -> Vec<PointTooltip> {
    (0..test.data_points.len())
        .map(|index| {
            let time = seconds_to_human_readable(index as f64);
            let title = if radii.get(index) == Some(&NOTE_RADIUS) {
                format!("Time {time} - Note Available")
            } else {
                format!("Time {time}")
            };
            PointTooltip {
                title,
                change: point_change(&test.data_points, index),
            }
        })
        .collect()
}

fn horizontal_line(y: f64, colour: &str, caption: String) -> Annotation {
    Annotation::Line(LineAnnotation {
        x_min: None,
        x_max: None,
        y_min: Some(y),
        y_max: Some(y),
        border_color: colour.into(),
        border_width: 2,
        border_dash: vec![5, 5],
        label: AnnotationLabel::at_start(caption, colour, Font::bold(12)),
    })
}
