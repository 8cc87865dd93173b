use std::collections::HashMap;
use std::fmt;
use chrono::{DateTime, NaiveDateTime, NaiveTime, Timelike};
use log::debug;
use ndarray::Array1;
use serde::Serialize;

use super::config::PipelineConfig;
use super::error::{PipelineError, ValidationReport};
use super::record::{RawRecord, RawValue};
use super::schema::{field, FeatureSchema, ENCODED_FIELDS, REQUIRED_FIELDS, SEVERITY_FIELDS};
use crate::bundle::ArtifactBundle;

const TIME_FORMATS: [&str; 5] = ["%H:%M:%S", "%H:%M", "%H:%M:%S%.f", "%I:%M %p", "%I:%M:%S %p"];
const DATETIME_FORMATS: [&str; 5] = [
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
];

/// Time-of-day bucket of a stop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum TimePeriod {
    Night,
    Morning,
    Afternoon,
    Evening,
}

impl TimePeriod {
    /// Half-open buckets: `[0,6)`, `[6,12)`, `[12,18)`, `[18,24)`.
    pub fn from_hour(hour: u32) -> Self {
        match hour {
            0..=5 => Self::Night,
            6..=11 => Self::Morning,
            12..=17 => Self::Afternoon,
            _ => Self::Evening,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Night => "Night",
            Self::Morning => "Morning",
            Self::Afternoon => "Afternoon",
            Self::Evening => "Evening",
        }
    }
}

impl fmt::Display for TimePeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Engineered representation of one record.
///
/// Holds the derived values the diagnostics stage reports on, plus the
/// assembled numeric vector in [`FeatureSchema`] column order. Only the
/// pipeline builds one, so the derived values and the vector always agree.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureVector {
    time_hour: u32,
    time_period: TimePeriod,
    location_cluster: usize,
    severity_flags: [bool; 7],
    severity_score: u8,
    is_commercial: bool,
    is_local: bool,
    points: f64,
    vehicle_age: f64,
    encoded: [usize; 5],
    values: Array1<f64>,
}

impl FeatureVector {
    /// Assembled values, in schema column order.
    pub fn values(&self) -> &Array1<f64> {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn time_hour(&self) -> u32 {
        self.time_hour
    }

    pub fn time_period(&self) -> TimePeriod {
        self.time_period
    }

    pub fn location_cluster(&self) -> usize {
        self.location_cluster
    }

    /// Severity flags in [`SEVERITY_FIELDS`] order.
    pub fn severity_flags(&self) -> &[bool; 7] {
        &self.severity_flags
    }

    pub fn severity_score(&self) -> u8 {
        self.severity_score
    }

    pub fn is_commercial(&self) -> bool {
        self.is_commercial
    }

    pub fn is_local(&self) -> bool {
        self.is_local
    }

    /// NaN when the record's point value is not numeric.
    pub fn points(&self) -> f64 {
        self.points
    }

    pub fn vehicle_age(&self) -> f64 {
        self.vehicle_age
    }

    /// One code per field of [`ENCODED_FIELDS`], in that order.
    pub fn encoded(&self) -> &[usize; 5] {
        &self.encoded
    }

    /// Text columns only.
    pub fn text_features(&self) -> Array1<f64> {
        self.values.slice(ndarray::s![FeatureSchema::structured_width()..]).to_owned()
    }

    /// Names of the severity fields flagged on this record, in canonical order.
    pub fn risk_factors(&self) -> Vec<&'static str> {
        SEVERITY_FIELDS
            .iter()
            .zip(self.severity_flags.iter())
            .filter(|(_, &flag)| flag)
            .map(|(name, _)| *name)
            .collect()
    }

    fn assemble(&mut self, text: &Array1<f64>) {
        let mut values = Vec::with_capacity(FeatureSchema::structured_width() + text.len());
        values.extend([
            self.time_hour as f64,
            self.location_cluster as f64,
            self.severity_score as f64,
            bool_value(self.is_commercial),
            bool_value(self.is_local),
            self.points,
            self.vehicle_age,
        ]);
        values.extend(self.encoded.iter().map(|&code| code as f64));
        values.extend(self.severity_flags.iter().map(|&flag| bool_value(flag)));
        values.extend(text.iter().copied());
        self.values = Array1::from(values);
    }
}

fn bool_value(flag: bool) -> f64 {
    if flag { 1.0 } else { 0.0 }
}

/// Inputs that must be usable before any engineering work starts.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct CheckedInputs {
    pub hour: u32,
    pub latitude: f64,
    pub longitude: f64,
}

/// Parses a stop time into its hour of day.
pub fn parse_stop_hour(value: &RawValue) -> Option<u32> {
    let text = match value {
        RawValue::Text(s) => s.trim(),
        _ => return None,
    };

    for format in TIME_FORMATS {
        if let Ok(time) = NaiveTime::parse_from_str(text, format) {
            return Some(time.hour());
        }
    }
    for format in DATETIME_FORMATS {
        if let Ok(datetime) = NaiveDateTime::parse_from_str(text, format) {
            return Some(datetime.hour());
        }
    }
    DateTime::parse_from_rfc3339(text).ok().map(|dt| dt.hour())
}

fn check_coordinate(report: &mut ValidationReport, record: &RawRecord, name: &str, limit: f64) -> Option<f64> {
    let value = record.get(name)?;
    match value.as_number() {
        Some(v) if v.abs() <= limit => Some(v),
        Some(v) => {
            report.add_invalid(name, format!("{} is outside [-{}, {}]", v, limit, limit));
            None
        }
        None => {
            report.add_invalid(name, format!("not a coordinate: {}", value));
            None
        }
    }
}

/// Checks required fields, coordinates and stop time, reporting every problem at once.
pub(crate) fn validate_record(record: &RawRecord) -> Result<CheckedInputs, PipelineError> {
    let mut report = ValidationReport::default();
    for name in REQUIRED_FIELDS {
        if !record.contains(name) {
            report.add_missing(name);
        }
    }

    let hour = record.get(field::TIME_OF_STOP).and_then(|value| {
        let hour = parse_stop_hour(value);
        if hour.is_none() {
            report.add_invalid(field::TIME_OF_STOP, format!("unrecognised time: {}", value));
        }
        hour
    });
    let latitude = check_coordinate(&mut report, record, field::LATITUDE, 90.0);
    let longitude = check_coordinate(&mut report, record, field::LONGITUDE, 180.0);

    match (hour, latitude, longitude) {
        (Some(hour), Some(latitude), Some(longitude)) if report.is_empty() => {
            Ok(CheckedInputs { hour, latitude, longitude })
        }
        _ => Err(PipelineError::ValidationError(report)),
    }
}

/// Runs the feature-engineering stage for one record.
pub(crate) fn engineer(
    bundle: &ArtifactBundle,
    config: &PipelineConfig,
    record: &RawRecord,
) -> Result<FeatureVector, PipelineError> {
    let inputs = validate_record(record)?;
    let null = RawValue::Null;
    let get = |name: &str| record.get(name).unwrap_or(&null);

    let flags: HashMap<&str, bool> = bundle
        .boolean_fields()
        .iter()
        .map(|name| (name.as_str(), get(name).as_flag()))
        .collect();
    let flag = |name: &str| flags.get(name).copied().unwrap_or(false);

    let cluster_assigner = bundle.cluster_assigner();
    let location_cluster = cluster_assigner.assign(inputs.latitude, inputs.longitude)?;
    if location_cluster >= cluster_assigner.num_clusters() {
        return Err(PipelineError::ModelError(format!(
            "Cluster assigner returned id {} of {} clusters",
            location_cluster,
            cluster_assigner.num_clusters()
        )));
    }

    let mut severity_flags = [false; 7];
    for (slot, name) in severity_flags.iter_mut().zip(SEVERITY_FIELDS) {
        *slot = flag(name);
    }
    let severity_score = severity_flags.iter().filter(|&&f| f).count() as u8;

    let is_commercial = flag(field::COMMERCIAL_LICENSE) || flag(field::COMMERCIAL_VEHICLE);
    let is_local = get(field::DRIVER_STATE).same_as(get(field::DL_STATE));

    let mut encoded = [0usize; 5];
    for (slot, name) in encoded.iter_mut().zip(ENCODED_FIELDS) {
        let encoder = bundle
            .encoder(name)
            .ok_or_else(|| PipelineError::BundleError(format!("No encoder for '{}'", name)))?;
        *slot = encoder.encode_or_default(&get(name).as_category());
    }

    let current_year = config.resolve_current_year() as f64;
    let manufacture_year = get(field::MANUFACTURE_YEAR).as_number().unwrap_or_else(|| {
        debug!("Unparsable manufacture year {}, assuming a new vehicle", get(field::MANUFACTURE_YEAR));
        current_year
    });

    let vectorizer = bundle.text_vectorizer();
    let text = vectorizer.transform(&get(field::DESCRIPTION).as_text())?;
    if text.len() != vectorizer.dimension() {
        return Err(PipelineError::ModelError(format!(
            "Text vectorizer returned {} columns, expected {}",
            text.len(),
            vectorizer.dimension()
        )));
    }

    let mut features = FeatureVector {
        time_hour: inputs.hour,
        time_period: TimePeriod::from_hour(inputs.hour),
        location_cluster,
        severity_flags,
        severity_score,
        is_commercial,
        is_local,
        points: get(field::POINTS).as_number().unwrap_or(f64::NAN),
        vehicle_age: current_year - manufacture_year,
        encoded,
        values: Array1::zeros(0),
    };
    features.assemble(&text);
    Ok(features)
}
