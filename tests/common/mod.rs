#![allow(dead_code)]

use std::collections::HashMap;
use env_logger::{Builder, Env};
use finecast::components::{KMeansAssigner, LabelEncoder, LinearClassifier, MultiClass, StandardScaler, TfidfVectorizer};
use finecast::pipeline::schema::{field, ENCODED_FIELDS, SEVERITY_FIELDS};
use finecast::{ArtifactBundle, FeatureSchema, RawRecord};
use serde_json::{json, Value};

pub const CURRENT_YEAR: i32 = 2025;
pub const LABELS: [&str; 3] = ["Warning", "Low", "High"];
pub const TERMS: [&str; 6] = ["speed", "exceeding", "limit", "failure", "stop", "sign"];
pub const IDF: [f64; 6] = [1.2, 1.5, 1.1, 1.8, 1.4, 1.6];
pub const CENTROIDS: [[f64; 2]; 3] = [[39.08, -77.15], [38.98, -77.10], [39.17, -77.20]];

pub const POINTS_COLUMN: usize = 5;
pub const SEVERITY_COLUMN: usize = 2;

// Initialize test logger
pub fn init() {
    let _ = Builder::from_env(Env::default().default_filter_or("warn")).try_init();
}

pub fn width() -> usize {
    FeatureSchema::new(TERMS.len()).width()
}

pub fn boolean_fields() -> Vec<&'static str> {
    let mut fields = SEVERITY_FIELDS.to_vec();
    fields.extend([field::COMMERCIAL_LICENSE, field::COMMERCIAL_VEHICLE]);
    fields
}

pub fn vocabularies() -> Vec<(&'static str, Vec<&'static str>)> {
    vec![
        (field::VIOLATION_TYPE, vec!["Citation", "ESERO", "Warning"]),
        (field::VEHICLE_TYPE, vec!["02 - Automobile", "05 - Light Duty Truck"]),
        (field::SUB_AGENCY, vec!["1st District, Rockville", "2nd District, Bethesda"]),
        (field::MAKE, vec!["FORD", "HONDA", "TOYOTA"]),
        (field::COLOR, vec!["BLACK", "SILVER", "WHITE"]),
    ]
}

/// "Warning" is the baseline, "Low" grows with points and "High" with severity.
pub fn coefficients() -> (Vec<Vec<f64>>, Vec<f64>) {
    let mut low = vec![0.0; width()];
    low[POINTS_COLUMN] = 0.5;
    let mut high = vec![0.0; width()];
    high[SEVERITY_COLUMN] = 2.0;
    (vec![vec![0.0; width()], low, high], vec![1.0, 0.0, -1.0])
}

pub fn vectorizer() -> TfidfVectorizer {
    let vocabulary: HashMap<String, usize> = TERMS
        .iter()
        .enumerate()
        .map(|(i, term)| (term.to_string(), i))
        .collect();
    TfidfVectorizer::new(vocabulary, IDF.to_vec()).unwrap()
}

fn bundle_with_weights(coef: Vec<Vec<f64>>, intercept: Vec<f64>) -> ArtifactBundle {
    let mut builder = ArtifactBundle::builder()
        .with_name("maryland-test")
        .with_boolean_fields(boolean_fields())
        .with_text_vectorizer(vectorizer())
        .with_cluster_assigner(KMeansAssigner::new(CENTROIDS.to_vec()).unwrap())
        .with_scaler(StandardScaler::identity(width()))
        .with_classifier(LinearClassifier::new(coef, intercept, MultiClass::Multinomial).unwrap())
        .with_class_labels(LABELS.to_vec());
    for (name, classes) in vocabularies() {
        builder = builder.add_encoder(name, LabelEncoder::new(classes).unwrap()).unwrap();
    }
    builder.build().unwrap()
}

pub fn fixture_bundle() -> ArtifactBundle {
    let (coef, intercept) = coefficients();
    bundle_with_weights(coef, intercept)
}

/// Every class scores zero, so all probabilities tie.
pub fn zero_weight_bundle() -> ArtifactBundle {
    bundle_with_weights(vec![vec![0.0; width()]; 3], vec![0.0; 3])
}

/// A complete record: evening stop in Rockville, accident and fatal flagged.
pub fn sample_record() -> RawRecord {
    RawRecord::new()
        .with(field::DESCRIPTION, "Exceeding the posted speed limit")
        .with(field::TIME_OF_STOP, "23:45")
        .with(field::LATITUDE, 39.08)
        .with(field::LONGITUDE, -77.15)
        .with(field::POINTS, 1)
        .with(field::ACCIDENT, "Yes")
        .with(field::PERSONAL_INJURY, "No")
        .with(field::PROPERTY_DAMAGE, "No")
        .with(field::FATAL, "Yes")
        .with(field::WORK_ZONE, "No")
        .with(field::ALCOHOL, "No")
        .with(field::HAZMAT, "No")
        .with(field::COMMERCIAL_LICENSE, "No")
        .with(field::COMMERCIAL_VEHICLE, "No")
        .with(field::VEHICLE_TYPE, "02 - Automobile")
        .with(field::VIOLATION_TYPE, "Citation")
        .with(field::MAKE, "TOYOTA")
        .with(field::COLOR, "SILVER")
        .with(field::DRIVER_STATE, "MD")
        .with(field::DL_STATE, "MD")
        .with(field::MANUFACTURE_YEAR, 2015)
        .with(field::SUB_AGENCY, "1st District, Rockville")
}

pub fn record_without(fields: &[&str]) -> RawRecord {
    let mut record = sample_record();
    for name in fields {
        record.remove(name);
    }
    record
}

/// `bundle.json` equivalent of [`fixture_bundle`].
pub fn manifest_json() -> Value {
    let (coef, intercept) = coefficients();
    let vocabulary: HashMap<&str, usize> = TERMS.iter().enumerate().map(|(i, t)| (*t, i)).collect();
    let encoders: HashMap<&str, Vec<&str>> = vocabularies().into_iter().collect();
    assert_eq!(encoders.len(), ENCODED_FIELDS.len());

    json!({
        "name": "maryland-test",
        "schema_version": FeatureSchema::VERSION,
        "created_at": "2025-06-01T12:00:00Z",
        "boolean_columns": boolean_fields(),
        "label_encoders": encoders,
        "tfidf": {
            "vocabulary": vocabulary,
            "idf": IDF.to_vec(),
        },
        "location_model": {"centroids": CENTROIDS.to_vec()},
        "scaler": {
            "kind": "standard",
            "mean": vec![0.0; width()],
            "scale": vec![1.0; width()],
        },
        "model": {
            "kind": "linear",
            "coef": coef,
            "intercept": intercept,
        },
        "classes": LABELS.to_vec(),
        "performance": {
            "accuracy": 0.81,
            "macro avg": {"precision": 0.7, "recall": 0.6, "f1-score": 0.65, "support": 12000},
            "weighted avg": {"precision": 0.8, "recall": 0.81, "f1-score": 0.8, "support": 12000},
        },
    })
}
