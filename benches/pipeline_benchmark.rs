use std::collections::HashMap;
use std::sync::Arc;
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use finecast::components::{
    KMeansAssigner, LabelEncoder, LinearClassifier, MultiClass, StandardScaler, TextVectorizer, TfidfVectorizer,
};
use finecast::pipeline::schema::{field, ENCODED_FIELDS, SEVERITY_FIELDS};
use finecast::{ArtifactBundle, FeatureSchema, FinePredictor, PipelineConfig, RawRecord};

const TERMS: [&str; 12] = [
    "speed", "exceeding", "limit", "failure", "stop", "sign", "driving", "vehicle", "highway", "lane",
    "signal", "registration",
];

fn vectorizer() -> TfidfVectorizer {
    let vocabulary: HashMap<String, usize> = TERMS.iter().enumerate().map(|(i, t)| (t.to_string(), i)).collect();
    TfidfVectorizer::new(vocabulary, vec![1.5; TERMS.len()])
        .unwrap()
        .with_ngram_range(1, 2)
        .unwrap()
}

fn setup_benchmark_bundle(classes: usize) -> ArtifactBundle {
    let width = FeatureSchema::new(TERMS.len()).width();
    let coef: Vec<Vec<f64>> = (0..classes)
        .map(|c| (0..width).map(|i| ((c * 31 + i * 7) % 11) as f64 / 10.0 - 0.5).collect())
        .collect();
    let labels: Vec<String> = (0..classes).map(|c| format!("class_{}", c)).collect();

    let mut boolean_fields = SEVERITY_FIELDS.to_vec();
    boolean_fields.extend([field::COMMERCIAL_LICENSE, field::COMMERCIAL_VEHICLE]);

    let mut builder = ArtifactBundle::builder()
        .with_name("benchmark")
        .with_boolean_fields(boolean_fields)
        .with_text_vectorizer(vectorizer())
        .with_cluster_assigner(
            KMeansAssigner::new(vec![[39.08, -77.15], [38.98, -77.10], [39.17, -77.20], [39.03, -76.98]]).unwrap(),
        )
        .with_scaler(StandardScaler::identity(width))
        .with_classifier(LinearClassifier::new(coef, vec![0.0; classes], MultiClass::Multinomial).unwrap())
        .with_class_labels(labels);
    for name in ENCODED_FIELDS {
        builder = builder
            .add_encoder(name, LabelEncoder::new(vec!["A", "B", "C", "D"]).unwrap())
            .unwrap();
    }
    builder.build().unwrap()
}

fn sample_record() -> RawRecord {
    let mut record = RawRecord::new()
        .with(field::DESCRIPTION, "Driving vehicle on highway exceeding the posted speed limit of 55 mph")
        .with(field::TIME_OF_STOP, "23:45:00")
        .with(field::LATITUDE, 39.05)
        .with(field::LONGITUDE, -77.12)
        .with(field::POINTS, 2)
        .with(field::DRIVER_STATE, "MD")
        .with(field::DL_STATE, "MD")
        .with(field::MANUFACTURE_YEAR, "2012")
        .with(field::COMMERCIAL_LICENSE, "No")
        .with(field::COMMERCIAL_VEHICLE, "No");
    for name in SEVERITY_FIELDS {
        record.insert(name, "No");
    }
    for name in ENCODED_FIELDS {
        record.insert(name, "B");
    }
    record
}

fn bench_text_features(c: &mut Criterion) {
    let vectorizer = vectorizer();
    let mut group = c.benchmark_group("TextFeatures");

    // Configure sampling
    group.sample_size(50);
    group.warm_up_time(std::time::Duration::from_secs(1));

    group.bench_function("short_text", |b| b.iter(|| {
        vectorizer.transform(black_box("Failure to stop at stop sign")).unwrap()
    }));

    group.bench_function("long_text", |b| b.iter(|| {
        vectorizer.transform(black_box(
            "Driving vehicle on highway exceeding the posted speed limit, failure to \
             obey lane markings, failure to display registration card upon demand by \
             police officer, and driving with signal lamps not in working order."
        )).unwrap()
    }));

    group.finish();
}

fn bench_prediction(c: &mut Criterion) {
    let mut group = c.benchmark_group("Prediction");
    group.sample_size(50);
    group.warm_up_time(std::time::Duration::from_secs(1));

    let predictor = FinePredictor::new(Arc::new(setup_benchmark_bundle(5)))
        .with_config(PipelineConfig::default().with_current_year(2025));
    let record = sample_record();

    group.bench_function("engineer", |b| b.iter(|| predictor.engineer(black_box(&record)).unwrap()));
    group.bench_function("predict", |b| b.iter(|| predictor.predict(black_box(&record)).unwrap()));

    group.finish();
}

fn bench_scaling(c: &mut Criterion) {
    let mut group = c.benchmark_group("Scaling");
    group.sample_size(50);
    group.warm_up_time(std::time::Duration::from_secs(1));

    // Test scaling with number of classes
    let record = sample_record();
    for &count in &[2, 5, 10, 20, 50] {
        let predictor = FinePredictor::new(Arc::new(setup_benchmark_bundle(count)))
            .with_config(PipelineConfig::default().with_current_year(2025));

        group.bench_function(format!("classes_{}", count), |b| b.iter(|| {
            predictor.predict(black_box(&record)).unwrap()
        }));
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_text_features,
    bench_prediction,
    bench_scaling
);
criterion_main!(benches);
