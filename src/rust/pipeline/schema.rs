//! Field names and the feature column layout shared by training and inference.
//!
//! The column order produced here is the contract the scaler and classifier
//! were fitted against. Changing it requires bumping [`FeatureSchema::VERSION`]
//! and re-exporting the bundle.

pub mod field {
    pub const DESCRIPTION: &str = "Description";
    pub const TIME_OF_STOP: &str = "Time Of Stop";
    pub const LATITUDE: &str = "Latitude";
    pub const LONGITUDE: &str = "Longitude";
    pub const POINTS: &str = "Points";
    pub const ACCIDENT: &str = "Accident";
    pub const PERSONAL_INJURY: &str = "Personal Injury";
    pub const PROPERTY_DAMAGE: &str = "Property Damage";
    pub const FATAL: &str = "Fatal";
    pub const WORK_ZONE: &str = "Work Zone";
    pub const ALCOHOL: &str = "Alcohol";
    pub const HAZMAT: &str = "HAZMAT";
    pub const COMMERCIAL_LICENSE: &str = "Commercial License";
    pub const COMMERCIAL_VEHICLE: &str = "Commercial Vehicle";
    pub const VEHICLE_TYPE: &str = "VehicleType";
    pub const VIOLATION_TYPE: &str = "Violation Type";
    pub const MAKE: &str = "Make";
    pub const COLOR: &str = "Color";
    pub const DRIVER_STATE: &str = "Driver State";
    pub const DL_STATE: &str = "DL State";
    pub const MANUFACTURE_YEAR: &str = "Manufacture Year";
    pub const SUB_AGENCY: &str = "SubAgency";
}

/// Every field a record must carry, in reporting order.
pub const REQUIRED_FIELDS: [&str; 22] = [
    field::DESCRIPTION,
    field::TIME_OF_STOP,
    field::LATITUDE,
    field::LONGITUDE,
    field::POINTS,
    field::ACCIDENT,
    field::PERSONAL_INJURY,
    field::PROPERTY_DAMAGE,
    field::FATAL,
    field::WORK_ZONE,
    field::ALCOHOL,
    field::HAZMAT,
    field::COMMERCIAL_LICENSE,
    field::COMMERCIAL_VEHICLE,
    field::VEHICLE_TYPE,
    field::VIOLATION_TYPE,
    field::MAKE,
    field::COLOR,
    field::DRIVER_STATE,
    field::DL_STATE,
    field::MANUFACTURE_YEAR,
    field::SUB_AGENCY,
];

/// Severity flags in canonical order. A bundle's boolean fields must start with these.
pub const SEVERITY_FIELDS: [&str; 7] = [
    field::ACCIDENT,
    field::PERSONAL_INJURY,
    field::PROPERTY_DAMAGE,
    field::FATAL,
    field::WORK_ZONE,
    field::ALCOHOL,
    field::HAZMAT,
];

/// Categorical fields encoded into the vector, in column order.
pub const ENCODED_FIELDS: [&str; 5] = [
    field::VIOLATION_TYPE,
    field::VEHICLE_TYPE,
    field::SUB_AGENCY,
    field::MAKE,
    field::COLOR,
];

/// Leading numeric columns, in column order.
pub const BASE_COLUMNS: [&str; 7] = [
    "Time_Hour",
    "Location_Cluster",
    "Severity_Score",
    "Is_Commercial",
    "Is_Local",
    "Points",
    "Vehicle_Age",
];

pub const TEXT_COLUMN_PREFIX: &str = "desc_";

/// Layout of the assembled feature vector: structured columns followed by
/// `text_dimension` text columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeatureSchema {
    text_dimension: usize,
}

impl FeatureSchema {
    pub const VERSION: u32 = 1;

    pub fn new(text_dimension: usize) -> Self {
        Self { text_dimension }
    }

    /// Width of everything before the text columns.
    pub const fn structured_width() -> usize {
        BASE_COLUMNS.len() + ENCODED_FIELDS.len() + SEVERITY_FIELDS.len()
    }

    pub fn text_dimension(&self) -> usize {
        self.text_dimension
    }

    pub fn width(&self) -> usize {
        Self::structured_width() + self.text_dimension
    }

    pub fn column_names(&self) -> Vec<String> {
        let mut names = Vec::with_capacity(self.width());
        names.extend(BASE_COLUMNS.iter().map(|c| c.to_string()));
        names.extend(ENCODED_FIELDS.iter().map(|f| format!("{}_Encoded", f)));
        names.extend(SEVERITY_FIELDS.iter().map(|f| format!("{}_Flag", f)));
        names.extend((0..self.text_dimension).map(|i| format!("{}{}", TEXT_COLUMN_PREFIX, i)));
        names
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.column_names().iter().position(|c| c == name)
    }
}
