use std::collections::HashMap;

use super::CategoricalEncoder;
use crate::pipeline::PipelineError;

/// Vocabulary encoder: the code of a class is its position in `classes`.
#[derive(Debug, Clone)]
pub struct LabelEncoder {
    classes: Vec<String>,
    index: HashMap<String, usize>,
}

impl LabelEncoder {
    /// Builds an encoder from the fitted vocabulary.
    ///
    /// # Errors
    /// - `BundleError` if the vocabulary is empty or repeats a class
    pub fn new(classes: Vec<impl Into<String>>) -> Result<Self, PipelineError> {
        let classes: Vec<String> = classes.into_iter().map(Into::into).collect();
        if classes.is_empty() {
            return Err(PipelineError::BundleError("Encoder vocabulary cannot be empty".into()));
        }

        let mut index = HashMap::with_capacity(classes.len());
        for (code, class) in classes.iter().enumerate() {
            if index.insert(class.clone(), code).is_some() {
                return Err(PipelineError::BundleError(format!(
                    "Encoder vocabulary repeats class '{}'",
                    class
                )));
            }
        }

        Ok(Self { classes, index })
    }
}

impl CategoricalEncoder for LabelEncoder {
    fn classes(&self) -> &[String] {
        &self.classes
    }

    fn encode(&self, value: &str) -> Option<usize> {
        self.index.get(value).copied()
    }
}
