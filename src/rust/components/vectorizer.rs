use std::collections::{HashMap, HashSet};
use lazy_static::lazy_static;
use ndarray::Array1;
use regex::Regex;
use serde::{Deserialize, Serialize};

use super::utils::{l1_normalize, l2_normalize};
use super::TextVectorizer;
use crate::pipeline::PipelineError;

lazy_static! {
    // Words of two or more characters.
    static ref TOKEN_PATTERN: Regex = Regex::new(r"\b\w\w+\b").unwrap();
}

/// Row normalisation applied after weighting.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TermNorm {
    #[default]
    L2,
    L1,
    None,
}

/// TF-IDF vectorizer over a fitted vocabulary.
///
/// Text is lowercased, split into word tokens of at least two characters,
/// stripped of stop words and expanded into word n-grams. Each vocabulary
/// term gets `tf * idf`, where `tf` is the raw count (or `1 + ln(count)` with
/// sublinear scaling), and the row is then normalised. Terms outside the
/// vocabulary are ignored.
#[derive(Debug, Clone)]
pub struct TfidfVectorizer {
    vocabulary: HashMap<String, usize>,
    idf: Array1<f64>,
    ngram_range: (usize, usize),
    sublinear_tf: bool,
    norm: TermNorm,
    lowercase: bool,
    stop_words: HashSet<String>,
}

impl TfidfVectorizer {
    /// # Errors
    /// - `BundleError` if `idf` and the vocabulary differ in size, or a term
    ///   index is out of range or shared by two terms
    pub fn new(vocabulary: HashMap<String, usize>, idf: Vec<f64>) -> Result<Self, PipelineError> {
        if vocabulary.len() != idf.len() {
            return Err(PipelineError::BundleError(format!(
                "Vectorizer vocabulary has {} terms but {} idf weights",
                vocabulary.len(),
                idf.len()
            )));
        }
        let mut seen = vec![false; idf.len()];
        for (term, &index) in &vocabulary {
            if index >= idf.len() || seen[index] {
                return Err(PipelineError::BundleError(format!(
                    "Vectorizer term '{}' has invalid column {}",
                    term, index
                )));
            }
            seen[index] = true;
        }

        Ok(Self {
            vocabulary,
            idf: Array1::from(idf),
            ngram_range: (1, 1),
            sublinear_tf: false,
            norm: TermNorm::L2,
            lowercase: true,
            stop_words: HashSet::new(),
        })
    }

    pub fn with_ngram_range(mut self, min_n: usize, max_n: usize) -> Result<Self, PipelineError> {
        if min_n == 0 || min_n > max_n {
            return Err(PipelineError::BundleError(format!(
                "Invalid n-gram range ({}, {})",
                min_n, max_n
            )));
        }
        self.ngram_range = (min_n, max_n);
        Ok(self)
    }

    pub fn with_sublinear_tf(mut self, sublinear_tf: bool) -> Self {
        self.sublinear_tf = sublinear_tf;
        self
    }

    pub fn with_norm(mut self, norm: TermNorm) -> Self {
        self.norm = norm;
        self
    }

    pub fn with_lowercase(mut self, lowercase: bool) -> Self {
        self.lowercase = lowercase;
        self
    }

    pub fn with_stop_words(mut self, stop_words: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.stop_words = stop_words.into_iter().map(Into::into).collect();
        self
    }

    /// Token and n-gram sequence for `text`, before vocabulary lookup.
    pub fn analyze(&self, text: &str) -> Vec<String> {
        let text = if self.lowercase { text.to_lowercase() } else { text.to_string() };
        let tokens: Vec<&str> = TOKEN_PATTERN
            .find_iter(&text)
            .map(|m| m.as_str())
            .filter(|t| !self.stop_words.contains(*t))
            .collect();

        let (min_n, max_n) = self.ngram_range;
        let mut terms = Vec::new();
        for n in min_n..=max_n {
            if n > tokens.len() {
                break;
            }
            terms.extend(tokens.windows(n).map(|w| w.join(" ")));
        }
        terms
    }
}

impl TextVectorizer for TfidfVectorizer {
    fn dimension(&self) -> usize {
        self.idf.len()
    }

    fn transform(&self, text: &str) -> Result<Array1<f64>, PipelineError> {
        let mut counts: HashMap<usize, f64> = HashMap::new();
        for term in self.analyze(text) {
            if let Some(&index) = self.vocabulary.get(&term) {
                *counts.entry(index).or_insert(0.0) += 1.0;
            }
        }

        let mut row = Array1::zeros(self.dimension());
        for (index, count) in counts {
            let tf = if self.sublinear_tf { 1.0 + count.ln() } else { count };
            row[index] = tf * self.idf[index];
        }

        Ok(match self.norm {
            TermNorm::L2 => l2_normalize(&row),
            TermNorm::L1 => l1_normalize(&row),
            TermNorm::None => row,
        })
    }
}
