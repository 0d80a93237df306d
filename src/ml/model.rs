//! Classifier families and the trained text pipeline.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Result, SpamCheckError};
use crate::ml::TrainingConfig;
use crate::ml::calibration::CalibratedClassifier;
use crate::ml::centroid::CentroidClassifier;
use crate::ml::classifier::{SpamClassifier, validate_probability, validate_training_set};
use crate::ml::logistic::LogisticRegression;
use crate::ml::svm::LinearSvm;
use crate::ml::tfidf::{SparseVector, TfIdfVectorizer};
use crate::normalize::CanonicalText;

/// Classifier family identifiers, as used in artifact and metrics names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModelFamily {
    /// Logistic regression.
    Logreg,
    /// Calibrated linear SVM.
    Svm,
    /// Nearest class centroid.
    Centroid,
}

impl ModelFamily {
    /// Every family, in training order.
    pub const ALL: [ModelFamily; 3] = [ModelFamily::Logreg, ModelFamily::Svm, ModelFamily::Centroid];

    /// Identifier used in file names and metrics records.
    pub fn as_str(&self) -> &'static str {
        match self {
            ModelFamily::Logreg => "logreg",
            ModelFamily::Svm => "svm",
            ModelFamily::Centroid => "centroid",
        }
    }
}

impl fmt::Display for ModelFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ModelFamily {
    type Err = SpamCheckError;

    fn from_str(s: &str) -> Result<Self> {
        ModelFamily::ALL
            .into_iter()
            .find(|family| family.as_str() == s)
            .ok_or_else(|| {
                SpamCheckError::config(format!(
                    "unknown model '{s}', expected one of logreg, svm, centroid"
                ))
            })
    }
}

/// The fitted model of one family.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum TrainedModel {
    Logistic(LogisticRegression),
    Svm(CalibratedClassifier<LinearSvm>),
    Centroid(CentroidClassifier),
}

impl TrainedModel {
    /// Fit the `family` model on already-vectorized features.
    pub fn fit(
        family: ModelFamily,
        features: &[SparseVector],
        labels: &[u8],
        dim: usize,
        config: &TrainingConfig,
    ) -> Result<Self> {
        let model = match family {
            ModelFamily::Logreg => TrainedModel::Logistic(LogisticRegression::fit(
                features,
                labels,
                dim,
                &config.logistic,
            )?),
            ModelFamily::Svm => TrainedModel::Svm(CalibratedClassifier::fit(
                features,
                labels,
                config.calibration_folds,
                config.seed,
                |x, y| LinearSvm::fit(x, y, dim, &config.svm, config.seed),
            )?),
            ModelFamily::Centroid => TrainedModel::Centroid(CentroidClassifier::fit(
                features,
                labels,
                dim,
                config.centroid_sharpness,
            )?),
        };
        Ok(model)
    }

    /// Which family this model belongs to.
    pub fn family(&self) -> ModelFamily {
        match self {
            TrainedModel::Logistic(_) => ModelFamily::Logreg,
            TrainedModel::Svm(_) => ModelFamily::Svm,
            TrainedModel::Centroid(_) => ModelFamily::Centroid,
        }
    }

    /// Spam probability for one feature vector.
    pub fn predict_probability(&self, x: &SparseVector) -> f64 {
        match self {
            TrainedModel::Logistic(model) => model.predict_probability(x),
            TrainedModel::Svm(model) => model.predict_probability(x),
            TrainedModel::Centroid(model) => model.predict_probability(x),
        }
    }
}

/// A fitted vectorizer together with the model trained on its features.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TextClassifier {
    vectorizer: TfIdfVectorizer,
    model: TrainedModel,
}

impl TextClassifier {
    /// Fit the vectorizer and a `family` model on canonical texts.
    pub fn fit(
        family: ModelFamily,
        texts: &[CanonicalText],
        labels: &[u8],
        config: &TrainingConfig,
    ) -> Result<Self> {
        validate_training_set(texts, labels)?;

        let mut vectorizer = TfIdfVectorizer::new(config.tfidf.clone())?;
        let features = vectorizer.fit_transform(texts)?;
        let model = TrainedModel::fit(
            family,
            &features,
            labels,
            vectorizer.vocabulary_size(),
            config,
        )?;

        log::info!(
            "trained {family} on {} examples with {} features",
            texts.len(),
            vectorizer.vocabulary_size()
        );

        Ok(TextClassifier { vectorizer, model })
    }

    /// Reassemble a classifier from stored parts.
    pub fn from_parts(vectorizer: TfIdfVectorizer, model: TrainedModel) -> Self {
        TextClassifier { vectorizer, model }
    }

    /// Split into the vectorizer and the model.
    pub fn into_parts(self) -> (TfIdfVectorizer, TrainedModel) {
        (self.vectorizer, self.model)
    }

    /// Which family the model belongs to.
    pub fn family(&self) -> ModelFamily {
        self.model.family()
    }

    pub fn vectorizer(&self) -> &TfIdfVectorizer {
        &self.vectorizer
    }

    pub fn model(&self) -> &TrainedModel {
        &self.model
    }

    /// Spam probabilities for a batch of canonical texts.
    pub fn predict_all(&self, texts: &[CanonicalText]) -> Result<Vec<f64>> {
        texts
            .iter()
            .map(|text| self.predict_probability(text))
            .collect()
    }
}

impl SpamClassifier for TextClassifier {
    fn predict_probability(&self, text: &CanonicalText) -> Result<f64> {
        let features = self.vectorizer.transform(text)?;
        validate_probability(self.model.predict_probability(&features))
    }

    fn name(&self) -> &str {
        self.family().as_str()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalize::Normalizer;

    fn corpus() -> (Vec<CanonicalText>, Vec<u8>) {
        let spam = [
            "check out my channel for free gifts",
            "free gifts on my channel click here",
            "subscribe to my channel for free money",
            "click here for free money now",
            "win free money on my channel",
            "free money click here subscribe",
        ];
        let ham = [
            "this song is beautiful",
            "i love this song so much",
            "the video brings back memories",
            "beautiful voice in this song",
            "this video is amazing memories",
            "love the voice and the song",
        ];

        let normalizer = Normalizer::basic().unwrap();
        let mut texts = Vec::new();
        let mut labels = Vec::new();
        for (s, h) in spam.iter().zip(ham.iter()) {
            texts.push(normalizer.normalize(s).unwrap());
            labels.push(1);
            texts.push(normalizer.normalize(h).unwrap());
            labels.push(0);
        }
        (texts, labels)
    }

    #[test]
    fn test_family_parsing() {
        assert_eq!("svm".parse::<ModelFamily>().unwrap(), ModelFamily::Svm);
        assert_eq!(ModelFamily::Centroid.to_string(), "centroid");
        assert!("spacy".parse::<ModelFamily>().is_err());
    }

    #[test]
    fn test_every_family_learns_corpus() {
        let (texts, labels) = corpus();
        let normalizer = Normalizer::basic().unwrap();
        let spam = normalizer.normalize("free money on my channel, click here").unwrap();
        let ham = normalizer.normalize("beautiful song and voice").unwrap();

        for family in ModelFamily::ALL {
            let classifier =
                TextClassifier::fit(family, &texts, &labels, &TrainingConfig::default()).unwrap();

            assert_eq!(classifier.family(), family);
            assert_eq!(classifier.name(), family.as_str());

            let p_spam = classifier.predict_probability(&spam).unwrap();
            let p_ham = classifier.predict_probability(&ham).unwrap();
            assert!(p_spam > p_ham, "{family}: spam {p_spam} <= ham {p_ham}");
        }
    }

    #[test]
    fn test_fit_rejects_single_class() {
        let (texts, _) = corpus();
        let labels = vec![1; texts.len()];
        let err = TextClassifier::fit(
            ModelFamily::Logreg,
            &texts,
            &labels,
            &TrainingConfig::default(),
        )
        .unwrap_err();
        assert!(matches!(err, SpamCheckError::InvalidInput(_)));
    }

    #[test]
    fn test_bincode_round_trip_preserves_predictions() {
        let (texts, labels) = corpus();
        let classifier =
            TextClassifier::fit(ModelFamily::Svm, &texts, &labels, &TrainingConfig::default())
                .unwrap();

        let bytes = bincode::serialize(&classifier).unwrap();
        let restored: TextClassifier = bincode::deserialize(&bytes).unwrap();

        assert_eq!(
            restored.predict_all(&texts).unwrap(),
            classifier.predict_all(&texts).unwrap()
        );
    }
}
