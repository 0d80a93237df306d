//! Class-ratio variants and stratified train/test splits.

use std::fmt;
use std::str::FromStr;

use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};

use crate::dataset::loader::LabeledText;
use crate::error::{Result, SpamCheckError};

/// Share of the minority class in the resampled variants.
const MINORITY_SHARE: f64 = 0.20;

/// How the loaded data is resampled before splitting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum SplitVariant {
    /// The data as loaded.
    #[serde(rename = "basic")]
    Basic,
    /// All ham, spam sampled down to 20% of the set.
    #[serde(rename = "80-20")]
    HamMajority,
    /// All spam, ham sampled down to 20% of the set.
    #[serde(rename = "20-80")]
    SpamMajority,
}

impl SplitVariant {
    pub const ALL: [SplitVariant; 3] = [
        SplitVariant::Basic,
        SplitVariant::HamMajority,
        SplitVariant::SpamMajority,
    ];

    /// Identifier used in artifact and metrics file names.
    pub fn as_str(&self) -> &'static str {
        match self {
            SplitVariant::Basic => "basic",
            SplitVariant::HamMajority => "80-20",
            SplitVariant::SpamMajority => "20-80",
        }
    }

    /// Resample `examples` for this variant and split them.
    pub fn split(
        &self,
        examples: &[LabeledText],
        test_size: f64,
        seed: u64,
    ) -> Result<TrainTestSplit> {
        if !(test_size > 0.0 && test_size < 1.0) {
            return Err(SpamCheckError::config(format!(
                "test_size must be within (0, 1), got {test_size}"
            )));
        }

        let mut rng = StdRng::seed_from_u64(seed);
        let (ham, spam): (Vec<&LabeledText>, Vec<&LabeledText>) =
            examples.iter().partition(|example| !example.is_spam());

        let resampled: Vec<&LabeledText> = match self {
            SplitVariant::Basic => examples.iter().collect(),
            SplitVariant::HamMajority => {
                let target = minority_target(ham.len());
                let mut set = ham;
                set.extend(sample(spam, target, &mut rng));
                set.shuffle(&mut rng);
                set
            }
            SplitVariant::SpamMajority => {
                let target = minority_target(spam.len());
                let mut set = sample(ham, target, &mut rng);
                set.extend(spam);
                set.shuffle(&mut rng);
                set
            }
        };

        log::info!(
            "variant {self}: {} of {} examples kept",
            resampled.len(),
            examples.len()
        );

        stratified_split(&resampled, test_size, &mut rng)
    }
}

impl fmt::Display for SplitVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SplitVariant {
    type Err = SpamCheckError;

    fn from_str(s: &str) -> Result<Self> {
        SplitVariant::ALL
            .into_iter()
            .find(|variant| variant.as_str() == s)
            .ok_or_else(|| {
                SpamCheckError::config(format!(
                    "unknown variant '{s}', expected one of basic, 80-20, 20-80"
                ))
            })
    }
}

/// Minority examples needed so they make up 20% next to `majority` others.
fn minority_target(majority: usize) -> usize {
    (majority as f64 * MINORITY_SHARE / (1.0 - MINORITY_SHARE)).floor() as usize
}

/// Random sample of at most `n` items without replacement.
fn sample<'a>(
    mut items: Vec<&'a LabeledText>,
    n: usize,
    rng: &mut StdRng,
) -> Vec<&'a LabeledText> {
    items.shuffle(rng);
    items.truncate(n);
    items
}

/// Train and test partitions of one variant.
#[derive(Debug, Clone, Default)]
pub struct TrainTestSplit {
    pub train: Vec<LabeledText>,
    pub test: Vec<LabeledText>,
}

impl TrainTestSplit {
    pub fn train_texts(&self) -> Vec<&str> {
        self.train.iter().map(|e| e.text.as_str()).collect()
    }

    pub fn train_labels(&self) -> Vec<u8> {
        self.train.iter().map(|e| e.label).collect()
    }

    pub fn test_texts(&self) -> Vec<&str> {
        self.test.iter().map(|e| e.text.as_str()).collect()
    }

    pub fn test_labels(&self) -> Vec<u8> {
        self.test.iter().map(|e| e.label).collect()
    }
}

/// Hold out `test_size` of each class, keeping at least one example of a
/// class on each side when the class has two or more.
fn stratified_split(
    examples: &[&LabeledText],
    test_size: f64,
    rng: &mut StdRng,
) -> Result<TrainTestSplit> {
    if examples.is_empty() {
        return Err(SpamCheckError::dataset("no examples to split"));
    }

    let mut split = TrainTestSplit::default();
    for class in [0u8, 1] {
        let mut members: Vec<&LabeledText> = examples
            .iter()
            .copied()
            .filter(|example| example.label == class)
            .collect();
        members.shuffle(rng);

        let n = members.len();
        let mut n_test = (n as f64 * test_size).round() as usize;
        if n >= 2 {
            n_test = n_test.clamp(1, n - 1);
        }

        let (test, train) = members.split_at(n_test.min(n));
        split.test.extend(test.iter().map(|&e| e.clone()));
        split.train.extend(train.iter().map(|&e| e.clone()));
    }

    split.train.shuffle(rng);
    split.test.shuffle(rng);

    Ok(split)
}
