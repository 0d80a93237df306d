//! CSV dataset loader.
//!
//! Every `*.csv` file in the data directory is read in name order. The
//! first row is the header; the text and label columns are looked up by
//! name:
//! ```csv
//! COMMENT_ID,AUTHOR,DATE,CONTENT,CLASS
//! z12x,Someone,2014-01-19,Check out my channel!,1
//! ```

use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};

use csv::ReaderBuilder;
use serde::{Deserialize, Serialize};

use crate::error::{Result, SpamCheckError};

/// One labelled message. `label` is 1 for spam and 0 for ham.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabeledText {
    pub text: String,
    pub label: u8,
}

impl LabeledText {
    pub fn new<S: Into<String>>(text: S, label: u8) -> Self {
        LabeledText {
            text: text.into(),
            label,
        }
    }

    pub fn is_spam(&self) -> bool {
        self.label == 1
    }
}

/// Reads labelled messages from CSV files.
#[derive(Debug, Clone)]
pub struct CsvDatasetLoader {
    text_column: String,
    label_column: String,
    delimiter: u8,
}

impl Default for CsvDatasetLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl CsvDatasetLoader {
    /// Loader for `CONTENT`/`CLASS` comma-separated files.
    pub fn new() -> Self {
        CsvDatasetLoader {
            text_column: "CONTENT".to_string(),
            label_column: "CLASS".to_string(),
            delimiter: b',',
        }
    }

    /// Set the name of the text column.
    pub fn with_text_column<S: Into<String>>(mut self, column: S) -> Self {
        self.text_column = column.into();
        self
    }

    /// Set the name of the label column.
    pub fn with_label_column<S: Into<String>>(mut self, column: S) -> Self {
        self.label_column = column.into();
        self
    }

    /// Set a custom delimiter character.
    pub fn with_delimiter(mut self, delimiter: char) -> Self {
        self.delimiter = delimiter as u8;
        self
    }

    /// The CSV files of a directory, sorted by name.
    pub fn csv_files(dir: &Path) -> Result<Vec<PathBuf>> {
        let entries = fs::read_dir(dir).map_err(|e| {
            SpamCheckError::dataset(format!("cannot read data directory {}: {e}", dir.display()))
        })?;

        let mut files = Vec::new();
        for entry in entries {
            let path = entry?.path();
            let is_csv = path
                .extension()
                .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"));
            if path.is_file() && is_csv {
                files.push(path);
            }
        }
        files.sort();
        Ok(files)
    }

    /// Load and concatenate every CSV file in `dir`.
    pub fn load_dir(&self, dir: &Path) -> Result<Vec<LabeledText>> {
        let files = Self::csv_files(dir)?;
        if files.is_empty() {
            return Err(SpamCheckError::dataset(format!(
                "no CSV files found in {}",
                dir.display()
            )));
        }

        let mut examples = Vec::new();
        for path in &files {
            let file = fs::File::open(path)?;
            let loaded = self.load_reader(file, &path.display().to_string())?;
            log::info!("loaded {} examples from {}", loaded.len(), path.display());
            examples.extend(loaded);
        }

        Ok(examples)
    }

    /// Load one CSV document. `source` names it in log messages.
    pub fn load_reader<R: Read>(&self, reader: R, source: &str) -> Result<Vec<LabeledText>> {
        let mut reader = ReaderBuilder::new()
            .delimiter(self.delimiter)
            .flexible(true)
            .from_reader(reader);

        let headers = reader.headers()?.clone();
        let column = |name: &str| {
            headers
                .iter()
                .position(|header| header.trim() == name)
                .ok_or_else(|| {
                    SpamCheckError::dataset(format!("{source}: missing column '{name}'"))
                })
        };
        let text_idx = column(&self.text_column)?;
        let label_idx = column(&self.label_column)?;

        let mut examples = Vec::new();
        for (row, record) in reader.records().enumerate() {
            let record = record?;
            let (Some(text), Some(label)) = (record.get(text_idx), record.get(label_idx)) else {
                log::warn!("{source}: row {} is missing fields, skipping", row + 1);
                continue;
            };

            match label.trim().parse::<u8>() {
                Ok(label @ (0 | 1)) => examples.push(LabeledText::new(text, label)),
                _ => log::warn!(
                    "{source}: row {} has label '{label}', expected 0 or 1, skipping",
                    row + 1
                ),
            }
        }

        Ok(examples)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use tempfile::TempDir;

    #[test]
    fn test_load_reader() {
        let csv = "COMMENT_ID,CONTENT,CLASS\n\
                   a,\"Check out my channel, free stuff\",1\n\
                   b,Nice song,0\n\
                   c,Broken label,spam\n";

        let examples = CsvDatasetLoader::new()
            .load_reader(csv.as_bytes(), "inline")
            .unwrap();

        assert_eq!(
            examples,
            vec![
                LabeledText::new("Check out my channel, free stuff", 1),
                LabeledText::new("Nice song", 0),
            ]
        );
    }

    #[test]
    fn test_missing_column() {
        let err = CsvDatasetLoader::new()
            .load_reader("TEXT,CLASS\nhello,0\n".as_bytes(), "inline")
            .unwrap_err();
        assert!(matches!(err, SpamCheckError::Dataset(_)));
    }

    #[test]
    fn test_custom_columns() {
        let examples = CsvDatasetLoader::new()
            .with_text_column("body")
            .with_label_column("spam")
            .with_delimiter(';')
            .load_reader("body;spam\nhi there;0\n".as_bytes(), "inline")
            .unwrap();
        assert_eq!(examples, vec![LabeledText::new("hi there", 0)]);
    }

    #[test]
    fn test_load_dir_sorted() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("b.csv"), "CONTENT,CLASS\nsecond,0\n").unwrap();
        fs::write(dir.path().join("a.csv"), "CONTENT,CLASS\nfirst,1\n").unwrap();
        fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

        let examples = CsvDatasetLoader::new().load_dir(dir.path()).unwrap();

        let texts: Vec<&str> = examples.iter().map(|e| e.text.as_str()).collect();
        assert_eq!(texts, vec!["first", "second"]);
    }

    #[test]
    fn test_empty_dir() {
        let dir = TempDir::new().unwrap();
        let err = CsvDatasetLoader::new().load_dir(dir.path()).unwrap_err();
        assert!(matches!(err, SpamCheckError::Dataset(_)));
    }
}
