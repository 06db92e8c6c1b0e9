use std::ops::Index;
use std::path::Path;
use std::sync::Arc;
use once_cell::sync::Lazy;
use regex::Regex;
use crate::utils;

/// Card ranks and suits in the order the deck model was trained with.
pub const CARD_LABELS: [&str; 52] = [
    "10C", "10D", "10H", "10S",
    "2C", "2D", "2H", "2S",
    "3C", "3D", "3H", "3S",
    "4C", "4D", "4H", "4S",
    "5C", "5D", "5H", "5S",
    "6C", "6D", "6H", "6S",
    "7C", "7D", "7H", "7S",
    "8C", "8D", "8H", "8S",
    "9C", "9D", "9H", "9S",
    "AC", "AD", "AH", "AS",
    "JC", "JD", "JH", "JS",
    "KC", "KD", "KH", "KS",
    "QC", "QD", "QH", "QS",
];

static CARD_TABLE: Lazy<Arc<LabelTable>> = Lazy::new(|| Arc::new(LabelTable::new(&CARD_LABELS)));

/// Ordered, index-addressed class labels. Never mutated once built.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LabelTable {
    labels: Box<[String]>,
}

impl LabelTable {
    pub fn new<S: AsRef<str>>(labels: &[S]) -> Self {
        Self {
            labels: labels.iter().map(|l| l.as_ref().to_string()).collect(),
        }
    }

    /// Process-wide 52-card table.
    pub fn cards() -> &'static LabelTable {
        CARD_TABLE.as_ref()
    }

    /// Another handle on [`LabelTable::cards`], for pipelines that hold their labels in an `Arc`.
    pub fn shared_cards() -> Arc<LabelTable> {
        Arc::clone(&CARD_TABLE)
    }

    /// Reads one label per line, skipping blank lines.
    pub fn from_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let lines = utils::file_to_vec(path.as_ref())?;
        let labels: Vec<String> = lines
            .into_iter()
            .map(|l| l.trim().to_string())
            .filter(|l| !l.is_empty())
            .collect();
        if labels.is_empty() {
            anyhow::bail!("Label file {} contains no labels", path.as_ref().display());
        }
        log::info!("Loaded {} labels from {}", labels.len(), path.as_ref().display());
        Ok(Self::new(&labels))
    }

    /// Parses the `names` entry exported in model metadata.
    ///
    /// String format: `{0: '10C', 1: '10D', 2: "2C", ...}`
    pub fn from_metadata(names: &str) -> anyhow::Result<Self> {
        let re = Regex::new(r#"(\d+)\s*:\s*(['"])([-()\w '"]+?)(['"])"#)?;
        let mut indexed: Vec<(usize, String)> = Vec::new();
        for (_, [id, _, name, _]) in re.captures_iter(names).map(|c| c.extract()) {
            indexed.push((id.parse()?, name.to_string()));
        }
        if indexed.is_empty() {
            anyhow::bail!("No class names found in model metadata");
        }
        indexed.sort_by_key(|(id, _)| *id);
        for (expected, (id, _)) in indexed.iter().enumerate() {
            if *id != expected {
                anyhow::bail!("Model metadata class ids are not contiguous: expected {}, found {}", expected, id);
            }
        }
        let labels: Vec<String> = indexed.into_iter().map(|(_, name)| name).collect();
        Ok(Self::new(&labels))
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn get(&self, class_id: usize) -> Option<&str> {
        self.labels.get(class_id).map(String::as_str)
    }

    pub fn position(&self, label: &str) -> Option<usize> {
        self.labels.iter().position(|l| l == label)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.labels.iter().map(String::as_str)
    }
}

impl Index<usize> for LabelTable {
    type Output = str;

    fn index(&self, class_id: usize) -> &str {
        &self.labels[class_id]
    }
}
