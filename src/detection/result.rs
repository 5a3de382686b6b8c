//! Key estimates and per-file reports

use serde::Serialize;

use super::key::Key;

/// How clearly the winning key stands out from the runner-up
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Confidence {
    /// Silence, or a near tie
    Low,
    Medium,
    High,
}

impl Confidence {
    /// Grade the score margin between the best and second-best key.
    pub fn from_margin(margin: f64) -> Self {
        match margin {
            m if m >= 0.05 => Confidence::High,
            m if m >= 0.01 => Confidence::Medium,
            _ => Confidence::Low,
        }
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            Confidence::Low => "?",
            Confidence::Medium => "~",
            Confidence::High => "✓",
        }
    }
}

/// Outcome of classifying one recording or session.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KeyEstimate {
    pub key: Key,
    /// Cosine similarity of the winning key (0 for silence)
    pub score: f64,
    /// Number of analysis hops averaged into `chroma`
    pub hops: usize,
    /// Similarity of every key, in classifier order
    pub scores: Vec<(Key, f64)>,
    /// Time-averaged chroma vector, 72 bands
    pub chroma: Vec<f64>,
}

impl KeyEstimate {
    /// Keys sorted by descending score, at most `n` of them.
    pub fn ranked(&self, n: usize) -> Vec<(Key, f64)> {
        let mut ranked = self.scores.clone();
        ranked.sort_by(|a, b| b.1.total_cmp(&a.1));
        ranked.truncate(n);
        ranked
    }

    /// Winning score minus the best score of any other key.
    pub fn margin(&self) -> f64 {
        let runner_up = self
            .scores
            .iter()
            .filter(|(key, _)| *key != self.key)
            .map(|(_, score)| *score)
            .fold(f64::NEG_INFINITY, f64::max);
        if runner_up.is_finite() {
            self.score - runner_up
        } else {
            0.0
        }
    }

    pub fn confidence(&self) -> Confidence {
        if self.key.is_silence() {
            return Confidence::Low;
        }
        Confidence::from_margin(self.margin())
    }
}

/// Report for one analysed file, as printed or serialised by the CLI.
#[derive(Debug, Clone, Serialize)]
pub struct FileReport {
    pub file_path: String,
    pub sample_rate: u32,
    pub channels: usize,
    pub duration_secs: f64,
    pub key: Key,
    pub key_name: String,
    pub short_name: String,
    pub score: f64,
    pub confidence: Confidence,
    /// Top-ranked alternatives, only filled in verbose mode
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub alternatives: Vec<(String, f64)>,
}

impl FileReport {
    pub fn new(
        file_path: impl Into<String>,
        sample_rate: u32,
        channels: usize,
        duration_secs: f64,
        estimate: &KeyEstimate,
    ) -> Self {
        Self {
            file_path: file_path.into(),
            sample_rate,
            channels,
            duration_secs,
            key: estimate.key,
            key_name: estimate.key.name(),
            short_name: estimate.key.short_name(),
            score: estimate.score,
            confidence: estimate.confidence(),
            alternatives: Vec::new(),
        }
    }

    /// Attach the `n` best keys after the winner.
    pub fn with_alternatives(mut self, estimate: &KeyEstimate, n: usize) -> Self {
        self.alternatives = estimate
            .ranked(n + 1)
            .into_iter()
            .filter(|(key, _)| *key != estimate.key)
            .take(n)
            .map(|(key, score)| (key.name(), score))
            .collect();
        self
    }
}
