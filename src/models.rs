use std::fmt;
use std::str::FromStr;

use reqwest::Url;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{AnalysisError, SubjectError};

/// Course subject a batch of comments is filed under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Subject {
    #[default]
    #[serde(rename = "Artificial Intelligence")]
    ArtificialIntelligence,
    #[serde(rename = "Optimization Techniques")]
    OptimizationTechniques,
}

impl Subject {
    pub const ALL: [Subject; 2] = [Subject::ArtificialIntelligence, Subject::OptimizationTechniques];

    pub fn name(self) -> &'static str {
        match self {
            Subject::ArtificialIntelligence => "Artificial Intelligence",
            Subject::OptimizationTechniques => "Optimization Techniques",
        }
    }

    pub fn alias(self) -> &'static str {
        match self {
            Subject::ArtificialIntelligence => "ai",
            Subject::OptimizationTechniques => "ot",
        }
    }

    pub fn next(self) -> Self {
        let idx = Self::ALL.iter().position(|s| *s == self).unwrap_or(0);
        Self::ALL[(idx + 1) % Self::ALL.len()]
    }

    pub fn previous(self) -> Self {
        let idx = Self::ALL.iter().position(|s| *s == self).unwrap_or(0);
        Self::ALL[(idx + Self::ALL.len() - 1) % Self::ALL.len()]
    }
}

impl fmt::Display for Subject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Subject {
    type Err = SubjectError;

    /// Accepts the full name or the short alias, case-insensitively.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Self::ALL
            .into_iter()
            .find(|subject| {
                subject.name().eq_ignore_ascii_case(wanted) || subject.alias().eq_ignore_ascii_case(wanted)
            })
            .ok_or_else(|| SubjectError::Unknown(s.to_string()))
    }
}

/// Splits raw comment text into trimmed, non-blank lines, keeping their order.
pub fn normalize_comments(raw: &str) -> Vec<String> {
    raw.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_owned)
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AnalysisRequest {
    pub subject: Subject,
    pub comments: Vec<String>,
}

impl AnalysisRequest {
    pub fn new(subject: Subject, comments_text: &str) -> Self {
        Self { subject, comments: normalize_comments(comments_text) }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub summary: Value,
    pub interpretations: Vec<String>,
    pub wordcloud_url: String,
}

impl AnalysisResult {
    /// Parses a success body, rejecting anything without the three expected fields.
    pub fn from_body(body: &[u8]) -> Result<Self, AnalysisError> {
        let result: AnalysisResult =
            serde_json::from_slice(body).map_err(|e| AnalysisError::MalformedResponse(e.to_string()))?;
        if !result.summary.is_object() {
            return Err(AnalysisError::MalformedResponse("`summary` is not an object".into()));
        }
        Ok(result)
    }

    /// The backend may hand back a server-relative path; join it onto the API base.
    pub fn resolved_wordcloud_url(&self, api_base: &str) -> String {
        if Url::parse(&self.wordcloud_url).is_ok() {
            return self.wordcloud_url.clone();
        }
        Url::parse(api_base)
            .and_then(|base| base.join(&self.wordcloud_url))
            .map(|url| url.to_string())
            .unwrap_or_else(|_| self.wordcloud_url.clone())
    }
}

/// Typed view over the sentiment summary the analysis service usually sends.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct SentimentSummary {
    pub mean: Option<f64>,
    pub median: Option<f64>,
    pub count: Option<u64>,
    pub positive_pct: Option<f64>,
    pub negative_pct: Option<f64>,
    pub neutral_pct: Option<f64>,
}

impl SentimentSummary {
    /// Returns `None` unless at least one known field is present.
    pub fn from_summary(summary: &Value) -> Option<Self> {
        let parsed: SentimentSummary = serde_json::from_value(summary.clone()).ok()?;
        if parsed == SentimentSummary::default() { None } else { Some(parsed) }
    }

    pub fn headline(&self) -> String {
        let mut parts = Vec::new();
        if let Some(count) = self.count {
            parts.push(format!("{} comment{}", count, if count == 1 { "" } else { "s" }));
        }
        if let Some(mean) = self.mean {
            parts.push(format!("mean polarity {:.3}", mean));
        }
        if let Some(median) = self.median {
            parts.push(format!("median {:.3}", median));
        }
        let shares: Vec<String> = [("positive", self.positive_pct), ("negative", self.negative_pct), ("neutral", self.neutral_pct)]
            .into_iter()
            .filter_map(|(label, pct)| pct.map(|p| format!("{:.0}% {}", p * 100.0, label)))
            .collect();
        if !shares.is_empty() {
            parts.push(shares.join(" / "));
        }
        parts.join(" · ")
    }
}

/// Lifecycle of the one request the client may have outstanding.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum RequestState {
    #[default]
    Idle,
    Loading,
    Succeeded(AnalysisResult),
    Failed(AnalysisError),
}

impl RequestState {
    pub fn is_loading(&self) -> bool {
        matches!(self, RequestState::Loading)
    }

    pub fn result(&self) -> Option<&AnalysisResult> {
        match self {
            RequestState::Succeeded(result) => Some(result),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&AnalysisError> {
        match self {
            RequestState::Failed(err) => Some(err),
            _ => None,
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub enum FocusArea {
    Subject,
    #[default]
    Comments,
    Results,
}

impl FocusArea {
    pub fn next(self) -> Self {
        match self {
            FocusArea::Subject => FocusArea::Comments,
            FocusArea::Comments => FocusArea::Results,
            FocusArea::Results => FocusArea::Subject,
        }
    }

    pub fn previous(self) -> Self {
        match self {
            FocusArea::Subject => FocusArea::Results,
            FocusArea::Comments => FocusArea::Subject,
            FocusArea::Results => FocusArea::Comments,
        }
    }
}
