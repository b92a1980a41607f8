use serde::{Deserialize, Serialize};

/// Sentinel used when a source has no URL.
pub const NOT_AVAILABLE: &str = "Not available";

/// Extract used for placeholder citations.
pub const INSUFFICIENT_DATA: &str = "Insufficient data available";

pub const MIN_SCORE: f64 = 0.0;
pub const MAX_SCORE: f64 = 4.0;
pub const MIN_PROGRESS: f64 = 0.0;
pub const MAX_PROGRESS: f64 = 100.0;
pub const MIN_TRUST_LEVEL: u8 = 1;
pub const MAX_TRUST_LEVEL: u8 = 7;

/// Aggregation level of the scoring hierarchy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    Question,
    Pillar,
    City,
}

impl Tier {
    pub fn as_str(&self) -> &'static str {
        match self {
            Tier::Question => "question",
            Tier::Pillar => "pillar",
            Tier::City => "city",
        }
    }
}

impl std::fmt::Display for Tier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Engine-reported confidence. Unrecognized values coerce to [`ConfidenceLevel::Medium`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ConfidenceLevel {
    High,
    #[default]
    Medium,
    Low,
}

impl ConfidenceLevel {
    pub fn coerce(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "high" => ConfidenceLevel::High,
            "low" => ConfidenceLevel::Low,
            _ => ConfidenceLevel::Medium,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ConfidenceLevel::High => "High",
            ConfidenceLevel::Medium => "Medium",
            ConfidenceLevel::Low => "Low",
        }
    }
}

impl std::fmt::Display for ConfidenceLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Institutional category of an evidence source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SourceType {
    Government,
    International,
    Academic,
    #[serde(rename = "NGO")]
    Ngo,
    Private,
    Media,
    #[default]
    Unknown,
}

impl SourceType {
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "government" | "municipal" | "official" => SourceType::Government,
            "international" | "multilateral" => SourceType::International,
            "academic" | "research" => SourceType::Academic,
            "ngo" | "non-governmental" | "civil society" => SourceType::Ngo,
            "private" | "private sector" | "commercial" => SourceType::Private,
            "media" | "news" | "social media" => SourceType::Media,
            _ => SourceType::Unknown,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SourceType::Government => "Government",
            SourceType::International => "International",
            SourceType::Academic => "Academic",
            SourceType::Ngo => "NGO",
            SourceType::Private => "Private",
            SourceType::Media => "Media",
            SourceType::Unknown => "Unknown",
        }
    }
}

impl std::fmt::Display for SourceType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One piece of cited evidence. Owned by the result that cites it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceCitation {
    pub source_type: SourceType,
    pub source_name: String,
    /// URL or [`NOT_AVAILABLE`].
    pub source_url: String,
    pub data_year: Option<i32>,
    /// 1..=7, 7 strongest.
    pub trust_level: u8,
    pub data_extract: String,
}

impl SourceCitation {
    /// Low-trust stand-in used when the engine cited nothing usable.
    pub fn placeholder() -> Self {
        Self {
            source_type: SourceType::Unknown,
            source_name: SourceType::Unknown.as_str().to_string(),
            source_url: NOT_AVAILABLE.to_string(),
            data_year: None,
            trust_level: MIN_TRUST_LEVEL,
            data_extract: INSUFFICIENT_DATA.to_string(),
        }
    }

    pub fn is_placeholder(&self) -> bool {
        *self == Self::placeholder()
    }
}

/// Fields shared by every tier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Assessment {
    /// 0.0..=4.0
    pub ai_score: f64,
    /// 0.0..=100.0
    pub ai_progress: f64,
    pub confidence_level: ConfidenceLevel,
    pub evidence_summary: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuestionResult {
    #[serde(flatten)]
    pub assessment: Assessment,
    pub red_flag: String,
    pub geographic_equity_note: String,
    pub data_sources_count: u32,
    /// The single most trustworthy source, inlined by the engine.
    pub source: SourceCitation,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PillarResult {
    #[serde(flatten)]
    pub assessment: Assessment,
    /// Never empty after validation.
    pub sources: Vec<SourceCitation>,
    pub red_flag: String,
    pub geographic_equity_note: String,
    pub institutional_assessment: String,
    pub data_gap_analysis: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CityResult {
    #[serde(flatten)]
    pub assessment: Assessment,
    pub cross_pillar_patterns: String,
    pub institutional_capacity: String,
    pub equity_assessment: String,
    pub sustainability_outlook: String,
    pub strategic_recommendation: String,
    pub data_transparency_note: String,
}

/// A validated engine verdict for one tier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "tier", rename_all = "lowercase")]
pub enum TierResult {
    Question(QuestionResult),
    Pillar(PillarResult),
    City(CityResult),
}

impl TierResult {
    pub fn tier(&self) -> Tier {
        match self {
            TierResult::Question(_) => Tier::Question,
            TierResult::Pillar(_) => Tier::Pillar,
            TierResult::City(_) => Tier::City,
        }
    }

    pub fn assessment(&self) -> &Assessment {
        match self {
            TierResult::Question(r) => &r.assessment,
            TierResult::Pillar(r) => &r.assessment,
            TierResult::City(r) => &r.assessment,
        }
    }
}
