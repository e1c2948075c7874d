//! Wire types for `POST /api/parse`.
//!
//! The structured report keeps the section names of the source document as
//! its JSON keys, so every field carries a `#[serde(rename)]`. Keys the
//! renderer reads are required: a response missing one fails to deserialise
//! and is reported as [`crate::error::ReportError::MalformedResponse`] instead
//! of failing later during rendering. Keys it never reads default to empty.

use serde::{Deserialize, Serialize};

/// Successful parse: the structured report plus the reconstructed raw text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParseResponse {
    /// Section-by-section content.
    pub structure: ParsedReport,
    /// Every body element of the document joined by `\n`, blank lines included.
    pub original_text: String,
}

/// Failure body returned with every non-success status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// The structured content of an occupational-therapy evaluation report.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedReport {
    #[serde(rename = "基本資訊", default)]
    pub basic_info: BasicInfo,

    #[serde(rename = "家屬主訴與期待")]
    pub family_concerns: String,

    #[serde(rename = "職能評估")]
    pub assessment: OccupationalAssessment,

    #[serde(rename = "問題分析")]
    pub problem_analysis: Vec<String>,

    #[serde(rename = "總結與建議")]
    pub recommendations: Recommendations,
}

/// Header block. Only the raw second line of the document is kept.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BasicInfo {
    #[serde(rename = "原始內容", default, skip_serializing_if = "Option::is_none")]
    pub raw: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OccupationalAssessment {
    #[serde(rename = "精細動作")]
    pub fine_motor: FineMotor,

    #[serde(rename = "感覺統合")]
    pub sensory_integration: SensoryIntegration,

    #[serde(rename = "日常生活自理")]
    pub daily_living: DailyLiving,

    /// Free text under `其他：` (usually cognitive development).
    #[serde(rename = "其他", default)]
    pub other: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FineMotor {
    #[serde(rename = "評估工具", default)]
    pub tool: String,

    #[serde(rename = "評估結果")]
    pub results: Vec<String>,

    #[serde(rename = "行為觀察及綜合結果")]
    pub observations: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SensoryIntegration {
    #[serde(rename = "評估工具", default)]
    pub tools: Vec<String>,

    #[serde(rename = "行為觀察及綜合結果")]
    pub observations: Vec<String>,
}

/// Observation text for one daily-living activity.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivityObservation {
    #[serde(rename = "行為觀察及綜合結果")]
    pub observation: String,
}

/// The five fixed daily-living activities, in report order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyLiving {
    #[serde(rename = "飲食")]
    pub eating: ActivityObservation,

    #[serde(rename = "穿脫衣")]
    pub dressing: ActivityObservation,

    #[serde(rename = "盥洗衛生")]
    pub hygiene: ActivityObservation,

    #[serde(rename = "遊戲活動")]
    pub play: ActivityObservation,

    #[serde(rename = "生活作息及參與")]
    pub routine: ActivityObservation,
}

impl DailyLiving {
    pub fn get(&self, activity: DailyActivity) -> &ActivityObservation {
        match activity {
            DailyActivity::Eating => &self.eating,
            DailyActivity::Dressing => &self.dressing,
            DailyActivity::Hygiene => &self.hygiene,
            DailyActivity::Play => &self.play,
            DailyActivity::Routine => &self.routine,
        }
    }

    pub fn get_mut(&mut self, activity: DailyActivity) -> &mut ActivityObservation {
        match activity {
            DailyActivity::Eating => &mut self.eating,
            DailyActivity::Dressing => &mut self.dressing,
            DailyActivity::Hygiene => &mut self.hygiene,
            DailyActivity::Play => &mut self.play,
            DailyActivity::Routine => &mut self.routine,
        }
    }
}

/// Daily-living activity categories (日常生活自理).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DailyActivity {
    Eating,
    Dressing,
    Hygiene,
    Play,
    Routine,
}

impl DailyActivity {
    /// Report order.
    pub const ALL: [DailyActivity; 5] = [
        DailyActivity::Eating,
        DailyActivity::Dressing,
        DailyActivity::Hygiene,
        DailyActivity::Play,
        DailyActivity::Routine,
    ];

    /// Heading text used both in the document and as the JSON key.
    pub fn label(self) -> &'static str {
        match self {
            DailyActivity::Eating => "飲食",
            DailyActivity::Dressing => "穿脫衣",
            DailyActivity::Hygiene => "盥洗衛生",
            DailyActivity::Play => "遊戲活動",
            DailyActivity::Routine => "生活作息及參與",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recommendations {
    #[serde(rename = "精細動作部分")]
    pub fine_motor: Vec<String>,

    #[serde(rename = "認知發展")]
    pub cognitive: Vec<String>,

    #[serde(rename = "感覺統合部分")]
    pub sensory_integration: Vec<String>,

    #[serde(rename = "人際互動部分")]
    pub social: Vec<String>,
}
