//! Section extraction: non-blank body elements → [`ParsedReport`].
//!
//! The report follows a fixed template, so each section is located by the
//! heading text it carries. A section heading only counts when it also
//! carries a status marker (`無異常` or `發展遲緩`); this keeps the same words
//! appearing in running text or in the recommendations from being taken as
//! headings. Every extractor is a pure function over the paragraph list and
//! leaves its fields empty when the heading is not found.

use crate::report::{
    BasicInfo, DailyActivity, DailyLiving, FineMotor, OccupationalAssessment, ParsedReport,
    Recommendations, SensoryIntegration,
};
use once_cell::sync::Lazy;
use regex::Regex;

const FAMILY_CONCERNS: &str = "家屬主訴與期待";
const FINE_MOTOR: &str = "精細動作";
const SENSORY: &str = "感覺統合";
const DAILY_LIVING: &str = "日常生活自理";
const ANALYSIS: &str = "問題分析";
const SUMMARY: &str = "總結與建議";

const TOOL_MARKER: &str = "評估工具：";
const OBSERVATION_MARKER: &str = "行為觀察及綜合結果：";
const OTHER_HEADING: &str = "其他：";
const SENSORY_TOOL_BULLET: &str = "■";
const SENSORY_TOOL_KINDS: [&str; 3] = ["量表", "觀察", "晤談"];

const CONCLUSION_LEAD: &str = "綜合以上";
const SIGNATURE: &str = "職能治療師";

static RE_STATUS: Lazy<Regex> = Lazy::new(|| Regex::new(r"無異常|發展遲緩").unwrap());

/// Build the structured report from the non-blank paragraphs of a document.
pub fn extract_sections(paragraphs: &[String]) -> ParsedReport {
    ParsedReport {
        basic_info: BasicInfo {
            raw: paragraphs.get(1).cloned(),
        },
        family_concerns: extract_family_concerns(paragraphs),
        assessment: OccupationalAssessment {
            fine_motor: extract_fine_motor(paragraphs),
            sensory_integration: extract_sensory(paragraphs),
            daily_living: extract_daily_living(paragraphs),
            other: extract_other(paragraphs),
        },
        problem_analysis: extract_problem_analysis(paragraphs),
        recommendations: extract_recommendations(paragraphs),
    }
}

fn has_status(para: &str) -> bool {
    RE_STATUS.is_match(para)
}

fn contains_any(para: &str, needles: &[&str]) -> bool {
    needles.iter().any(|n| para.contains(n))
}

fn is_heading(para: &str, section: &str) -> bool {
    para.contains(section) && has_status(para)
}

/// Paragraphs after `from` up to, not including, the first one matching `stop`.
fn collect_until<'a>(
    paragraphs: &'a [String],
    from: usize,
    stop: impl Fn(&str) -> bool + 'a,
) -> impl Iterator<Item = &'a String> + 'a {
    paragraphs
        .iter()
        .skip(from + 1)
        .take_while(move |p| !stop(p.as_str()))
}

fn extract_family_concerns(paragraphs: &[String]) -> String {
    paragraphs
        .iter()
        .position(|p| p.contains(FAMILY_CONCERNS))
        .and_then(|i| paragraphs.get(i + 1))
        .cloned()
        .unwrap_or_default()
}

// ── 精細動作 ─────────────────────────────────────────────────────────────────

fn extract_fine_motor(paragraphs: &[String]) -> FineMotor {
    let mut fine = FineMotor::default();
    let mut in_section = false;

    for (i, para) in paragraphs.iter().enumerate() {
        if is_heading(para, FINE_MOTOR) {
            in_section = true;
            continue;
        }
        if !in_section {
            continue;
        }
        if para.contains(TOOL_MARKER) {
            fine.tool = para.replace(TOOL_MARKER, "").trim().to_string();
            fine.results.extend(
                collect_until(paragraphs, i, |p| p.contains(OBSERVATION_MARKER))
                    .filter(|p| !contains_any(p, &[SENSORY, DAILY_LIVING]))
                    .cloned(),
            );
        } else if para.contains(OBSERVATION_MARKER) {
            fine.observations = collect_until(paragraphs, i, |p| {
                contains_any(p, &[SENSORY, DAILY_LIVING, ANALYSIS])
            })
            .cloned()
            .collect();
            break;
        }
    }
    fine
}

// ── 感覺統合 ─────────────────────────────────────────────────────────────────

fn extract_sensory(paragraphs: &[String]) -> SensoryIntegration {
    let mut sensory = SensoryIntegration::default();
    let mut in_section = false;
    let mut tools = Vec::new();

    for (i, para) in paragraphs.iter().enumerate() {
        if is_heading(para, SENSORY) {
            in_section = true;
            continue;
        }
        if !in_section {
            continue;
        }
        if para.contains(SENSORY_TOOL_BULLET) && contains_any(para, &SENSORY_TOOL_KINDS) {
            tools.push(para.trim().to_string());
        } else if para.contains(OBSERVATION_MARKER) {
            sensory.observations =
                collect_until(paragraphs, i, |p| contains_any(p, &[DAILY_LIVING, ANALYSIS]))
                    .cloned()
                    .collect();
            // Tools only count once the observation block confirms the section.
            sensory.tools = tools;
            break;
        }
    }
    sensory
}

// ── 日常生活自理 ─────────────────────────────────────────────────────────────

fn extract_daily_living(paragraphs: &[String]) -> DailyLiving {
    let mut daily = DailyLiving::default();
    let marker_at = |i: usize| {
        paragraphs
            .get(i)
            .is_some_and(|p| p.contains(OBSERVATION_MARKER))
    };

    for activity in DailyActivity::ALL {
        let Some(i) = paragraphs
            .iter()
            .position(|p| is_heading(p, activity.label()))
        else {
            continue;
        };
        let observation = if marker_at(i + 1) {
            paragraphs.get(i + 2)
        } else if marker_at(i + 2) {
            paragraphs.get(i + 3)
        } else {
            None
        };
        if let Some(text) = observation {
            daily.get_mut(activity).observation = text.clone();
        }
    }
    daily
}

fn extract_other(paragraphs: &[String]) -> String {
    paragraphs
        .iter()
        .position(|p| p.trim() == OTHER_HEADING)
        .and_then(|i| paragraphs.get(i + 1))
        .cloned()
        .unwrap_or_default()
}

// ── 問題分析 / 總結與建議 ────────────────────────────────────────────────────

fn extract_problem_analysis(paragraphs: &[String]) -> Vec<String> {
    let Some(start) = paragraphs.iter().position(|p| p.contains(ANALYSIS)) else {
        return Vec::new();
    };
    paragraphs[start + 1..]
        .iter()
        .filter(|p| !p.contains(ANALYSIS))
        .take_while(|p| !p.contains(SUMMARY))
        .filter(|p| !p.starts_with(CONCLUSION_LEAD))
        .cloned()
        .collect()
}

#[derive(Clone, Copy)]
enum Subsection {
    FineMotor,
    Cognitive,
    Sensory,
    Social,
}

impl Subsection {
    fn detect(para: &str) -> Option<Self> {
        if para.contains("精細動作部分") {
            Some(Subsection::FineMotor)
        } else if para.contains("認知發展：") {
            Some(Subsection::Cognitive)
        } else if para.contains("感覺統合部分：") {
            Some(Subsection::Sensory)
        } else if para.contains("人際互動部分：") {
            Some(Subsection::Social)
        } else {
            None
        }
    }

    fn list(self, recs: &mut Recommendations) -> &mut Vec<String> {
        match self {
            Subsection::FineMotor => &mut recs.fine_motor,
            Subsection::Cognitive => &mut recs.cognitive,
            Subsection::Sensory => &mut recs.sensory_integration,
            Subsection::Social => &mut recs.social,
        }
    }
}

fn extract_recommendations(paragraphs: &[String]) -> Recommendations {
    let mut recs = Recommendations::default();
    let mut in_summary = false;
    let mut current: Option<Subsection> = None;

    for para in paragraphs {
        if para.contains(SUMMARY) {
            in_summary = true;
            continue;
        }
        if !in_summary {
            continue;
        }
        if let Some(sub) = Subsection::detect(para) {
            current = Some(sub);
        } else if let Some(sub) = current {
            if !contains_any(para, &[SIGNATURE, CONCLUSION_LEAD]) {
                sub.list(&mut recs).push(para.clone());
            }
        }
    }
    recs
}
