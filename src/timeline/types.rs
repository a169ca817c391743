use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Raw clinical history for one patient — the unified timeline input.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct HistoryRecord {
    pub imaging: Vec<ImagingStudy>,
    pub vte_history: Vec<VteEvent>,
    pub procedures: Vec<ProcedureEvent>,
}

/// One imaging study from the record, PE-relevant or not.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImagingStudy {
    pub id: String,
    pub description: String,
    pub date: Option<NaiveDate>,
    /// Result polarity where the report states one; `None` when pending
    /// or inconclusive.
    pub positive: Option<bool>,
    pub report_text: Option<String>,
}

/// A prior venous thromboembolism entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VteEvent {
    pub id: String,
    pub description: String,
    pub date: Option<NaiveDate>,
    /// True when the diagnosis was imaging-confirmed rather than suspected.
    pub confirmed: bool,
}

/// A surgery or immobilization episode.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcedureEvent {
    pub id: String,
    pub description: String,
    pub date: Option<NaiveDate>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    Imaging,
    VteHistory,
    Procedure,
}

impl EventKind {
    /// Icon token the display layer maps onto a glyph.
    pub fn icon(&self) -> &'static str {
        match self {
            EventKind::Imaging => "scan",
            EventKind::VteHistory => "clot",
            EventKind::Procedure => "scalpel",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum RelevanceTier {
    High,
    Medium,
    Low,
}

/// One display-ready timeline entry, newest first within its run.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TimelineEntry {
    pub id: String,
    pub kind: EventKind,
    pub date: Option<NaiveDate>,
    pub relevance: RelevanceTier,
    pub icon: String,
    pub title: String,
    pub detail: Option<String>,
    pub relative_time_label: String,
    pub order_index: usize,
}
