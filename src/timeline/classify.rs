use chrono::NaiveDate;

use crate::assessment::reference;

use super::types::*;

const DAYS_PER_WEEK: i64 = 7;
const DAYS_PER_MONTH: i64 = 30;
const DAYS_PER_YEAR: i64 = 365;

/// Label for an undated event. The event still appears, sorted last.
pub const UNDATED_LABEL: &str = "date unknown";

/// Build the ordered, capped timeline for one history snapshot. Pure over
/// its inputs: rerunning with the same history and clock regenerates the
/// identical timeline.
pub fn classify_history(history: &HistoryRecord, now: NaiveDate, cap: usize) -> Vec<TimelineEntry> {
    let mut entries: Vec<TimelineEntry> = history
        .imaging
        .iter()
        .map(|study| imaging_entry(study, now))
        .chain(history.vte_history.iter().map(|event| vte_entry(event, now)))
        .chain(
            history
                .procedures
                .iter()
                .map(|procedure| procedure_entry(procedure, now)),
        )
        .collect();

    // Newest first; undated entries sink past every dated one. The sort is
    // stable, so insertion order breaks ties.
    entries.sort_by(|a, b| match (a.date, b.date) {
        (Some(left), Some(right)) => right.cmp(&left),
        (Some(_), None) => std::cmp::Ordering::Less,
        (None, Some(_)) => std::cmp::Ordering::Greater,
        (None, None) => std::cmp::Ordering::Equal,
    });
    entries.truncate(cap);
    for (index, entry) in entries.iter_mut().enumerate() {
        entry.order_index = index;
    }
    entries
}

/// Human label for how long ago an event happened. Future dates clamp to
/// "today"; a missing date labels as "date unknown".
pub fn relative_time_label(date: Option<NaiveDate>, now: NaiveDate) -> String {
    let Some(date) = date else {
        return UNDATED_LABEL.to_string();
    };
    let days = (now - date).num_days();
    if days <= 0 {
        return "today".to_string();
    }
    if days == 1 {
        return "yesterday".to_string();
    }
    if days < DAYS_PER_WEEK {
        return format!("{days} days ago");
    }
    if days < DAYS_PER_MONTH {
        return plural_ago(days / DAYS_PER_WEEK, "week");
    }
    if days < DAYS_PER_YEAR {
        return plural_ago(days / DAYS_PER_MONTH, "month");
    }
    plural_ago(days / DAYS_PER_YEAR, "year")
}

fn plural_ago(count: i64, unit: &str) -> String {
    if count == 1 {
        format!("1 {unit} ago")
    } else {
        format!("{count} {unit}s ago")
    }
}

/// Undated events always demote to Low: they cannot be placed on the
/// timeline with any confidence.
fn tier_for(base: RelevanceTier, date: Option<NaiveDate>) -> RelevanceTier {
    if date.is_none() {
        RelevanceTier::Low
    } else {
        base
    }
}

fn imaging_entry(study: &ImagingStudy, now: NaiveDate) -> TimelineEntry {
    let (relevant, _) = reference::classify_imaging(&study.description);
    // Positive PE-relevant imaging drives the workup; a negative study is
    // still context. Pending polarity stays Low until the report lands.
    let base = match (relevant, study.positive) {
        (true, Some(true)) => RelevanceTier::High,
        (true, Some(false)) => RelevanceTier::Medium,
        _ => RelevanceTier::Low,
    };
    TimelineEntry {
        id: study.id.clone(),
        kind: EventKind::Imaging,
        date: study.date,
        relevance: tier_for(base, study.date),
        icon: EventKind::Imaging.icon().to_string(),
        title: study.description.clone(),
        detail: study
            .report_text
            .as_deref()
            .map(|text| reference::extract_snippet(text, reference::SNIPPET_MAX_LENGTH)),
        relative_time_label: relative_time_label(study.date, now),
        order_index: 0,
    }
}

fn vte_entry(event: &VteEvent, now: NaiveDate) -> TimelineEntry {
    let base = if event.confirmed {
        RelevanceTier::High
    } else {
        RelevanceTier::Low
    };
    TimelineEntry {
        id: event.id.clone(),
        kind: EventKind::VteHistory,
        date: event.date,
        relevance: tier_for(base, event.date),
        icon: EventKind::VteHistory.icon().to_string(),
        title: event.description.clone(),
        detail: None,
        relative_time_label: relative_time_label(event.date, now),
        order_index: 0,
    }
}

fn procedure_entry(procedure: &ProcedureEvent, now: NaiveDate) -> TimelineEntry {
    TimelineEntry {
        id: procedure.id.clone(),
        kind: EventKind::Procedure,
        date: procedure.date,
        relevance: tier_for(RelevanceTier::Medium, procedure.date),
        icon: EventKind::Procedure.icon().to_string(),
        title: procedure.description.clone(),
        detail: None,
        relative_time_label: relative_time_label(procedure.date, now),
        order_index: 0,
    }
}
