//! Text builders for the external IO collaborators.
//!
//! # Responsibility
//! - Render the snapshot text, the spreadsheet-compatible HTML table and
//!   the follow-up email block consumed by download/clipboard code.
//!
//! # Invariants
//! - Builders are pure: they read tracker state and return strings.
//! - All user text is HTML-escaped before entering the spreadsheet table.

use crate::calendar::MONTH_ABBR;
use crate::model::activity::{Activity, EvidenceStatus};
use crate::model::money::format_currency;
use crate::schedule::{due_date, due_text, is_applicable, is_overdue_at};
use crate::service::tracker::{FollowUpDraft, Tracker};
use crate::snapshot::SnapshotResult;
use chrono::{DateTime, Datelike, Local, NaiveDateTime, Timelike, Utc};

/// Pretty snapshot JSON for the `.txt` download and local storage.
pub fn snapshot_text(tracker: &Tracker) -> SnapshotResult<String> {
    tracker.export_snapshot().to_json()
}

/// Suggested file name for the snapshot download.
pub fn snapshot_file_name(tracker: &Tracker) -> String {
    format!("opscal_{}-{:02}.txt", tracker.year, tracker.month + 1)
}

/// Plain-text follow-up email draft for one activity.
///
/// Fixed labeled lines over the selected period, followed by the optional
/// free-text note and next action from the draft. Returns `None` for an
/// unknown activity id; clipboard delivery stays with the caller.
pub fn follow_up_email(tracker: &Tracker, id: &str, draft: &FollowUpDraft) -> Option<String> {
    let activity = tracker.activity(id)?;
    let (year, month) = (tracker.year, tracker.month);
    let now = Local::now().naive_local();

    let entry = activity.entry(year, month);
    let done = entry.is_some_and(|e| e.done);
    let status = if done {
        "Completed"
    } else if is_overdue_at(activity, year, month, now) {
        "Overdue"
    } else {
        "Pending"
    };

    let provisioned = entry.map_or(0.0, |e| e.provisioned_total());
    let executed = entry.map_or(0.0, |e| e.executed_total());
    let due = due_date(activity, year, month)
        .map_or_else(|| "No deadline".to_string(), format_date_dmy);

    let dash = |text: &str| {
        if text.trim().is_empty() {
            "-".to_string()
        } else {
            text.trim().to_string()
        }
    };
    let amount_or_dash = |value: f64| {
        if value > 0.0 {
            format_currency(value)
        } else {
            "—".to_string()
        }
    };

    let period = format!("{}/{}", MONTH_ABBR[month as usize], year);
    let mut lines = vec![
        format!("Subject: Follow-up - {} - {period}", activity.title),
        String::new(),
        format!("Activity: {}", activity.title),
        format!("Category: {}", dash(&activity.category)),
        format!("Owner: {}", dash(&activity.owner)),
        format!("Supplier: {}", dash(&activity.supplier)),
        format!("Period: {period}"),
        format!("Status: {status}"),
        format!("Deadline: {due}"),
        format!("Provisioned value: {}", amount_or_dash(provisioned)),
        format!("Executed value: {}", amount_or_dash(executed)),
        format!(
            "Evidence A: {}",
            dash(entry.map_or("", |e| e.evidence.channel_a.as_str()))
        ),
        format!(
            "Evidence B: {}",
            dash(entry.map_or("", |e| e.evidence.channel_b.as_str()))
        ),
    ];

    let text = draft.text.trim();
    if !text.is_empty() {
        lines.push(String::new());
        lines.push("Record (follow-up):".to_string());
        lines.push(text.to_string());
    }

    let next_action = draft.next_action.trim();
    let next_date = draft.next_date.trim();
    if !next_action.is_empty() || !next_date.is_empty() {
        lines.push(String::new());
        lines.push(format!("Next action: {}", dash(next_action)));
        lines.push(format!("Next action date: {}", dash(next_date)));
    }

    Some(lines.join("\n"))
}

/// Spreadsheet-compatible HTML table over the selected year.
///
/// One row per active activity, one column per month; each cell encodes
/// status, completion date, provisioned/executed totals and evidence
/// markers. The caller serves it with a spreadsheet MIME type.
pub fn spreadsheet_html(tracker: &Tracker) -> String {
    let now = Local::now().naive_local();
    let (year, month) = (tracker.year, tracker.month);

    let rows: String = tracker
        .activities
        .iter()
        .filter(|a| a.active)
        .map(|activity| activity_row(activity, year, now))
        .collect();

    let totals = tracker.totals_for(year, month);
    let month_label = format!("{}/{}", MONTH_ABBR[month as usize], year);
    let month_heads: String = MONTH_ABBR.iter().map(|m| format!("<th>{m}</th>")).collect();

    format!(
        concat!(
            "<html><head><meta charset=\"utf-8\" /></head><body>\n",
            "<table border=\"1\">\n",
            "<tr><th colspan=\"18\" style=\"background:#004A99;color:#fff;",
            "font-weight:bold;text-align:left;\">Operational Compliance Calendar - Export</th></tr>\n",
            "<tr><td colspan=\"18\">Reference month: {month_label} | Exported at: {stamp}</td></tr>\n",
            "<tr><td colspan=\"6\">Provisioned total (month)</td><td colspan=\"12\">{prov}</td></tr>\n",
            "<tr><td colspan=\"6\">Executed total (month)</td><td colspan=\"12\">{exec}</td></tr>\n",
            "<tr><td colspan=\"6\">Gap (month)</td><td colspan=\"12\">{gap}</td></tr>\n",
            "<tr style=\"background:#f3f4f6;font-weight:bold;\">",
            "<th>Category</th><th>Activity</th><th>Owner</th><th>Supplier</th>",
            "<th>Periodicity</th><th>Deadline</th>{month_heads}</tr>\n",
            "{rows}</table>\n</body></html>\n"
        ),
        month_label = escape_html(&month_label),
        stamp = escape_html(&format_date_long(Utc::now())),
        prov = escape_html(&format_currency(totals.provisioned)),
        exec = escape_html(&format_currency(totals.executed)),
        gap = escape_html(&format_currency(totals.gap)),
        month_heads = month_heads,
        rows = rows,
    )
}

/// Suggested file name for the spreadsheet download.
pub fn spreadsheet_file_name(tracker: &Tracker) -> String {
    format!("opscal_calendar_{}.xls", tracker.year)
}

fn activity_row(activity: &Activity, year: i32, now: NaiveDateTime) -> String {
    let mut cols = vec![
        format!("<td>{}</td>", escape_html(&activity.category)),
        format!("<td>{}</td>", escape_html(&activity.title)),
        format!("<td>{}</td>", escape_html(&activity.owner)),
        format!("<td>{}</td>", escape_html(&activity.supplier)),
        format!("<td>{}</td>", escape_html(&activity.periodicity.to_string())),
        format!("<td>{}</td>", escape_html(&due_text(activity))),
    ];

    for m in 0..12 {
        if !is_applicable(activity, m) {
            cols.push("<td style=\"background:#f3f4f6;\">N/A</td>".to_string());
            continue;
        }
        cols.push(format!("<td>{}</td>", escape_html(&month_cell(activity, year, m, now))));
    }

    format!("<tr>{}</tr>\n", cols.concat())
}

fn month_cell(activity: &Activity, year: i32, month: u32, now: NaiveDateTime) -> String {
    let entry = activity.entry(year, month);
    let done = entry.is_some_and(|e| e.done);

    let status = if done {
        "OK"
    } else if is_overdue_at(activity, year, month, now) {
        "OVERDUE"
    } else {
        "PENDING"
    };

    let done_date = entry
        .and_then(|e| e.done_at)
        .map(format_date_dm)
        .unwrap_or_default();
    let provisioned = entry.map_or(0.0, |e| e.provisioned_total());
    let executed = entry.map_or(0.0, |e| e.executed_total());

    let (a, b) = activity.evidence_state(entry);
    let marker = |status: EvidenceStatus, label: &str| match status {
        EvidenceStatus::Hidden => String::new(),
        EvidenceStatus::Ok => format!("{label}:OK"),
        EvidenceStatus::Missing => format!("{label}:MISSING"),
    };

    [
        status.to_string(),
        done_date,
        if provisioned > 0.0 {
            format!("Prov: {}", format_currency(provisioned))
        } else {
            String::new()
        },
        if executed > 0.0 {
            format!("Exec: {}", format_currency(executed))
        } else {
            String::new()
        },
        marker(a, "A"),
        marker(b, "B"),
    ]
    .into_iter()
    .filter(|part| !part.is_empty())
    .collect::<Vec<_>>()
    .join(" | ")
}

fn format_date_dm(ts: DateTime<Utc>) -> String {
    let local = ts.with_timezone(&Local);
    format!("{:02}/{:02}", local.day(), local.month())
}

fn format_date_dmy(ts: NaiveDateTime) -> String {
    format!("{:02}/{:02}/{}", ts.day(), ts.month(), ts.year())
}

fn format_date_long(ts: DateTime<Utc>) -> String {
    let local = ts.with_timezone(&Local);
    format!(
        "{:02}/{:02}/{} {:02}:{:02}",
        local.day(),
        local.month(),
        local.year(),
        local.hour(),
        local.minute()
    )
}

fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#039;")
}

#[cfg(test)]
mod tests {
    use super::escape_html;

    #[test]
    fn escape_html_covers_special_chars() {
        assert_eq!(
            escape_html("<a href=\"x\">R&D 'ok'</a>"),
            "&lt;a href=&quot;x&quot;&gt;R&amp;D &#039;ok&#039;&lt;/a&gt;"
        );
    }
}
