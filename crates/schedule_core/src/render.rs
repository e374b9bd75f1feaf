use std::collections::BTreeMap;

use crate::chain::GroupChain;
use crate::group::{DayGroup, GroupEntry, MonthMarker, Position};
use crate::occurrence::YearMonth;

/// One visual row of the window, in display order.
#[derive(Debug, Clone, Copy)]
pub enum WindowRow<'a> {
    Month(&'a MonthMarker),
    Day(&'a DayGroup),
    Entry(&'a GroupEntry),
}

impl WindowRow<'_> {
    /// Position counter of the node behind this row. Entries belong to their
    /// day group and have none of their own.
    pub fn position(&self) -> Option<Position> {
        match self {
            WindowRow::Month(marker) => Some(marker.position),
            WindowRow::Day(group) => Some(group.position()),
            WindowRow::Entry(_) => None,
        }
    }
}

/// Flattens the chain into rows, emitting each month marker ahead of the
/// first day group of its month.
pub fn collect_rows<'a>(
    chain: &'a GroupChain,
    months: &'a BTreeMap<YearMonth, MonthMarker>,
) -> Vec<WindowRow<'a>> {
    let mut rows = Vec::new();
    let mut current: Option<YearMonth> = None;
    for group in chain.iter() {
        let month = group.month();
        if current != Some(month) {
            if let Some(marker) = months.get(&month) {
                rows.push(WindowRow::Month(marker));
            }
            current = Some(month);
        }
        rows.push(WindowRow::Day(group));
        rows.extend(group.entries().map(WindowRow::Entry));
    }
    rows
}

pub fn render_line(row: &WindowRow<'_>) -> String {
    match row {
        WindowRow::Month(marker) => match marker.month.first_day() {
            Some(first) => format!("== {} ==", first.format("%B %Y")),
            None => format!("== {} ==", marker.month),
        },
        WindowRow::Day(group) => format!("  {}", group.date().format("%a %d %b")),
        WindowRow::Entry(entry) => {
            let occurrence = &entry.occurrence;
            let check = if entry.selected { "[x]" } else { "[ ]" };
            let when = if occurrence.all_day {
                "all day".to_string()
            } else {
                format!(
                    "{}-{}",
                    occurrence.start.format("%H:%M"),
                    occurrence.end.format("%H:%M")
                )
            };
            let mut line = format!("    {check} {when} {}", occurrence.summary);
            if !occurrence.location.is_empty() {
                line.push_str(&format!(" @ {}", occurrence.location));
            }
            line
        }
    }
}

pub fn render_lines(rows: &[WindowRow<'_>]) -> Vec<String> {
    rows.iter().map(render_line).collect()
}
