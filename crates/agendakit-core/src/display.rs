//! Terminal rendering of the agenda view.
//!
//! Used by the command line client to print the `show` output: a short
//! header built from the meeting details, one aligned row per slot and an
//! item count. Rendering consumes the sorted view and never mutates it.

use std::borrow::Cow;

use crate::item::MeetingDetails;
use crate::schedule::ScheduledItem;

/// Widest notes column before truncation kicks in.
const NOTES_WIDTH: usize = 60;

/// Renders the header, one row per slot and the item count.
pub fn format_agenda(details: &MeetingDetails, schedule: &[ScheduledItem]) -> String {
    let mut lines = vec![
        format!("{} ({})", details.title, details.date.format("%Y-%m-%d")),
        format!("location: {}  host: {}", details.location, details.host),
        String::new(),
    ];

    if schedule.is_empty() {
        lines.push("No agenda items yet.".to_string());
    } else {
        let topic_width = column_width(schedule.iter().map(|s| s.topic.as_str()));
        let owner_width = column_width(schedule.iter().map(|s| s.owner.as_str()));
        for item in schedule {
            lines.push(format_row(item, topic_width, owner_width));
        }
        lines.push(String::new());
        lines.push(format!(
            "{} item{}",
            schedule.len(),
            if schedule.len() == 1 { "" } else { "s" }
        ));
    }

    lines.join("\n")
}

fn column_width<'a>(values: impl Iterator<Item = &'a str>) -> usize {
    values.map(|v| v.chars().count()).max().unwrap_or(0)
}

fn format_row(item: &ScheduledItem, topic_width: usize, owner_width: usize) -> String {
    let row = format!(
        "{}-{}  {:<tw$}  {:<ow$}  {}",
        item.start.format("%H:%M"),
        item.end.format("%H:%M"),
        item.topic,
        item.owner,
        ellipsis(&item.notes, NOTES_WIDTH),
        tw = topic_width,
        ow = owner_width,
    );
    row.trim_end().to_string()
}

/// Truncates a value, marking the cut with a trailing `...`.
///
/// Values at or under `max_len` characters are returned borrowed and
/// unchanged. Counting is per character, not per byte.
pub fn ellipsis(s: &str, max_len: usize) -> Cow<'_, str> {
    if s.chars().count() <= max_len {
        return Cow::Borrowed(s);
    }
    let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
    Cow::Owned(format!("{kept}..."))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::item::AgendaItem;
    use crate::schedule::build_schedule;
    use chrono::{NaiveDate, NaiveTime};

    fn time(hour: u32, min: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(hour, min, 0).unwrap()
    }

    fn meeting_date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 10).unwrap()
    }

    #[test]
    fn header_shows_details() {
        let details = MeetingDetails::new(meeting_date())
            .with_title("Sprint review")
            .with_location("Sala 3")
            .with_host("Ana");

        let output = format_agenda(&details, &[]);
        let lines: Vec<&str> = output.lines().collect();

        assert_eq!(lines[0], "Sprint review (2024-01-10)");
        assert_eq!(lines[1], "location: Sala 3  host: Ana");
    }

    #[test]
    fn empty_agenda_prints_placeholder() {
        let details = MeetingDetails::new(meeting_date());

        let output = format_agenda(&details, &[]);

        assert!(output.ends_with("No agenda items yet."));
        // Header, separator and placeholder: no rows, no count footer.
        assert_eq!(output.lines().count(), 4);
    }

    #[test]
    fn rows_carry_times_topic_owner_and_notes() {
        let items = vec![
            AgendaItem::new("Welcome", time(9, 0), 10)
                .with_owner("Ana")
                .with_notes("Intro"),
            AgendaItem::new("Q&A", time(10, 5), 15),
        ];
        let schedule = build_schedule(&items, meeting_date());

        let output = format_agenda(&MeetingDetails::new(meeting_date()), &schedule);
        let lines: Vec<&str> = output.lines().collect();

        assert_eq!(lines[3], "09:00-09:10  Welcome  Ana  Intro");
        assert_eq!(lines[4], "10:05-10:20  Q&A");
    }

    #[test]
    fn notes_column_is_aligned() {
        let items = vec![
            AgendaItem::new("A", time(9, 0), 10)
                .with_owner("Ana")
                .with_notes("first note"),
            AgendaItem::new("Longer topic", time(9, 30), 10)
                .with_owner("Bo")
                .with_notes("second note"),
        ];
        let schedule = build_schedule(&items, meeting_date());

        let output = format_agenda(&MeetingDetails::new(meeting_date()), &schedule);
        let lines: Vec<&str> = output.lines().collect();

        let first = lines[3].find("first note").unwrap();
        let second = lines[4].find("second note").unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn item_count_is_pluralized() {
        let one = vec![AgendaItem::new("Solo", time(9, 0), 10)];
        let two = vec![
            AgendaItem::new("First", time(9, 0), 10),
            AgendaItem::new("Second", time(9, 30), 10),
        ];

        let single = format_agenda(
            &MeetingDetails::new(meeting_date()),
            &build_schedule(&one, meeting_date()),
        );
        let plural = format_agenda(
            &MeetingDetails::new(meeting_date()),
            &build_schedule(&two, meeting_date()),
        );

        assert!(single.ends_with("1 item"));
        assert!(plural.ends_with("2 items"));
    }

    mod ellipsis {
        use super::*;

        #[test]
        fn short_values_are_borrowed_unchanged() {
            let result = ellipsis("short", 10);

            assert_eq!(result, "short");
            assert!(matches!(result, Cow::Borrowed(_)));
        }

        #[test]
        fn exact_length_is_not_truncated() {
            assert_eq!(ellipsis("exactly10!", 10), "exactly10!");
        }

        #[test]
        fn long_values_are_cut_to_the_limit() {
            let result = ellipsis("a very long annotation indeed", 10);

            assert_eq!(result, "a very ...");
            assert_eq!(result.chars().count(), 10);
        }

        #[test]
        fn counts_characters_not_bytes() {
            let input = "ñ".repeat(12);

            let result = ellipsis(&input, 8);

            assert_eq!(result, format!("{}...", "ñ".repeat(5)));
        }
    }
}
