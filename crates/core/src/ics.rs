use chrono::{NaiveDateTime, TimeZone};
use rrule::{Frequency, RRule};

use crate::event::CalendarEvent;
use crate::TZ;

pub const CALENDAR_NAME: &str = "Orari";
pub const PRODUCT_ID: &str = "-//School Calendar//EN";

fn format_datetime(datetime: NaiveDateTime) -> String {
	datetime.format("%Y%m%dT%H%M%SZ").to_string()
}

/// Escapes the characters reserved by RFC 5545 text values: `\`, `,`
/// and `;` each gain a preceding backslash. Nothing else is altered.
#[must_use]
pub fn escape_value(value: &str) -> String {
	let mut escaped = String::with_capacity(value.len());

	for c in value.chars() {
		if matches!(c, '\\' | ',' | ';') {
			escaped.push('\\');
		}

		escaped.push(c);
	}

	escaped
}

/// Description values additionally turn literal newlines into the
/// two-character sequence `\n`.
fn escape_description(value: &str) -> String {
	escape_value(value).replace('\n', "\\n")
}

fn weekly_until(until: NaiveDateTime) -> String {
	RRule::new(Frequency::Weekly)
		.until(rrule::Tz::UTC.from_utc_datetime(&until))
		.to_string()
}

fn render_event(event: &CalendarEvent) -> Vec<String> {
	vec![
		"BEGIN:VEVENT".to_string(),
		format!("UID:{}", event.uid),
		format!("DTSTAMP:{}", format_datetime(event.dtstamp)),
		format!("DTSTART:{}", format_datetime(event.start)),
		format!("DTEND:{}", format_datetime(event.end)),
		format!("SUMMARY:{}", escape_value(&event.summary)),
		format!("LOCATION:{}", escape_value(&event.location)),
		format!("DESCRIPTION:{}", escape_description(&event.description)),
		format!("RRULE:{}", weekly_until(event.until)),
		"STATUS:CONFIRMED".to_string(),
		"SEQUENCE:0".to_string(),
		"END:VEVENT".to_string(),
	]
}

/// Renders the whole calendar document, CRLF-terminated per RFC 5545.
#[must_use]
pub fn render(events: &[CalendarEvent]) -> String {
	let mut lines = vec![
		"BEGIN:VCALENDAR".to_string(),
		"VERSION:2.0".to_string(),
		format!("PRODID:{PRODUCT_ID}"),
		format!("X-WR-CALNAME:{CALENDAR_NAME}"),
		format!("X-WR-TIMEZONE:{}", TZ.name()),
		"CALSCALE:GREGORIAN".to_string(),
		"METHOD:PUBLISH".to_string(),
	];

	for event in events {
		lines.extend(render_event(event));
	}

	lines.push("END:VCALENDAR".to_string());

	lines.join("\r\n")
}
