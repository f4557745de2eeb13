use chrono::{Duration, NaiveDate, TimeZone};
use fshn2ics_core::{event, ics, timetable, Semester, TZ};

const PAGE: &str = "\
	<html><body><table>\
	<tr><th>Orari</th><th>E Hënë</th><th>E Martë</th><th>E Mërkurë</th><th>E Enjte</th><th>E Premte</th></tr>\
	<tr><th>08:00-09:30</th><td>Informatike | Leksion | A. Profesor | Salla 1</td>\
	<td>&nbsp;</td><td>&nbsp;</td><td>&nbsp;</td><td>&nbsp;</td></tr>\
	</table></body></html>";

fn fields(ics: &str, name: &str) -> Vec<String> {
	let prefix = format!("{name}:");

	ics.split("\r\n")
		.filter_map(|line| line.strip_prefix(&prefix))
		.map(str::to_string)
		.collect()
}

#[test]
fn monday_lecture_becomes_one_weekly_event() {
	let timetable = timetable::process(PAGE);
	// Thursday 2025-09-04; next Monday is the 8th
	let now = TZ.with_ymd_and_hms(2025, 9, 4, 10, 0, 0).unwrap();
	let events = event::materialize(&timetable, Semester::First, now);

	assert_eq!(events.len(), 1);
	assert_eq!(
		events[0].start.date(),
		NaiveDate::from_ymd_opt(2025, 9, 8).unwrap()
	);
	assert_eq!(events[0].end - events[0].start, Duration::minutes(90));

	let document = ics::render(&events);

	assert_eq!(fields(&document, "BEGIN").len(), 2); // VCALENDAR + VEVENT
	assert_eq!(fields(&document, "SUMMARY"), ["Informatike"]);
	assert_eq!(fields(&document, "LOCATION"), ["Salla 1"]);
	assert_eq!(fields(&document, "DTSTART"), ["20250908T080000Z"]);
	assert_eq!(fields(&document, "DTEND"), ["20250908T093000Z"]);
	assert_eq!(fields(&document, "RRULE"), ["FREQ=WEEKLY;UNTIL=20260215T000000Z"]);
}

#[test]
fn pipeline_is_idempotent_modulo_identifiers() {
	let now = TZ.with_ymd_and_hms(2025, 9, 4, 10, 0, 0).unwrap();

	let first = timetable::process(PAGE);
	let second = timetable::process(PAGE);

	assert_eq!(first, second);

	let strip = |events: Vec<event::CalendarEvent>| -> Vec<event::CalendarEvent> {
		events
			.into_iter()
			.map(|mut event| {
				event.uid = String::new();
				event
			})
			.collect()
	};

	assert_eq!(
		strip(event::materialize(&first, Semester::Second, now)),
		strip(event::materialize(&second, Semester::Second, now))
	);
}

#[test]
fn rendered_document_reparses_to_the_same_fields() {
	let html = PAGE.replace("Salla 1", "Salla 1, krahu B; kati 3");
	let timetable = timetable::process(&html);
	let now = TZ.with_ymd_and_hms(2025, 9, 4, 10, 0, 0).unwrap();
	let events = event::materialize(&timetable, Semester::First, now);
	let document = ics::render(&events);

	let unescape = |value: &str| -> String {
		let mut out = String::new();
		let mut chars = value.chars();
		while let Some(c) = chars.next() {
			if c == '\\' {
				match chars.next() {
					Some('n') => out.push('\n'),
					Some(other) => out.push(other),
					None => {}
				}
			} else {
				out.push(c);
			}
		}
		out
	};

	let locations = fields(&document, "LOCATION");

	assert_eq!(locations.len(), events.len());
	assert_eq!(locations[0], "Salla 1\\, krahu B\\; kati 3");
	assert_eq!(unescape(&locations[0]), events[0].location);

	let descriptions = fields(&document, "DESCRIPTION");

	assert_eq!(unescape(&descriptions[0]), events[0].description);
}

#[test]
fn empty_page_yields_an_empty_timetable() {
	assert!(timetable::process("<html><body>asgje</body></html>").is_empty());
}
