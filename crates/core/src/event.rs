use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveDateTime, NaiveTime};
use chrono_tz::Tz;
use log::warn;
use uuid::Uuid;

use crate::timetable::{Day, Timetable};

/// Domain used for the best-effort professor e-mail in event descriptions.
const MAIL_DOMAIN: &str = "fshn.edu.al";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Semester {
	First,
	Second,
}

impl Semester {
	#[must_use]
	pub fn from_number(n: u8) -> Option<Self> {
		match n {
			1 => Some(Self::First),
			2 => Some(Self::Second),
			_ => None,
		}
	}

	/// Date past which the weekly recurrence stops: February 15 for the
	/// first semester, June 15 for the second, in the academic year that
	/// the current date falls into (September rolls over to next year).
	#[must_use]
	pub fn cutoff(self, today: NaiveDate) -> NaiveDateTime {
		let year = if today.month() < 9 {
			today.year()
		} else {
			today.year() + 1
		};
		let (month, day) = match self {
			Self::First => (2, 15),
			Self::Second => (6, 15),
		};

		NaiveDate::from_ymd_opt(year, month, day)
			.unwrap()
			.and_time(NaiveTime::MIN)
	}
}

/// One concrete weekly-recurring occurrence, ready for serialization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CalendarEvent {
	pub uid: String,
	pub dtstamp: NaiveDateTime,
	pub start: NaiveDateTime,
	pub end: NaiveDateTime,
	pub summary: String,
	pub location: String,
	pub description: String,
	pub until: NaiveDateTime,
}

/// Next occurrence of `day` on or after `today` (today counts).
fn next_occurrence(today: NaiveDate, day: Day) -> NaiveDate {
	let target = day.to_chrono().num_days_from_monday();
	let current = today.weekday().num_days_from_monday();
	let ahead = (target + 7 - current) % 7;

	today + Duration::days(i64::from(ahead))
}

/// `"HH:MM"` into hour and minute, rejecting out-of-range values.
fn parse_time(time: &str) -> Option<(u32, u32)> {
	let (hour, minute) = time.split_once(':')?;

	if minute.contains(':') {
		return None;
	}

	let hour: u32 = hour.parse().ok()?;
	let minute: u32 = minute.parse().ok()?;

	(hour <= 23 && minute <= 59).then_some((hour, minute))
}

fn email_local_part(professor: &str) -> String {
	professor.to_lowercase().replacen(' ', ".", 1)
}

/// Materializes the timetable into calendar events using the real clock's
/// `now` and freshly generated v4 UIDs.
#[must_use]
pub fn materialize(
	timetable: &Timetable,
	semester: Semester,
	now: DateTime<Tz>,
) -> Vec<CalendarEvent> {
	materialize_with(timetable, semester, now, Uuid::new_v4)
}

/// Same as [`materialize`], but with the identifier source injected so
/// tests can substitute a deterministic one.
pub fn materialize_with<F>(
	timetable: &Timetable,
	semester: Semester,
	now: DateTime<Tz>,
	mut uid: F,
) -> Vec<CalendarEvent>
where
	F: FnMut() -> Uuid,
{
	let today = now.date_naive();
	let dtstamp = now.naive_local();
	let until = semester.cutoff(today);
	let mut events = Vec::new();

	for (&day, blocks) in timetable {
		let date = next_occurrence(today, day);

		for block in blocks {
			if block.start.is_empty()
				|| block.end.is_empty()
				|| !block.start.contains(':')
				|| !block.end.contains(':')
			{
				warn!(
					"invalid time range for {day}: {}-{}, skipping",
					block.start, block.end
				);
				continue;
			}

			for lecture in &block.lectures {
				let (Some((start_hour, start_minute)), Some((end_hour, end_minute))) =
					(parse_time(&block.start), parse_time(&block.end))
				else {
					warn!(
						"invalid time values for {}: {}-{}, skipping",
						lecture.subject, block.start, block.end
					);
					continue;
				};

				let (Some(start_time), Some(end_time)) = (
					NaiveTime::from_hms_opt(start_hour, start_minute, 0),
					NaiveTime::from_hms_opt(end_hour, end_minute, 0),
				) else {
					continue;
				};

				events.push(CalendarEvent {
					uid: uid().to_string(),
					dtstamp,
					start: date.and_time(start_time),
					end: date.and_time(end_time),
					summary: if lecture.subject.is_empty() {
						"Unnamed Lecture".to_string()
					} else {
						lecture.subject.clone()
					},
					location: if lecture.room.is_empty() {
						"Unknown Location".to_string()
					} else {
						lecture.room.clone()
					},
					description: format!(
						"Nga {}\ne-mail: {}@{MAIL_DOMAIN}",
						lecture.professor,
						email_local_part(&lecture.professor)
					),
					until,
				});
			}
		}
	}

	events
}
