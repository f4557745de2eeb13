#![warn(clippy::pedantic)]

//! Converts the FSHN weekly timetable page into an iCalendar document.
//!
//! The pipeline is pure and synchronous: HTML in, ICS text out. Fetching
//! the page and writing the file are the caller's concern.

use chrono::DateTime;
use chrono_tz::Tz;

pub mod event;
pub mod ics;
pub mod timetable;

pub use event::{CalendarEvent, Semester};
pub use timetable::Timetable;

pub const TZ: Tz = chrono_tz::Europe::Tirane;

/// Materializes and serializes the timetable in one step.
#[must_use]
pub fn create_calendar(timetable: &Timetable, semester: Semester, now: DateTime<Tz>) -> String {
	let events = event::materialize(timetable, semester, now);

	ics::render(&events)
}
