use std::{collections::BTreeMap, fmt};

use log::warn;
use select::{document::Document, predicate::Name};

/// Header token marking the first timetable row on the rendered page.
const MONDAY_HEADER: &str = "E Hënë";

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Day {
	Monday,
	Tuesday,
	Wednesday,
	Thursday,
	Friday,
}

impl Day {
	pub const ALL: [Day; 5] = [
		Day::Monday,
		Day::Tuesday,
		Day::Wednesday,
		Day::Thursday,
		Day::Friday,
	];

	/// Column index in the grid, 0 = Monday.
	#[must_use]
	pub fn from_column(column: usize) -> Option<Self> {
		Self::ALL.get(column).copied()
	}

	#[must_use]
	pub fn albanian(self) -> &'static str {
		match self {
			Self::Monday => "E Hene",
			Self::Tuesday => "E Marte",
			Self::Wednesday => "E Merkure",
			Self::Thursday => "E Enjte",
			Self::Friday => "E Premte",
		}
	}

	#[must_use]
	pub fn to_chrono(self) -> chrono::Weekday {
		match self {
			Self::Monday => chrono::Weekday::Mon,
			Self::Tuesday => chrono::Weekday::Tue,
			Self::Wednesday => chrono::Weekday::Wed,
			Self::Thursday => chrono::Weekday::Thu,
			Self::Friday => chrono::Weekday::Fri,
		}
	}
}

impl fmt::Display for Day {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		f.write_str(self.albanian())
	}
}

/// One non-empty grid cell, straight out of the HTML table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawCell {
	pub day: Day,
	/// Shared row time range, `"HH:MM-HH:MM"` or empty.
	pub time: String,
	pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct TimeBlock {
	start: String,
	end: String,
	raw: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Lecture {
	pub subject: String,
	pub kind: String,
	pub professor: String,
	pub room: String,
}

impl Lecture {
	fn fallback(raw: &str) -> Self {
		Self {
			subject: raw.to_string(),
			kind: String::new(),
			professor: String::new(),
			room: String::new(),
		}
	}
}

/// A contiguous time span after collapsing adjacent identical cells.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergedBlock {
	pub start: String,
	pub end: String,
	pub lectures: Vec<Lecture>,
}

/// Per-day blocks in source row order. Days appear only when at least one
/// cell was non-empty.
pub type Timetable = BTreeMap<Day, Vec<MergedBlock>>;

/// Outcome of decoding one cell's pipe-delimited text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecodedCell {
	/// Segment count was a positive multiple of four.
	Regular(Vec<Lecture>),
	/// The seven-segment collision of two lectures, split on the first `)`.
	Irregular([Lecture; 2]),
	/// Anything else: the whole text becomes the subject.
	Fallback(Lecture),
}

impl DecodedCell {
	#[must_use]
	pub fn into_lectures(self) -> Vec<Lecture> {
		match self {
			Self::Regular(lectures) => lectures,
			Self::Irregular([first, second]) => vec![first, second],
			Self::Fallback(lecture) => vec![lecture],
		}
	}
}

/// Extracts every non-empty data cell from the timetable rows.
///
/// Rows before the one carrying the Monday header are ignored; that row
/// itself is the header and is skipped. When the header token is missing
/// the whole document is scanned instead, still skipping the first row.
#[must_use]
pub fn extract_cells(html: &str) -> Vec<RawCell> {
	let document = Document::from(html);
	let rows: Vec<_> = document.find(Name("tr")).collect();
	let anchor = rows
		.iter()
		.position(|row| row.text().contains(MONDAY_HEADER))
		.unwrap_or(0);

	let mut cells = Vec::new();

	for row in rows.iter().skip(anchor + 1) {
		let time = row
			.find(Name("th"))
			.next()
			.map(|th| th.text().trim().to_string())
			.unwrap_or_default();

		for (column, cell) in row.find(Name("td")).enumerate() {
			let text = cell.text();
			// `select` decodes &nbsp; to U+00A0
			if text.contains('\u{a0}') || text.trim().is_empty() {
				continue;
			}

			let Some(day) = Day::from_column(column) else {
				warn!("cell in unknown weekday column {column}, skipping");
				continue;
			};

			cells.push(RawCell {
				day,
				time: time.clone(),
				text: text.trim().to_string(),
			});
		}
	}

	cells
}

fn split_time(time: &str) -> (String, String) {
	let parts: Vec<&str> = time.split('-').collect();

	if let [start, end] = parts[..] {
		(start.trim().to_string(), end.trim().to_string())
	} else {
		(String::new(), String::new())
	}
}

fn merge_adjacent(blocks: Vec<TimeBlock>) -> Vec<TimeBlock> {
	blocks.into_iter().fold(Vec::new(), |mut merged, block| {
		match merged.last_mut() {
			Some(last)
				if last.raw == block.raw && !last.raw.is_empty() && last.end == block.start =>
			{
				// same lecture spilling into the next slot
				last.end = block.end;
			}
			_ => merged.push(block),
		}

		merged
	})
}

/// Buckets cells by weekday, merges back-to-back identical cells into one
/// block and decodes each block's text into lectures.
#[must_use]
pub fn group_by_day(cells: Vec<RawCell>) -> Timetable {
	let mut buckets: BTreeMap<Day, Vec<TimeBlock>> = BTreeMap::new();

	for cell in cells {
		let (start, end) = split_time(&cell.time);

		buckets.entry(cell.day).or_default().push(TimeBlock {
			start,
			end,
			raw: cell.text,
		});
	}

	buckets
		.into_iter()
		.map(|(day, blocks)| {
			let blocks = merge_adjacent(blocks)
				.into_iter()
				.filter(|block| !block.raw.is_empty())
				.map(|block| MergedBlock {
					start: block.start,
					end: block.end,
					lectures: decode_cell(&block.raw).into_lectures(),
				})
				.collect();

			(day, blocks)
		})
		.collect()
}

/// Decodes one merged cell's pipe-delimited text into lectures.
#[must_use]
pub fn decode_cell(raw: &str) -> DecodedCell {
	let parts: Vec<&str> = raw.split('|').map(str::trim).collect();

	if !parts.is_empty() && parts.len() % 4 == 0 {
		let lectures = parts
			.chunks(4)
			.map(|fields| Lecture {
				subject: fields[0].to_string(),
				kind: fields[1].to_string(),
				professor: fields[2].to_string(),
				room: fields[3].to_string(),
			})
			.collect();

		return DecodedCell::Regular(lectures);
	}

	if parts.len() == 7 {
		// two lectures collided: the fourth segment holds the first room
		// and the second subject, separated by the room's closing paren
		let collided = parts[3];

		if let Some(pos) = collided.find(')') {
			if pos + 1 < collided.len() {
				let first_room = collided[..=pos].trim();
				let second_subject = collided[pos + 1..].trim();

				return DecodedCell::Irregular([
					Lecture {
						subject: parts[0].to_string(),
						kind: parts[1].to_string(),
						professor: parts[2].to_string(),
						room: first_room.to_string(),
					},
					Lecture {
						subject: second_subject.to_string(),
						kind: parts[4].to_string(),
						professor: parts[5].to_string(),
						room: parts[6].to_string(),
					},
				]);
			}
		}
	}

	warn!(
		"unrecognized lecture format ({} segments), keeping raw text",
		parts.len()
	);

	DecodedCell::Fallback(Lecture::fallback(raw))
}

/// Primary parsing entry point: raw page HTML to structured timetable.
///
/// An empty result means no timetable data was found; that is the only
/// caller-visible failure signal.
#[must_use]
pub fn process(html: &str) -> Timetable {
	group_by_day(extract_cells(html))
}
