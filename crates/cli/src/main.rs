#![warn(clippy::pedantic)]

use std::{
	fs,
	io::{Read, Write},
	path::PathBuf,
};

use anyhow::{bail, Context};
use chrono::Utc;
use clap::Parser;
use fshn2ics_core::{Semester, TZ};
use log::info;
use simplelog::{ColorChoice, Config, LevelFilter, TermLogger, TerminalMode};

#[derive(Parser)]
#[command(name = "fshn2ics", about = "Converts a saved FSHN timetable page into an ICS calendar")]
struct Args {
	/// Saved timetable HTML; reads stdin when absent.
	#[clap(value_name = "FILE", value_hint = clap::ValueHint::FilePath)]
	path: Option<PathBuf>,
	/// Semester number, controls when the weekly recurrence ends.
	#[clap(short, long, default_value_t = 1)]
	semester: u8,
	#[clap(short, long, value_hint = clap::ValueHint::FilePath)]
	output: Option<PathBuf>,
	/// Department name, used for the default output filename.
	#[clap(long)]
	dega: Option<String>,
	/// Year of study, used for the default output filename.
	#[clap(long)]
	viti: Option<String>,
	/// Class section, used for the default output filename.
	#[clap(long)]
	paraleli: Option<String>,
}

impl Args {
	fn output_path(&self) -> Option<PathBuf> {
		if let Some(output) = &self.output {
			return Some(output.clone());
		}

		let (dega, viti, paraleli) = (
			self.dega.as_deref()?,
			self.viti.as_deref()?,
			self.paraleli.as_deref()?,
		);
		let dega = dega.to_lowercase().split_whitespace().collect::<Vec<_>>().join("_");

		Some(PathBuf::from("output").join(format!("orari_{dega}_{paraleli}_viti_{viti}.ics")))
	}
}

fn main() -> anyhow::Result<()> {
	TermLogger::init(
		LevelFilter::Info,
		Config::default(),
		TerminalMode::Stderr,
		ColorChoice::Auto,
	)?;

	let args = Args::parse();
	let semester = Semester::from_number(args.semester).context("semester must be 1 or 2")?;

	let html = match &args.path {
		Some(path) => fs::read_to_string(path)
			.with_context(|| format!("failed to read {}", path.display()))?,
		None => {
			let mut buffer = String::new();
			std::io::stdin().read_to_string(&mut buffer)?;
			buffer
		}
	};

	let timetable = fshn2ics_core::timetable::process(&html);

	if timetable.is_empty() {
		bail!("no timetable data found; check the department, year and section");
	}

	let now = Utc::now().with_timezone(&TZ);
	let events = fshn2ics_core::event::materialize(&timetable, semester, now);
	let calendar = fshn2ics_core::ics::render(&events);

	info!(
		"added {} events to the calendar across {} weekdays",
		events.len(),
		timetable.len()
	);

	if let Some(output) = args.output_path() {
		if let Some(parent) = output.parent().filter(|parent| !parent.as_os_str().is_empty()) {
			fs::create_dir_all(parent)
				.with_context(|| format!("failed to create {}", parent.display()))?;
		}

		fs::write(&output, &calendar)
			.with_context(|| format!("failed to write {}", output.display()))?;
		info!("calendar written to {}", output.display());
	} else {
		write!(&mut std::io::stdout(), "{calendar}")?;
	}

	Ok(())
}
