/* Copyright © 2024-2025 Adam Train <adam@trainrelay.net>
 *
 * This program is free software: you can redistribute it and/or modify
 * it under the terms of the GNU General Public License as published by
 * the Free Software Foundation, either version 3 of the License, or
 * (at your option) any later version.
 *
 * This program is distributed in the hope that it will be useful,
 * but WITHOUT ANY WARRANTY; without even the implied warranty of
 * MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
 * GNU General Public License for more details.
 *
 * You should have received a copy of the GNU General Public License
 * along with this program. If not, see <https://www.gnu.org/licenses/>.
 */
use crate::gl::ledger::Ledger;
use crate::import::pdf::{PdfDocument, PdfReviewSink, REVIEW_DIR};
use crate::import::spreadsheet::Xlsx;
use crate::import::vision::core::VisionRecognizer;
use crate::parsing::filesystem::Filesystem;
use crate::recon::engine::Reconciler;
use crate::reports::ledger_reporter::{print_record, LedgerReporter};
use anyhow::{anyhow, bail, Error};
use clap::{Parser, ValueEnum};
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::EnvFilter;

mod config;
mod gl;
mod import;
mod matching;
mod parsing;
mod recon;
mod reports;
mod util;

#[derive(Parser)]
#[command(
	name = "romaneio",
	version = "1.0",
	about = "Reconciles scanned delivery manifests against a reference table"
)]
struct Cli {
	// ----------------
	// -- POSITIONAL --
	// ----------------
	/// The command to execute
	command: Directive,

	// -----------
	// -- FLAGS --
	// -----------
	/// The reference table (xlsx); required by every command except scan
	#[arg(short)]
	table: Option<String>,

	/// Where to save the updated table (default: overwrite the -t table)
	#[arg(short)]
	output: Option<String>,

	/// Scanned romaneios (PDF of page images)
	#[arg(short)]
	romaneios: Option<String>,

	/// Management report (PDF with embedded text)
	#[arg(short)]
	gerenciais: Option<String>,

	/// Where pages needing manual review are written
	/// (default: notas_nao_lidas)
	#[arg(long)]
	review_dir: Option<String>,

	/// Custom config file location (default: ~/.config/romaneio/config.toml)
	#[arg(long)]
	config: Option<String>,

	/// Log more; repeat for even more
	#[arg(short, long, action = clap::ArgAction::Count)]
	verbose: u8,

	/// Only log warnings and errors
	#[arg(short, long, conflicts_with = "verbose")]
	quiet: bool,
}

impl Cli {
	/// Extra validations on top of what clap does
	fn validate(&self) -> Result<(), Error> {
		if self.command != Directive::Scan && self.table.is_none() {
			bail!("No reference table specified (-t)");
		}
		if self.reads_romaneios() && self.romaneios.is_none() {
			bail!("No romaneio document specified (-r)");
		}
		if self.reads_gerenciais() && self.gerenciais.is_none() {
			bail!("No management report specified (-g)");
		}

		Ok(())
	}

	fn reads_romaneios(&self) -> bool {
		matches!(self.command, Directive::Run | Directive::Romaneios)
	}

	fn reads_gerenciais(&self) -> bool {
		matches!(
			self.command,
			Directive::Run | Directive::Gerenciais | Directive::Scan
		)
	}

	fn log_level(&self) -> LevelFilter {
		if self.quiet {
			return LevelFilter::WARN;
		}

		match self.verbose {
			0 => LevelFilter::INFO,
			1 => LevelFilter::DEBUG,
			_ => LevelFilter::TRACE,
		}
	}

	fn table_path(&self) -> Result<&Path, Error> {
		self.table
			.as_deref()
			.map(Path::new)
			.ok_or_else(|| anyhow!("No reference table specified (-t)"))
	}

	fn output_path(&self) -> Result<&Path, Error> {
		match &self.output {
			Some(output) => Ok(Path::new(output)),
			None => self.table_path(),
		}
	}
}

#[derive(ValueEnum, Clone, PartialEq)]
enum Directive {
	Run,        // both passes, then clean
	Romaneios,  // scanned manifests only
	Gerenciais, // management report only

	Clean, // drop empty rows
	Show,  // print the table

	Scan, // print what a report's text extracts to
}

/// Everything the romaneio pass needs, prepared before any page is read.
struct OcrPass {
	document: PdfDocument,
	recognizer: VisionRecognizer,
	review_dir: PathBuf,
}

fn main() -> Result<(), Error> {
	let args = Cli::parse();
	args.validate()?;

	let filter = EnvFilter::builder()
		.with_default_directive(args.log_level().into())
		.from_env_lossy();
	tracing_subscriber::fmt()
		.with_env_filter(filter)
		.with_target(false)
		.with_writer(std::io::stderr)
		.init();

	let reconciler = Reconciler::new();

	// Every input is opened before anything is processed, so a bad report
	// cannot surface after the romaneio pass has already run
	let report = match &args.gerenciais {
		Some(path) if args.reads_gerenciais() => Some(read_report(path)?),
		_ => None,
	};

	if args.command == Directive::Scan {
		let record = reconciler.extractor().extract(report.as_deref())?;
		print_record(&record);
		return Ok(());
	}

	let store = Xlsx;
	let mut ledger = Ledger::load(&store, args.table_path()?)?;

	if args.command == Directive::Show {
		LedgerReporter::new(&ledger).print();
		return Ok(());
	}

	let ocr = match &args.romaneios {
		Some(path) if args.reads_romaneios() => Some(prepare_ocr(&args, path)?),
		_ => None,
	};

	if let Some(ocr) = &ocr {
		romaneio_pass(&reconciler, &mut ledger, ocr);
	}
	if let Some(text) = &report {
		reconciler.ingest_report(&mut ledger, Some(text.as_str()))?;
	}
	if matches!(args.command, Directive::Run | Directive::Clean) {
		let dropped = ledger.drop_incomplete();
		info!(dropped, "removed empty rows");
	}

	ledger.persist(&store, args.output_path()?)
}

fn read_report(path: &str) -> Result<String, Error> {
	PdfDocument::open(Path::new(path))?.text()
}

/// Only this pass needs the config, so it is read here.
fn prepare_ocr(args: &Cli, path: &str) -> Result<OcrPass, Error> {
	let document = PdfDocument::open(Path::new(path))?;

	let config = Filesystem::new().get_config(args.config.as_ref(), true)?;
	let ocr = config
		.ocr
		.ok_or_else(|| anyhow!("No [ocr] section in config"))?;
	let recognizer = VisionRecognizer::new(ocr)?;

	let review_dir = args
		.review_dir
		.clone()
		.or(config.review.and_then(|r| r.dir))
		.unwrap_or(REVIEW_DIR.to_owned());

	Ok(OcrPass {
		document,
		recognizer,
		review_dir: PathBuf::from(review_dir),
	})
}

/// OCRs every page image of the romaneio document and accumulates what
/// matches.
fn romaneio_pass(reconciler: &Reconciler, ledger: &mut Ledger, ocr: &OcrPass) {
	let mut sink = PdfReviewSink::new(&ocr.document, &ocr.review_dir);

	info!(pages = ocr.document.page_count(), "processing romaneios");
	let summary = reconciler.reconcile_pages(
		ledger,
		&ocr.document,
		&ocr.recognizer,
		&mut sink,
	);

	info!(
		scans = summary.scans,
		matched = summary.matched,
		reviewed = summary.reviewed,
		review_failures = summary.review_failures,
		"romaneios done"
	);
}
