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
use crate::gl::row::normalize;
use crate::matching::fuzzy::Matcher;
use crate::matching::similarity::{Gestalt, Similarity};
use crate::parsing::extractor::{ExtractedRecord, Extractor};
use crate::parsing::money::ParseError;
use crate::recon::review::{ReviewItem, ReviewReason, ReviewSink};
use crate::recon::source::{PageSource, TextRecognizer};
use crate::util::quant::Quant;
use tracing::{debug, error, info, warn};

/// The lowest establishment score at which a match is accepted.
pub const ESTABLISHMENT_THRESHOLD: f64 = 0.65;

/// A municipality/establishment pair from the reference table that a page
/// was resolved to.
#[derive(Debug, Clone, PartialEq)]
pub struct Resolution<'l> {
	pub municipality: &'l str,
	pub establishment: &'l str,
	pub score: f64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
	Matched {
		municipality: String,
		establishment: String,
		amount: Quant,
	},
	Review(ReviewReason),
}

/// Counts for one pass over a romaneio document.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RunSummary {
	/// Page images processed (a page with several images counts several
	/// times).
	pub scans: usize,
	pub matched: usize,
	pub reviewed: usize,
	/// Review items that could not be written out.
	pub review_failures: usize,
}

/// Resolves what was read off each page to a row of the reference table and
/// accumulates the page's amount there; anything it cannot resolve goes to
/// review.
///
/// Everything is sequential: one page at a time, in document order, with
/// the Ledger as the only thing mutated.
pub struct Reconciler<S: Similarity = Gestalt> {
	extractor: Extractor,
	matcher: Matcher<S>,
}

impl Reconciler<Gestalt> {
	pub fn new() -> Self {
		Self::with_metric(Gestalt)
	}
}

impl<S: Similarity> Reconciler<S> {
	pub fn with_metric(metric: S) -> Self {
		Self {
			extractor: Extractor::new(),
			matcher: Matcher::with_metric(metric),
		}
	}

	/// Finds the reference pair for a record's candidates.
	///
	/// The best municipality over all remaining candidates narrows the
	/// reference rows, and the best establishment among those is accepted
	/// at ESTABLISHMENT_THRESHOLD or above. Failing that, the first
	/// remaining municipality candidate is dropped and the search repeats,
	/// until a match is accepted or no candidates remain.
	pub fn resolve<'l>(
		&self,
		ledger: &'l Ledger,
		record: &ExtractedRecord,
	) -> Option<Resolution<'l>> {
		let municipalities: Vec<String> =
			record.municipalities.iter().map(|m| normalize(m)).collect();
		let establishments: Vec<String> =
			record.establishments.iter().map(|e| normalize(e)).collect();

		let municipality_candidates: Vec<Option<&str>> =
			municipalities.iter().map(|m| Some(m.as_str())).collect();
		let establishment_candidates: Vec<Option<&str>> =
			establishments.iter().map(|e| Some(e.as_str())).collect();

		let universe: Vec<Option<&'l str>> =
			ledger.municipalities().into_iter().map(Some).collect();

		for start in 0..municipality_candidates.len() {
			let (municipality, municipality_score) = self
				.matcher
				.best_pair(&universe, &municipality_candidates[start..]);

			let municipality = match municipality {
				Some(m) => m,
				None => continue,
			};

			let targets: Vec<Option<&'l str>> = ledger
				.establishments_of(municipality)
				.into_iter()
				.map(Some)
				.collect();
			let (establishment, score) =
				self.matcher.best_pair(&targets, &establishment_candidates);

			debug!(
				municipality,
				municipality_score,
				establishment = establishment.unwrap_or_default(),
				score,
				"candidate match"
			);

			if let Some(establishment) = establishment {
				if score >= ESTABLISHMENT_THRESHOLD {
					return Some(Resolution {
						municipality,
						establishment,
						score,
					});
				}
			}
		}

		None
	}

	/// Resolves a record and, if it resolves, adds its amount to the
	/// ledger. Incomplete records are not matched at all.
	pub fn reconcile_record(
		&self,
		ledger: &mut Ledger,
		record: &ExtractedRecord,
	) -> Outcome {
		let amount = match record.amount {
			Some(a) if record.is_complete() => a,
			_ => return Outcome::Review(ReviewReason::ExtractionIncomplete),
		};

		let (municipality, establishment) = match self.resolve(ledger, record) {
			Some(r) => {
				debug!(score = r.score, "resolved");
				(r.municipality.to_string(), r.establishment.to_string())
			},
			None => return Outcome::Review(ReviewReason::NoMatchFound),
		};

		if !ledger.accumulate(&municipality, &establishment, amount) {
			return Outcome::Review(ReviewReason::NoMatchFound);
		}

		Outcome::Matched {
			municipality,
			establishment,
			amount,
		}
	}

	/// Runs OCR and reconciliation over every page image of a romaneio
	/// document. A failure on one page (unreadable image, OCR error) sends
	/// that page to review and moves on to the next.
	pub fn reconcile_pages<P, R, V>(
		&self,
		ledger: &mut Ledger,
		source: &P,
		recognizer: &R,
		review: &mut V,
	) -> RunSummary
	where
		P: PageSource,
		R: TextRecognizer,
		V: ReviewSink,
	{
		let mut summary = RunSummary::default();

		for scan in source.page_images() {
			summary.scans += 1;
			let page = scan.page_index + 1;

			let text = match &scan.image {
				None => None,
				Some(bytes) => match recognizer.recognize(bytes) {
					Ok(text) => text,
					Err(e) => {
						warn!(page, "text recognition failed: {:#}", e);
						None
					},
				},
			};

			let outcome = match text {
				None => Outcome::Review(ReviewReason::NoText),
				Some(text) => match self.extractor.extract(Some(&text)) {
					Ok(record) => self.reconcile_record(ledger, &record),
					Err(e) => {
						warn!(page, "{}", e);
						Outcome::Review(ReviewReason::ExtractionIncomplete)
					},
				},
			};

			match outcome {
				Outcome::Matched {
					municipality,
					establishment,
					amount,
				} => {
					info!(page, %municipality, %establishment, %amount, "matched");
					summary.matched += 1;
				},
				Outcome::Review(reason) => {
					info!(page, %reason, "sent to review");
					summary.reviewed += 1;
					let item = ReviewItem::new(scan.page_index, reason);
					if let Err(e) = review.divert(&item) {
						error!(page, "could not set page aside: {:#}", e);
						summary.review_failures += 1;
					}
				},
			}
		}

		summary
	}

	/// Ingests a management report's text: every municipality/establishment
	/// pair found is appended as a new row, unmatched, carrying the report's
	/// amount. Returns the number of rows appended.
	pub fn ingest_report(
		&self,
		ledger: &mut Ledger,
		text: Option<&str>,
	) -> Result<usize, ParseError> {
		let record = self.extractor.extract(text)?;
		let appended = ledger.append(&record);
		info!(appended, "ingested report");
		Ok(appended)
	}

	pub fn extractor(&self) -> &Extractor {
		&self.extractor
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::gl::row::LedgerRow;
	use crate::recon::source::PageImage;
	use anyhow::{bail, Error};
	use std::collections::HashMap;

	/// Fixed scores per (target, candidate) pair; anything unlisted is 0.
	struct Scripted(HashMap<(&'static str, &'static str), f64>);

	impl Similarity for Scripted {
		fn ratio(&self, a: &str, b: &str) -> f64 {
			self.0
				.iter()
				.find(|((t, c), _)| *t == a && *c == b)
				.map(|(_, s)| *s)
				.unwrap_or(0.0)
		}
	}

	/// Pages whose "image" is the text itself.
	struct TextPages(Vec<(usize, Option<&'static str>)>);

	impl PageSource for TextPages {
		fn page_images(&self) -> Vec<PageImage> {
			self.0
				.iter()
				.map(|(page_index, text)| PageImage {
					page_index: *page_index,
					image: text.map(|t| t.as_bytes().to_vec()),
				})
				.collect()
		}
	}

	/// Reads the image bytes back as text; "FAIL" errors, "" is no text.
	struct EchoOcr;

	impl TextRecognizer for EchoOcr {
		fn recognize(&self, image: &[u8]) -> Result<Option<String>, Error> {
			let text = String::from_utf8(image.to_vec())?;
			match text.as_str() {
				"FAIL" => bail!("service unavailable"),
				"" => Ok(None),
				_ => Ok(Some(text)),
			}
		}
	}

	#[derive(Default)]
	struct Collect {
		items: Vec<ReviewItem>,
		fail: bool,
	}

	impl ReviewSink for Collect {
		fn divert(&mut self, item: &ReviewItem) -> Result<(), Error> {
			if self.fail {
				bail!("disk full");
			}
			self.items.push(item.clone());
			Ok(())
		}
	}

	fn campinas() -> Ledger {
		Ledger::new(vec![LedgerRow::new(
			"CAMPINAS",
			"LOJA 1",
			Some(Quant::from_i128(100)),
		)])
	}

	fn record(m: &[&str], e: &[&str], amount: Option<Quant>) -> ExtractedRecord {
		ExtractedRecord {
			municipalities: m.iter().map(|s| s.to_string()).collect(),
			establishments: e.iter().map(|s| s.to_string()).collect(),
			amount,
		}
	}

	fn two_towns() -> Ledger {
		Ledger::new(vec![
			LedgerRow::new("CAMPINAS", "LOJA A", Some(Quant::zero())),
			LedgerRow::new("SUMARE", "LOJA B", Some(Quant::zero())),
		])
	}

	fn scripted(establishment_a: f64) -> Reconciler<Scripted> {
		Reconciler::with_metric(Scripted(HashMap::from([
			(("CAMPINAS", "CAMPINAS"), 1.0),
			(("SUMARE", "SUMARE"), 1.0),
			(("LOJA A", "LOJA X"), establishment_a),
			(("LOJA B", "LOJA X"), 0.7),
		])))
	}

	#[test]
	fn test_accumulates_on_match() {
		let mut ledger = campinas();
		let outcome = Reconciler::new().reconcile_record(
			&mut ledger,
			&record(&["CAMPINAS"], &["LOJA 1"], Some(Quant::from_i128(50))),
		);

		assert_eq!(
			outcome,
			Outcome::Matched {
				municipality: "CAMPINAS".into(),
				establishment: "LOJA 1".into(),
				amount: Quant::from_i128(50),
			}
		);
		assert_eq!(ledger.rows()[0].total, Some(Quant::new(1500, 1)));
	}

	#[test]
	fn test_candidates_are_normalized() {
		let mut ledger = campinas();
		let outcome = Reconciler::new().reconcile_record(
			&mut ledger,
			&record(&[" campinas"], &["Loja 1 "], Some(Quant::from_i128(1))),
		);
		assert!(matches!(outcome, Outcome::Matched { .. }));
	}

	#[test]
	fn test_noisy_ocr_still_matches() {
		let mut ledger = Ledger::new(vec![
			LedgerRow::new("SAO PAULO", "MERCADO CENTRAL", Some(Quant::zero())),
			LedgerRow::new("RIO DE JANEIRO", "MERCADO CENTRAL", Some(Quant::zero())),
		]);
		let outcome = Reconciler::new().reconcile_record(
			&mut ledger,
			&record(&["SAO PAOLO"], &["MERCAD0 CENTRAL"], Some(Quant::new(99, 1))),
		);

		assert!(matches!(outcome, Outcome::Matched { .. }));
		assert_eq!(ledger.rows()[0].total, Some(Quant::new(99, 1)));
		assert_eq!(ledger.rows()[1].total, Some(Quant::zero()));
	}

	#[test]
	fn test_resolution_reports_score() {
		let ledger = two_towns();
		let resolution = scripted(0.8).resolve(
			&ledger,
			&record(&["CAMPINAS"], &["LOJA X"], Some(Quant::from_i128(7))),
		);

		assert_eq!(
			resolution,
			Some(Resolution {
				municipality: "CAMPINAS",
				establishment: "LOJA A",
				score: 0.8,
			})
		);
	}

	#[test]
	fn test_threshold_is_inclusive() {
		let mut ledger = two_towns();
		let outcome = scripted(0.65).reconcile_record(
			&mut ledger,
			&record(&["CAMPINAS", "SUMARE"], &["LOJA X"], Some(Quant::from_i128(7))),
		);

		assert_eq!(
			outcome,
			Outcome::Matched {
				municipality: "CAMPINAS".into(),
				establishment: "LOJA A".into(),
				amount: Quant::from_i128(7),
			}
		);
	}

	#[test]
	fn test_below_threshold_drops_first_municipality() {
		let mut ledger = two_towns();
		let outcome = scripted(0.649).reconcile_record(
			&mut ledger,
			&record(&["CAMPINAS", "SUMARE"], &["LOJA X"], Some(Quant::from_i128(7))),
		);

		assert_eq!(
			outcome,
			Outcome::Matched {
				municipality: "SUMARE".into(),
				establishment: "LOJA B".into(),
				amount: Quant::from_i128(7),
			}
		);
		assert_eq!(ledger.rows()[0].total, Some(Quant::zero()));
		assert_eq!(ledger.rows()[1].total, Some(Quant::from_i128(7)));
	}

	#[test]
	fn test_no_match_after_exhausting_candidates() {
		let mut ledger = two_towns();
		let outcome = scripted(0.649).reconcile_record(
			&mut ledger,
			&record(&["CAMPINAS"], &["LOJA X"], Some(Quant::from_i128(7))),
		);

		assert_eq!(outcome, Outcome::Review(ReviewReason::NoMatchFound));
		assert_eq!(ledger.rows(), two_towns().rows());
	}

	#[test]
	fn test_incomplete_record_is_not_matched() {
		let mut ledger = campinas();
		let reconciler = Reconciler::new();
		for incomplete in [
			record(&["CAMPINAS"], &[], Some(Quant::from_i128(1))),
			record(&[], &["LOJA 1"], Some(Quant::from_i128(1))),
			record(&["CAMPINAS"], &["LOJA 1"], None),
		] {
			assert_eq!(
				reconciler.reconcile_record(&mut ledger, &incomplete),
				Outcome::Review(ReviewReason::ExtractionIncomplete)
			);
		}
		assert_eq!(ledger.rows(), campinas().rows());
	}

	#[test]
	fn test_pages_route_to_review() {
		let mut ledger = campinas();
		let pages = TextPages(vec![
			(0, Some("Municipio: Campinas\nEstabelecimento: Loja 1\nR$ 50,00")),
			(3, Some("Municipio: Campinas\nTotal R$ 50,00")),
		]);
		let mut review = Collect::default();

		let summary =
			Reconciler::new().reconcile_pages(&mut ledger, &pages, &EchoOcr, &mut review);

		assert_eq!(ledger.rows()[0].total, Some(Quant::from_i128(150)));
		assert_eq!(
			review.items,
			vec![ReviewItem::new(3, ReviewReason::ExtractionIncomplete)]
		);
		assert_eq!(
			summary,
			RunSummary {
				scans: 2,
				matched: 1,
				reviewed: 1,
				review_failures: 0,
			}
		);
	}

	#[test]
	fn test_collaborator_failures_do_not_abort() {
		let mut ledger = campinas();
		let pages = TextPages(vec![
			(0, Some("FAIL")),
			(1, None),
			(2, Some("")),
			(3, Some("Municipio: Campinas\nEstabelecimento: Loja 1\n10,00")),
		]);
		let mut review = Collect::default();

		let summary =
			Reconciler::new().reconcile_pages(&mut ledger, &pages, &EchoOcr, &mut review);

		assert_eq!(summary.matched, 1);
		assert_eq!(ledger.rows()[0].total, Some(Quant::from_i128(110)));
		assert_eq!(
			review.items,
			vec![
				ReviewItem::new(0, ReviewReason::NoText),
				ReviewItem::new(1, ReviewReason::NoText),
				ReviewItem::new(2, ReviewReason::NoText),
			]
		);
	}

	#[test]
	fn test_review_sink_failure_is_counted() {
		let mut ledger = campinas();
		let pages = TextPages(vec![(0, None), (1, None)]);
		let mut review = Collect {
			fail: true,
			..Default::default()
		};

		let summary =
			Reconciler::new().reconcile_pages(&mut ledger, &pages, &EchoOcr, &mut review);

		assert_eq!(summary.reviewed, 2);
		assert_eq!(summary.review_failures, 2);
	}

	#[test]
	fn test_ingest_report_appends_verbatim() {
		let mut ledger = campinas();
		let text = "CONSULTAS GERENCIAIS\n\
			Municipio: Valinhos\n\
			Estabelecimento: Padaria Sol\n\
			Municipio: Vinhedo\n\
			Estabelecimento: Mercado Lua\n\
			Total geral 2.500,00\n";

		let appended = Reconciler::new()
			.ingest_report(&mut ledger, Some(text))
			.unwrap();

		assert_eq!(appended, 2);
		assert_eq!(
			ledger.rows()[1..],
			[
				LedgerRow::new("Valinhos", "Padaria Sol", Some(Quant::from_i128(2500))),
				LedgerRow::new("Vinhedo", "Mercado Lua", Some(Quant::from_i128(2500))),
			]
		);
	}

	#[test]
	fn test_ingest_empty_report() {
		let mut ledger = campinas();
		assert_eq!(Reconciler::new().ingest_report(&mut ledger, None), Ok(0));
		assert_eq!(ledger.rows().len(), 1);
	}
}
