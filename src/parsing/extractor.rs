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
use crate::parsing::money::{parse_amount, ParseError};
use crate::util::quant::Quant;
use regex::Regex;

/// What could be read off one page or document. Labels and amounts are
/// found independently of each other, so a page may carry several
/// municipality and establishment candidates but only ever one amount.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ExtractedRecord {
	pub municipalities: Vec<String>,
	pub establishments: Vec<String>,

	/// The largest monetary value found anywhere in the text, taken to be
	/// the document total.
	pub amount: Option<Quant>,
}

impl ExtractedRecord {
	/// True when there is at least one municipality, one establishment and
	/// an amount, i.e. enough to attempt a match.
	pub fn is_complete(&self) -> bool {
		!self.municipalities.is_empty()
			&& !self.establishments.is_empty()
			&& self.amount.is_some()
	}
}

/// Scans free-form OCR or PDF text for labelled fields and monetary values.
pub struct Extractor {
	municipality_regex: Regex,
	establishment_regex: Regex,
	amount_regex: Regex,
}

impl Extractor {
	pub fn new() -> Self {
		Self {
			municipality_regex: Regex::new(r"(?i)munic[ií]pio:\s*(.*)").unwrap(),
			establishment_regex: Regex::new(r"(?i)estabelecimento:\s*(.*)")
				.unwrap(),
			// thousands + decimal groups, or a bare decimal group, optionally
			// preceded by a currency sign
			amount_regex: Regex::new(
				r"(?:^|\s)(?:R\$?\s?)?([0-9]{1,3}[.,][0-9]{3}[.,][0-9]{1,2}|[0-9]{1,3}[.,][0-9]{1,2})\b",
			)
			.unwrap(),
		}
	}

	/// Extracts labelled municipalities and establishments (trimmed, in
	/// order, duplicates kept) and the maximum monetary amount.
	///
	/// Absent text yields an empty record rather than an error; it simply
	/// won't be complete.
	pub fn extract(
		&self,
		text: Option<&str>,
	) -> Result<ExtractedRecord, ParseError> {
		let text = match text {
			None => return Ok(ExtractedRecord::default()),
			Some(t) => t,
		};

		let municipalities = Self::labelled(&self.municipality_regex, text);
		let establishments = Self::labelled(&self.establishment_regex, text);

		let mut amount: Option<Quant> = None;
		for captures in self.amount_regex.captures_iter(text) {
			let value = parse_amount(&captures[1])?;
			amount = Some(match amount {
				Some(current) if current >= value => current,
				_ => value,
			});
		}

		Ok(ExtractedRecord {
			municipalities,
			establishments,
			amount,
		})
	}

	fn labelled(regex: &Regex, text: &str) -> Vec<String> {
		regex
			.captures_iter(text)
			.map(|c| c[1].trim().to_string())
			.collect()
	}
}
