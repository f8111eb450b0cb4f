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
use crate::util::quant::Quant;

/// Upper-cases and trims a reference field so OCR output and spreadsheet
/// input compare on equal terms.
pub fn normalize(field: &str) -> String {
	field.trim().to_uppercase()
}

/// One municipality/establishment pair and its running total. Any field may
/// be missing, e.g. a blank spreadsheet cell or a report with no amount.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LedgerRow {
	pub municipality: Option<String>,
	pub establishment: Option<String>,
	pub total: Option<Quant>,
}

impl LedgerRow {
	pub fn new(
		municipality: &str,
		establishment: &str,
		total: Option<Quant>,
	) -> Self {
		Self {
			municipality: Some(municipality.to_string()),
			establishment: Some(establishment.to_string()),
			total,
		}
	}

	/// Upper-cases and trims both name fields in place.
	pub fn normalize(&mut self) {
		for field in [&mut self.municipality, &mut self.establishment] {
			if let Some(value) = field {
				*value = normalize(value);
			}
		}
	}

	/// True when no field holds anything.
	pub fn is_empty(&self) -> bool {
		let blank = |f: &Option<String>| {
			f.as_deref().map(|s| s.trim().is_empty()).unwrap_or(true)
		};
		blank(&self.municipality)
			&& blank(&self.establishment)
			&& self.total.is_none()
	}

	/// Exact comparison after trimming both sides.
	pub fn is_pair(&self, municipality: &str, establishment: &str) -> bool {
		let same = |field: &Option<String>, value: &str| {
			field.as_deref().map(|f| f.trim() == value.trim()).unwrap_or(false)
		};
		same(&self.municipality, municipality)
			&& same(&self.establishment, establishment)
	}

	/// Adds to the running total; a missing total counts as zero.
	pub fn add(&mut self, amount: Quant) {
		self.total = Some(self.total.unwrap_or_default() + amount);
	}
}
