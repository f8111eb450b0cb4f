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
use crate::gl::row::LedgerRow;
use crate::import::spreadsheet::TableStore;
use crate::parsing::extractor::ExtractedRecord;
use crate::util::quant::Quant;
use anyhow::{bail, Error};
use std::path::Path;
use tracing::{debug, info};

/// The reference table ("gabarito") of municipality/establishment pairs and
/// the totals accumulated against them during a run.
///
/// The Ledger is the only mutable state of a reconciliation: pages are
/// matched against its rows one at a time and their amounts added in place.
/// Pairs are not required to be unique, but accumulation only ever touches
/// the first row holding a given pair.
#[derive(Debug, Default)]
pub struct Ledger {
	rows: Vec<LedgerRow>,
}

impl Ledger {
	/// Builds a ledger from reference rows, upper-casing and trimming the
	/// name fields so they compare against normalized OCR output.
	pub fn new(rows: Vec<LedgerRow>) -> Self {
		let mut rows = rows;
		for row in &mut rows {
			row.normalize();
		}
		Self { rows }
	}

	/// Reads the reference table. An unreadable or empty table is fatal,
	/// since nothing could ever be matched against it.
	pub fn load<T: TableStore>(store: &T, path: &Path) -> Result<Self, Error> {
		let rows = store.read_table(path)?;
		if rows.iter().all(|r| r.is_empty()) {
			bail!("Reference table {} has no rows", path.display());
		}

		info!(rows = rows.len(), path = %path.display(), "loaded reference table");
		Ok(Self::new(rows))
	}

	pub fn persist<T: TableStore>(
		&self,
		store: &T,
		path: &Path,
	) -> Result<(), Error> {
		store.write_table(path, &self.rows)?;
		info!(rows = self.rows.len(), path = %path.display(), "saved ledger");
		Ok(())
	}

	// -----------
	// -- INPUT --
	// -----------

	/// Appends one row per municipality/establishment pair of the record,
	/// paired by position, each carrying the record's single amount. Values
	/// are taken verbatim.
	pub fn append(&mut self, record: &ExtractedRecord) -> usize {
		let before = self.rows.len();
		for (municipality, establishment) in
			record.municipalities.iter().zip(&record.establishments)
		{
			self.rows.push(LedgerRow::new(
				municipality,
				establishment,
				record.amount,
			));
		}
		self.rows.len() - before
	}

	/// Adds the amount to the first row holding exactly this pair (after
	/// trimming). Returns false, touching nothing, if there is no such row.
	pub fn accumulate(
		&mut self,
		municipality: &str,
		establishment: &str,
		amount: Quant,
	) -> bool {
		match self
			.rows
			.iter_mut()
			.find(|r| r.is_pair(municipality, establishment))
		{
			Some(row) => {
				row.add(amount);
				debug!(municipality, establishment, %amount, "accumulated");
				true
			},
			None => false,
		}
	}

	/// Removes rows where no field is populated. Returns how many went.
	pub fn drop_incomplete(&mut self) -> usize {
		let before = self.rows.len();
		self.rows.retain(|r| !r.is_empty());
		before - self.rows.len()
	}

	// ------------
	// -- OUTPUT --
	// ------------

	pub fn rows(&self) -> &Vec<LedgerRow> {
		&self.rows
	}

	/// Distinct municipalities, in the order first seen.
	pub fn municipalities(&self) -> Vec<&str> {
		let mut out: Vec<&str> = vec![];
		for m in self.rows.iter().filter_map(|r| r.municipality.as_deref()) {
			if !out.contains(&m) {
				out.push(m);
			}
		}
		out
	}

	/// Establishments of every row whose municipality is exactly the given
	/// one, in row order.
	pub fn establishments_of(&self, municipality: &str) -> Vec<&str> {
		self.rows
			.iter()
			.filter(|r| r.municipality.as_deref() == Some(municipality))
			.filter_map(|r| r.establishment.as_deref())
			.collect()
	}
}
