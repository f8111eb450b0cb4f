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
use crate::gl::row::LedgerRow;
use crate::import::spreadsheet::{
	ESTABLISHMENT_HEADER, MUNICIPALITY_HEADER, TOTAL_HEADER,
};
use crate::parsing::extractor::ExtractedRecord;
use crate::reports::table::Table;
use crate::util::quant::Quant;

pub struct LedgerReporter<'a> {
	rows: &'a [LedgerRow],
}

impl<'a> LedgerReporter<'a> {
	pub fn new(ledger: &'a Ledger) -> Self {
		Self {
			rows: ledger.rows(),
		}
	}

	/// One line per ledger row, totals in Brazilian format, followed by the
	/// grand total of every row that has one.
	pub fn table(&self) -> Table {
		let mut table = Table::new(3);
		table.right_align(vec![2]);
		table.add_header(vec![
			MUNICIPALITY_HEADER,
			ESTABLISHMENT_HEADER,
			TOTAL_HEADER,
		]);
		table.add_separator();

		for row in self.rows {
			table.add_row(vec![
				row.municipality.as_deref().unwrap_or_default(),
				row.establishment.as_deref().unwrap_or_default(),
				&row.total.map(|t| t.brl()).unwrap_or_default(),
			]);
		}

		let total: Quant = self.rows.iter().filter_map(|r| r.total).sum();
		table.add_partial_separator(vec![2]);
		table.add_row(vec!["", "", &total.brl()]);

		table
	}

	pub fn print(&self) {
		if self.rows.is_empty() {
			println!("No data");
			return;
		}
		self.table().print();
	}
}

/// Prints what the extractor found in a document, for checking a report's
/// layout before ingesting it.
pub fn print_record(record: &ExtractedRecord) {
	let mut table = Table::new(2);
	for m in &record.municipalities {
		table.add_row(vec![MUNICIPALITY_HEADER, m]);
	}
	for e in &record.establishments {
		table.add_row(vec![ESTABLISHMENT_HEADER, e]);
	}
	let amount = record.amount.map(|a| a.brl()).unwrap_or("-".to_string());
	table.add_row(vec![TOTAL_HEADER, &amount]);
	table.print();
}
