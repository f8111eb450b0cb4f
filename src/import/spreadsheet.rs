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
use crate::parsing::money::parse_amount;
use crate::util::quant::Quant;
use anyhow::{anyhow, bail, Error};
use calamine::{open_workbook_auto, Data, Reader};
use rust_xlsxwriter::Workbook;
use std::path::Path;

pub const MUNICIPALITY_HEADER: &str = "Municipio";
pub const ESTABLISHMENT_HEADER: &str = "Estabelecimento";
pub const TOTAL_HEADER: &str = "Valor Total";

/// Persistence for ledger rows in tabular form.
pub trait TableStore {
	fn read_table(&self, path: &Path) -> Result<Vec<LedgerRow>, Error>;
	fn write_table(&self, path: &Path, rows: &[LedgerRow]) -> Result<(), Error>;
}

/// Excel workbooks. Reads the first worksheet of any format calamine
/// understands (xlsx, xls, xlsb, ods); always writes xlsx.
///
/// Columns are located by header name in the first row, so extra columns
/// and column order don't matter on the way in. On the way out only the
/// three ledger columns are written.
pub struct Xlsx;

impl TableStore for Xlsx {
	fn read_table(&self, path: &Path) -> Result<Vec<LedgerRow>, Error> {
		let mut workbook = open_workbook_auto(path)
			.map_err(|e| anyhow!("Failed to open {}: {}", path.display(), e))?;

		let range = workbook
			.worksheet_range_at(0)
			.ok_or_else(|| anyhow!("{} contains no sheets", path.display()))?
			.map_err(|e| anyhow!("Failed to read {}: {}", path.display(), e))?;

		let mut lines = range.rows();
		let header = match lines.next() {
			Some(h) => h,
			None => bail!("{} is empty", path.display()),
		};

		let column = |name: &str| -> Result<usize, Error> {
			header
				.iter()
				.position(|cell| cell.to_string().trim() == name)
				.ok_or_else(|| {
					anyhow!("{} has no '{}' column", path.display(), name)
				})
		};
		let (m, e, t) = (
			column(MUNICIPALITY_HEADER)?,
			column(ESTABLISHMENT_HEADER)?,
			column(TOTAL_HEADER)?,
		);

		let mut rows = vec![];
		for (i, line) in lines.enumerate() {
			rows.push(LedgerRow {
				municipality: text_cell(line.get(m)),
				establishment: text_cell(line.get(e)),
				total: amount_cell(line.get(t))
					.map_err(|err| anyhow!("{} (row {})", err, i + 2))?,
			});
		}

		Ok(rows)
	}

	fn write_table(&self, path: &Path, rows: &[LedgerRow]) -> Result<(), Error> {
		let mut workbook = Workbook::new();
		let worksheet = workbook.add_worksheet();

		for (col, name) in
			[MUNICIPALITY_HEADER, ESTABLISHMENT_HEADER, TOTAL_HEADER]
				.iter()
				.enumerate()
		{
			worksheet.write_string(0, col as u16, *name)?;
		}

		for (i, row) in rows.iter().enumerate() {
			let line = i as u32 + 1;
			if let Some(municipality) = &row.municipality {
				worksheet.write_string(line, 0, municipality)?;
			}
			if let Some(establishment) = &row.establishment {
				worksheet.write_string(line, 1, establishment)?;
			}
			if let Some(total) = row.total {
				worksheet.write_number(line, 2, total.to_f64())?;
			}
		}

		workbook
			.save(path)
			.map_err(|e| anyhow!("Failed to save {}: {}", path.display(), e))?;
		Ok(())
	}
}

fn text_cell(cell: Option<&Data>) -> Option<String> {
	match cell {
		None | Some(Data::Empty) => None,
		Some(c) => {
			let s = c.to_string();
			if s.trim().is_empty() {
				None
			} else {
				Some(s)
			}
		},
	}
}

/// Numbers come in exactly. Text that looks like a plain decimal must read
/// as one; anything else (`R$ 1.234,56`) goes through the currency parser.
fn amount_cell(cell: Option<&Data>) -> Result<Option<Quant>, Error> {
	match cell {
		None | Some(Data::Empty) => Ok(None),
		Some(Data::Float(f)) => Quant::from_f64(*f).map(Some),
		Some(Data::Int(i)) => Ok(Some(Quant::from_i128(*i as i128))),
		Some(Data::String(s)) if s.trim().is_empty() => Ok(None),
		Some(Data::String(s)) if is_plain_decimal(s) => {
			Quant::from_str(s).map(Some)
		},
		Some(Data::String(s)) => Ok(Some(parse_amount(s.trim())?)),
		Some(other) => bail!("Unreadable total: {}", other),
	}
}

fn is_plain_decimal(s: &str) -> bool {
	s.trim()
		.chars()
		.all(|c| c.is_ascii_digit() || c == '.' || c == '-')
}
