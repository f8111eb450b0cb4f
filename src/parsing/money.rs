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
use thiserror::Error;

/// Failure to read a currency-like string as a number. Always carries the
/// input as it was given.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseError {
	#[error("monetary value too short to read: {0:?}")]
	TooShort(String),
	#[error("monetary value is not numeric: {0:?}")]
	NotNumeric(String),
	#[error("monetary value out of range: {0:?}")]
	Overflow(String),
}

fn is_separator(c: char) -> bool {
	c == '.' || c == ','
}

/// Converts a currency-like substring in either Brazilian (`1.234,56`) or
/// anglophone (`1,234.56`) layout to an exact decimal.
///
/// Which separator is decimal is never decided; instead, the second-to-last
/// character decides how many fractional digits there are. If it is a
/// separator the value has one decimal place (`12,5`), otherwise two
/// (`12,50`, `R$ 45.00`). Everything but digits is then thrown away and the
/// resulting integer is scaled down accordingly.
pub fn parse_amount(raw: &str) -> Result<Quant, ParseError> {
	let chars: Vec<char> = raw.chars().collect();
	if chars.len() < 2 {
		return Err(ParseError::TooShort(raw.to_string()));
	}

	let exp = if is_separator(chars[chars.len() - 2]) { 1 } else { 2 };

	let digits: String = chars.iter().filter(|c| c.is_ascii_digit()).collect();

	if digits.is_empty() {
		return Err(ParseError::NotNumeric(raw.to_string()));
	}

	digits
		.parse::<i128>()
		.ok()
		.and_then(|units| Quant::checked_new(units, exp))
		.ok_or_else(|| ParseError::Overflow(raw.to_string()))
}
