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
use anyhow::{anyhow, bail, Error};
use std::cmp::Ordering;
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign};

/// Decimal places kept when a binary float (e.g. a spreadsheet cell) is
/// brought into a Quant.
const FLOAT_PRECISION: u32 = 6;

/// Most decimal places a parsed value may carry. Every value read from
/// input must also fit in i128 once scaled to this many places, so any two
/// values can be aligned without overflowing.
const MAX_EXP: u32 = 12;

/// An exact base-10 decimal: `units / 10^exp`. Monetary values read off
/// delivery notes and spreadsheets only ever need a handful of decimal
/// places, so a scaled i128 is plenty and keeps accumulation exact.
///
/// Equality and ordering are by value, so 12.5 == 12.50. The
/// exponent still matters for rendering: it is the number of decimal
/// places printed by Display.
#[derive(Clone, Copy, Debug, Default)]
pub struct Quant {
	units: i128,
	exp: u32,
}

impl Quant {
	pub fn zero() -> Self {
		Self { units: 0, exp: 0 }
	}

	/// Creates a new Quant as though a decimal point were inserted `exp`
	/// places from the right of `units`.
	pub fn new(units: i128, exp: u32) -> Self {
		Self { units, exp }
	}

	pub fn from_i128(amount: i128) -> Self {
		Self::new(amount, 0)
	}

	/// Like `new`, but for values coming from input: refuses more than
	/// MAX_EXP decimal places, and magnitudes that would not survive being
	/// aligned against another value.
	pub fn checked_new(units: i128, exp: u32) -> Option<Self> {
		if exp > MAX_EXP {
			return None;
		}
		units.checked_mul(10i128.checked_pow(MAX_EXP - exp)?)?;
		Some(Self::new(units, exp))
	}

	/// Parses a plain decimal such as `-1234.56`. No grouping separators.
	pub fn from_str(input: &str) -> Result<Self, Error> {
		let trimmed = input.trim();
		let is_negative = trimmed.starts_with('-');
		let sanitized = trimmed.trim_start_matches('-');

		let parts: Vec<&str> = sanitized.split('.').collect();
		let (digits, exp) = match parts.len() {
			1 => (parts[0].to_string(), 0),
			2 => (format!("{}{}", parts[0], parts[1]), parts[1].len() as u32),
			_ => bail!("Invalid decimal format: {}", input),
		};

		if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
			bail!("Invalid decimal format: {}", input);
		}

		let units = digits
			.parse::<i128>()
			.map_err(|e| anyhow!("{}: {}", e, input))?;

		let units = if is_negative { -units } else { units };
		Self::checked_new(units, exp)
			.ok_or_else(|| anyhow!("Decimal out of range: {}", input))
	}

	/// Brings a float in at a fixed precision, then trims trailing zeroes
	/// so 45.0 renders as 45 rather than 45.000000.
	pub fn from_f64(value: f64) -> Result<Self, Error> {
		if !value.is_finite() {
			bail!("Cannot represent {} as a decimal", value);
		}
		let mut out =
			Self::from_str(&format!("{:.*}", FLOAT_PRECISION as usize, value))?;
		out.normalize();
		Ok(out)
	}

	pub fn to_f64(&self) -> f64 {
		self.units as f64 / 10f64.powi(self.exp as i32)
	}

	/// Drops trailing fractional zeroes without changing the value.
	fn normalize(&mut self) {
		while self.exp > 0 && self.units % 10 == 0 {
			self.units /= 10;
			self.exp -= 1;
		}
	}

	/// Returns both values' units scaled to the larger of the two exponents.
	/// Saturates rather than overflowing; values built through `checked_new`
	/// never get that far.
	fn aligned(&self, other: &Self) -> (i128, i128, u32) {
		let exp = self.exp.max(other.exp);
		let scale = |q: &Self| {
			q.units.saturating_mul(10i128.saturating_pow(exp - q.exp))
		};
		(scale(self), scale(other), exp)
	}

	/// Renders with exactly two decimal places and a comma as the decimal
	/// separator, without thousands grouping: 1234.5 -> "1234,50". Rounds
	/// half away from zero.
	pub fn brl(&self) -> String {
		let (units, _, _) = self.aligned(&Self::new(0, 2));
		let scale = 10i128.saturating_pow(self.exp.max(2) - 2);
		let mut cents = units / scale;
		let remainder = (units % scale).abs();
		if scale > 1 && remainder * 2 >= scale {
			cents += units.signum();
		}

		let sign = if cents < 0 { "-" } else { "" };
		let cents = cents.unsigned_abs();
		format!("{}{},{:02}", sign, cents / 100, cents % 100)
	}
}

impl fmt::Display for Quant {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let scale = 10u128.saturating_pow(self.exp);
		let magnitude = self.units.unsigned_abs();
		let sign = if self.units < 0 { "-" } else { "" };

		if self.exp == 0 {
			write!(f, "{}{}", sign, magnitude)
		} else {
			write!(
				f,
				"{}{}.{:0width$}",
				sign,
				magnitude / scale,
				magnitude % scale,
				width = self.exp as usize
			)
		}
	}
}

// -----------------
// -- BOILERPLATE --
// -----------------

impl Add for Quant {
	type Output = Self;

	fn add(self, rhs: Self) -> Self::Output {
		let (left, right, exp) = self.aligned(&rhs);
		Self::new(left.saturating_add(right), exp)
	}
}

impl AddAssign for Quant {
	fn add_assign(&mut self, rhs: Self) {
		*self = *self + rhs;
	}
}

impl Sum for Quant {
	fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
		iter.fold(Quant::zero(), |acc, quant| acc + quant)
	}
}

impl PartialEq for Quant {
	fn eq(&self, other: &Self) -> bool {
		let (left, right, _) = self.aligned(other);
		left == right
	}
}

impl Eq for Quant {}

impl PartialOrd for Quant {
	fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
		Some(self.cmp(other))
	}
}

impl Ord for Quant {
	fn cmp(&self, other: &Self) -> Ordering {
		let (left, right, _) = self.aligned(other);
		left.cmp(&right)
	}
}
