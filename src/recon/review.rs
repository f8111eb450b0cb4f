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
use anyhow::Error;
use std::fmt;

/// Why a page could not be reconciled automatically.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReviewReason {
	/// No text came back for the page, including when the page's image or
	/// the OCR call failed.
	NoText,
	/// Text was read, but a municipality, an establishment or an amount was
	/// missing from it.
	ExtractionIncomplete,
	/// Nothing in the reference table matched confidently enough.
	NoMatchFound,
}

impl fmt::Display for ReviewReason {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			ReviewReason::NoText => write!(f, "no text recognized"),
			ReviewReason::ExtractionIncomplete => write!(f, "incomplete data"),
			ReviewReason::NoMatchFound => write!(f, "no confident match"),
		}
	}
}

/// A page pulled out of the automated pipeline for a human to look at. It
/// is never retried.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReviewItem {
	/// Zero-based index of the page in the source document.
	pub page_index: usize,
	pub reason: ReviewReason,
}

impl ReviewItem {
	pub fn new(page_index: usize, reason: ReviewReason) -> Self {
		Self { page_index, reason }
	}

	/// Pages are numbered from one for humans.
	pub fn page_number(&self) -> usize {
		self.page_index + 1
	}

	pub fn file_name(&self) -> String {
		format!("page_{}.pdf", self.page_number())
	}
}

/// Somewhere pages that need manual review can be set aside.
pub trait ReviewSink {
	fn divert(&mut self, item: &ReviewItem) -> Result<(), Error>;
}
