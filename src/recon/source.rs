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

/// One embedded image of a scanned page. A page may carry several images,
/// and so appear several times.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageImage {
	/// Zero-based index of the page in its document.
	pub page_index: usize,

	/// None when the page's images could not be read at all.
	pub image: Option<Vec<u8>>,
}

/// A document that can be broken into page images.
pub trait PageSource {
	/// Every embedded image, in document order. Pages without images
	/// contribute nothing.
	fn page_images(&self) -> Vec<PageImage>;
}

/// Optical character recognition.
pub trait TextRecognizer {
	/// The text recognized in the image, or None if there was none.
	fn recognize(&self, image: &[u8]) -> Result<Option<String>, Error>;
}
