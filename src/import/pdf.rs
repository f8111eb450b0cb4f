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
use crate::recon::review::{ReviewItem, ReviewSink};
use crate::recon::source::{PageImage, PageSource};
use anyhow::{anyhow, bail, Error};
use lopdf::Document;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Default directory where pages needing manual review are written.
pub const REVIEW_DIR: &str = "notas_nao_lidas";

/// A PDF loaded in full. Pages are numbered from one inside the PDF, but
/// addressed here by zero-based index like everything else.
pub struct PdfDocument {
	path: PathBuf,
	document: Document,
}

impl PdfDocument {
	/// Loads the document. A document without pages is an error, since
	/// there would be nothing to process.
	pub fn open(path: &Path) -> Result<Self, Error> {
		let document = Document::load(path)
			.map_err(|e| anyhow!("Failed to open {}: {}", path.display(), e))?;

		if document.get_pages().is_empty() {
			bail!("{} has no pages", path.display());
		}

		Ok(Self {
			path: path.to_path_buf(),
			document,
		})
	}

	pub fn page_count(&self) -> usize {
		self.document.get_pages().len()
	}

	/// The embedded text of every page, concatenated in page order.
	pub fn text(&self) -> Result<String, Error> {
		let numbers: Vec<u32> = self.document.get_pages().into_keys().collect();
		self.document.extract_text(&numbers).map_err(|e| {
			anyhow!("Failed to read text from {}: {}", self.path.display(), e)
		})
	}

	/// Writes the page at the given index as a standalone PDF.
	pub fn extract_single_page(
		&self,
		page_index: usize,
		destination: &Path,
	) -> Result<(), Error> {
		let keep = page_index as u32 + 1;
		let pages = self.document.get_pages();
		if !pages.contains_key(&keep) {
			bail!("{} has no page {}", self.path.display(), keep);
		}

		let mut single = self.document.clone();
		let others: Vec<u32> =
			pages.keys().copied().filter(|n| *n != keep).collect();
		single.delete_pages(&others);
		single.prune_objects();
		single.save(destination).map_err(|e| {
			anyhow!("Failed to write {}: {}", destination.display(), e)
		})?;

		Ok(())
	}
}

impl PageSource for PdfDocument {
	fn page_images(&self) -> Vec<PageImage> {
		let mut out = vec![];

		for (number, page_id) in self.document.get_pages() {
			let page_index = number as usize - 1;

			match self.document.get_page_images(page_id) {
				Ok(images) => {
					if images.is_empty() {
						debug!(page = number, "page has no images");
					}
					out.extend(images.into_iter().map(|image| PageImage {
						page_index,
						image: Some(image.content.to_vec()),
					}));
				},
				Err(e) => {
					warn!(page = number, "could not read page images: {}", e);
					out.push(PageImage {
						page_index,
						image: None,
					});
				},
			}
		}

		out
	}
}

/// Sets pages aside by copying each into its own PDF in a review
/// directory, named after its one-based page number.
pub struct PdfReviewSink<'a> {
	source: &'a PdfDocument,
	dir: PathBuf,
}

impl<'a> PdfReviewSink<'a> {
	pub fn new(source: &'a PdfDocument, dir: &Path) -> Self {
		Self {
			source,
			dir: dir.to_path_buf(),
		}
	}
}

impl ReviewSink for PdfReviewSink<'_> {
	fn divert(&mut self, item: &ReviewItem) -> Result<(), Error> {
		fs::create_dir_all(&self.dir)?;

		let destination = self.dir.join(item.file_name());
		self.source.extract_single_page(item.page_index, &destination)?;

		info!(
			"Page {} moved to {} ({})",
			item.page_number(),
			self.dir.display(),
			item.reason
		);
		Ok(())
	}
}
