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
use crate::config::config_file::Ocr;
use crate::import::http::Client;
use crate::import::vision::models::{
	AnnotateRequest, AnnotateResponse, Feature, Image, ImageRequest,
};
use crate::recon::source::TextRecognizer;
use anyhow::{anyhow, bail, Error};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use tracing::debug;

const VISION_API_URL: &str = "https://vision.googleapis.com/v1";

const DEFAULT_FEATURE: &str = "DOCUMENT_TEXT_DETECTION";

/// Recognizes text through the Google Cloud Vision annotate endpoint, one
/// image per request.
pub struct VisionRecognizer {
	http: Client,
	feature: String,
}

impl VisionRecognizer {
	pub fn new(config: Ocr) -> Result<Self, Error> {
		let api_key = config
			.api_key
			.ok_or_else(|| anyhow!("no ocr api key in config"))?;

		let api_url = config.api_url.unwrap_or(VISION_API_URL.to_owned());

		Ok(VisionRecognizer {
			http: Client::new(&api_url, api_key),
			feature: config.feature.unwrap_or(DEFAULT_FEATURE.to_owned()),
		})
	}

	fn request(&self, image: &[u8]) -> AnnotateRequest {
		AnnotateRequest {
			requests: vec![ImageRequest {
				image: Image {
					content: STANDARD.encode(image),
				},
				features: vec![Feature {
					typ: self.feature.clone(),
				}],
			}],
		}
	}
}

/// The full text of the first annotation, which covers the whole image.
/// An error reported inside the body fails the call even on a 2xx status.
fn first_text(response: AnnotateResponse) -> Result<Option<String>, Error> {
	let Some(first) = response.responses.into_iter().next() else {
		return Ok(None);
	};

	if let Some(status) = first.error {
		bail!("vision error {}: {}", status.code, status.message);
	}

	Ok(first
		.text_annotations
		.into_iter()
		.next()
		.map(|a| a.description)
		.filter(|d| !d.trim().is_empty()))
}

impl TextRecognizer for VisionRecognizer {
	fn recognize(&self, image: &[u8]) -> Result<Option<String>, Error> {
		debug!(bytes = image.len(), "sending image to vision");
		let response: AnnotateResponse =
			self.http.post("images:annotate", &self.request(image))?;
		first_text(response)
	}
}
