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
use serde::{Deserialize, Serialize};

// -------------
// -- SENDING --
// -------------

#[derive(Debug, Serialize)]
pub struct AnnotateRequest {
	pub requests: Vec<ImageRequest>,
}

#[derive(Debug, Serialize)]
pub struct ImageRequest {
	pub image: Image,
	pub features: Vec<Feature>,
}

#[derive(Debug, Serialize)]
pub struct Image {
	/// Base64 of the raw image bytes.
	pub content: String,
}

#[derive(Debug, Serialize)]
pub struct Feature {
	#[serde(rename = "type")]
	pub typ: String,
}

// ---------------
// -- RECEIVING --
// ---------------

#[derive(Debug, Deserialize)]
pub struct AnnotateResponse {
	#[serde(default)]
	pub responses: Vec<ImageResponse>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageResponse {
	#[serde(default)]
	pub text_annotations: Vec<TextAnnotation>,
	pub error: Option<Status>,
}

#[derive(Debug, Deserialize)]
pub struct TextAnnotation {
	#[serde(default)]
	pub description: String,
}

#[derive(Debug, Deserialize)]
pub struct Status {
	#[serde(default)]
	pub code: i32,
	#[serde(default)]
	pub message: String,
}
