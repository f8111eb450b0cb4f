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
use anyhow::bail;
use reqwest::Method;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Blocking JSON client for key-authenticated APIs. The key travels as the
/// `key` query parameter.
pub struct Client {
	client: reqwest::blocking::Client,
	base_url: String,
	api_key: String,
}

impl Client {
	pub fn new(base_url: &str, api_key: String) -> Self {
		Client {
			client: reqwest::blocking::Client::new(),
			base_url: base_url.trim_end_matches('/').to_string(),
			api_key,
		}
	}

	pub fn url(&self, endpoint: &str) -> String {
		format!("{}/{}", self.base_url, endpoint)
	}

	/// Sends a POST with a JSON body and handles the response. Errors on
	/// non-2xx response codes.
	pub fn post<B, R>(&self, endpoint: &str, body: &B) -> Result<R, anyhow::Error>
	where
		B: Serialize,
		R: for<'de> Deserialize<'de>,
	{
		let url = self.url(endpoint);

		let request = self
			.client
			.request(Method::POST, &url)
			.query(&[("key", &self.api_key)])
			.json(body);

		debug!("Sending POST to {}", url);
		let response = request.send()?;

		// Handle non-2xx response codes
		if !response.status().is_success() {
			bail!("Request failed with status: {}", response.status());
		}

		let response_data: R = response.json()?;
		Ok(response_data)
	}
}
