//! HTTP transport for the note-storage client.
//!
//! Each operation maps to a POST of the opaque request payload to
//! `{endpoint}/{operation}`; the response body is the opaque reply. This
//! is the only place the sample application touches a real wire.

use ns::{Transport, TransportError, TransportFuture};
use std::time::Duration;

pub struct HttpTransport {
	client: reqwest::Client,
}

impl HttpTransport {
	pub fn new() -> anyhow::Result<Self> {
		let client = reqwest::Client::builder().build()?;
		Ok(Self { client })
	}
}

impl Transport for HttpTransport {
	fn send(
		&self,
		endpoint: &str,
		operation: &str,
		payload: Vec<u8>,
		timeout: Duration,
	) -> TransportFuture<'_> {
		let url = format!("{}/{}", endpoint.trim_end_matches('/'), operation);
		let request = self
			.client
			.post(url)
			.timeout(timeout)
			.header(reqwest::header::CONTENT_TYPE, "application/json")
			.body(payload);

		Box::pin(async move {
			let response = request.send().await.map_err(|err| {
				if err.is_timeout() {
					TransportError::Timeout(timeout)
				} else if err.is_connect() {
					TransportError::ConnectFailed(err.to_string())
				} else {
					TransportError::Io(err.to_string())
				}
			})?;

			let status = response.status();
			if !status.is_success() {
				return Err(TransportError::Io(format!("http status {status}")));
			}

			let body = response
				.bytes()
				.await
				.map_err(|err| TransportError::Io(err.to_string()))?;
			Ok(body.to_vec())
		})
	}
}
