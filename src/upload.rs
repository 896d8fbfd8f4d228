//! Resumable media upload in fixed-size chunks.
//!
//! The session is opened with the resource metadata, then the file is sent as successive
//! `PUT`s carrying `Content-Range`. The server answers `308` while it expects more bytes
//! and `200`/`201` with the created resource once the last chunk lands.

// std
use std::path::Path;
// crates.io
use reqwest::{
	StatusCode,
	header::{CONTENT_RANGE, CONTENT_TYPE, HeaderValue, LOCATION},
	redirect::Policy,
};
use tokio::{fs::File, io::AsyncReadExt};
// self
use crate::{
	_prelude::*,
	credential::AccessTokenSource,
	error::{ConfigError, TransientError, TransportError},
	obs::{self, OpKind, OpOutcome, OpSpan},
};

/// Bytes sent per chunk.
pub const CHUNK_SIZE: usize = 1024 * 1024;

const STATUS_RESUME_INCOMPLETE: u16 = 308;

/// Open resumable upload session.
#[derive(Clone)]
pub struct ResumableUpload {
	client: ReqwestClient,
	tokens: Arc<dyn AccessTokenSource>,
	session_url: Url,
	total: u64,
	chunk_size: usize,
}
impl ResumableUpload {
	/// Builds a reqwest client suitable for uploads.
	///
	/// Redirects must stay disabled because `308 Resume Incomplete` would otherwise be
	/// followed as a permanent redirect.
	pub fn http_client() -> Result<ReqwestClient> {
		ReqwestClient::builder()
			.redirect(Policy::none())
			.build()
			.map_err(|e| ConfigError::http_client_build(e).into())
	}

	/// Opens a session at `init_url` for a `size`-byte body of `content_type`.
	///
	/// `uploadType=resumable` is appended to `init_url`; the session URL comes from the
	/// response's `Location` header.
	pub async fn begin(
		client: ReqwestClient,
		tokens: Arc<dyn AccessTokenSource>,
		init_url: Url,
		metadata: &JsonValue,
		content_type: &str,
		size: u64,
	) -> Result<Self> {
		let mut url = init_url;

		url.query_pairs_mut().append_pair("uploadType", "resumable");

		let token = tokens.access_token()?;
		let response = client
			.post(url.clone())
			.bearer_auth(token.expose())
			.header(CONTENT_TYPE, HeaderValue::from_static("application/json; charset=UTF-8"))
			.header("X-Upload-Content-Type", content_type)
			.header("X-Upload-Content-Length", size.to_string())
			.json(metadata)
			.send()
			.await
			.map_err(map_send_error)?;
		let status = response.status();

		if !status.is_success() {
			return Err(rejection(response).await);
		}

		let location = response
			.headers()
			.get(LOCATION)
			.and_then(|value| value.to_str().ok())
			.ok_or_else(|| Error::Api {
				status: status.as_u16(),
				message: "upload session response carries no Location header".into(),
			})?;
		let session_url = url.join(location).map_err(|e| Error::Api {
			status: status.as_u16(),
			message: format!("upload session Location `{location}` is not a URL: {e}"),
		})?;

		Ok(Self { client, tokens, session_url, total: size, chunk_size: CHUNK_SIZE })
	}

	/// Overrides the chunk size; zero is treated as one byte.
	pub fn with_chunk_size(mut self, bytes: usize) -> Self {
		self.chunk_size = bytes.max(1);

		self
	}

	/// Session URL returned by the server.
	pub fn session_url(&self) -> &Url {
		&self.session_url
	}

	/// Streams `path` in chunks and returns the created resource.
	///
	/// Fails with [`Error::UploadIncomplete`] when the file ends before the server
	/// reports completion, and with [`Error::Api`] on any other status.
	pub async fn upload_file(&self, path: impl AsRef<Path>) -> Result<JsonValue> {
		const KIND: OpKind = OpKind::Upload;

		let span = OpSpan::new(KIND, "upload_file");
		let path = path.as_ref();

		obs::record_op_outcome(KIND, OpOutcome::Attempt);

		let result = span
			.instrument(async move {
				let mut file = File::open(path).await.map_err(TransportError::from)?;
				let mut buf = vec![0_u8; self.chunk_size];
				let mut sent = 0_u64;

				loop {
					let len = fill(&mut file, &mut buf).await?;

					if len == 0 {
						// An empty file is finalized by a single range-less request.
						if sent == 0 && self.total == 0 {
							return self
								.send_chunk(&[], 0)
								.await?
								.ok_or(Error::UploadIncomplete { sent });
						}

						return Err(Error::UploadIncomplete { sent });
					}
					if let Some(resource) = self.send_chunk(&buf[..len], sent).await? {
						return Ok(resource);
					}

					sent += len as u64;
				}
			})
			.await;

		obs::record_result(KIND, &result);

		result
	}

	// `Ok(None)` while the server expects more bytes.
	async fn send_chunk(&self, chunk: &[u8], offset: u64) -> Result<Option<JsonValue>> {
		let range = match chunk.len() {
			0 => format!("bytes */{}", self.total),
			len => format!("bytes {offset}-{}/{}", offset + len as u64 - 1, self.total),
		};
		let token = self.tokens.access_token()?;
		let response = self
			.client
			.put(self.session_url.clone())
			.bearer_auth(token.expose())
			.header(CONTENT_RANGE, range)
			.body(chunk.to_vec())
			.send()
			.await
			.map_err(map_send_error)?;

		match response.status() {
			status if status.as_u16() == STATUS_RESUME_INCOMPLETE => Ok(None),
			StatusCode::OK | StatusCode::CREATED => {
				let body = response.bytes().await.map_err(map_send_error)?;
				let mut de = serde_json::Deserializer::from_slice(&body);

				serde_path_to_error::deserialize(&mut de).map(Some).map_err(|source| {
					TransientError::ApiResponseParse { resource: "uploaded resource", source }.into()
				})
			},
			_ => Err(rejection(response).await),
		}
	}
}
impl Debug for ResumableUpload {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("ResumableUpload")
			.field("session_url", &self.session_url)
			.field("total", &self.total)
			.field("chunk_size", &self.chunk_size)
			.finish()
	}
}

// Reads until `buf` is full or the file ends.
async fn fill(file: &mut File, buf: &mut [u8]) -> Result<usize> {
	let mut filled = 0;

	while filled < buf.len() {
		let read = file.read(&mut buf[filled..]).await.map_err(TransportError::from)?;

		if read == 0 {
			break;
		}

		filled += read;
	}

	Ok(filled)
}

async fn rejection(response: reqwest::Response) -> Error {
	let status = response.status().as_u16();
	let message = match response.text().await {
		Ok(text) if !text.trim().is_empty() => text.chars().take(256).collect(),
		_ => "empty response body".into(),
	};

	Error::Api { status, message }
}

fn map_send_error(err: ReqwestError) -> Error {
	if err.is_timeout() {
		return Error::Timeout { operation: "media upload" };
	}

	TransportError::network_at("the upload endpoint", err).into()
}
