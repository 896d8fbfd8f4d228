//! [`PartnerApi`] over the partner REST endpoints with reqwest.

// crates.io
use reqwest::{
	Method, RequestBuilder, StatusCode,
	header::{ACCEPT, HeaderValue},
};
use serde::de::DeserializeOwned;
// self
use crate::{
	_prelude::*,
	config::PartnerConfig,
	credential::AccessTokenSource,
	error::{ConfigError, TransientError, TransportError},
	partner::{
		Asset, Claim, ClaimSnippet, ContentOwner, ListResponse, PartnerApi, PartnerContext,
		PartnerFuture, Policy, RightsOwnership, VideoAdvertisingOption,
	},
};

const ERROR_PREVIEW_LIMIT: usize = 256;

/// Partner API client that authenticates every request with the current bearer token.
#[derive(Clone)]
pub struct ReqwestPartnerApi {
	client: ReqwestClient,
	base_url: Url,
	tokens: Arc<dyn AccessTokenSource>,
}
impl ReqwestPartnerApi {
	/// Creates a client rooted at `base_url`.
	pub fn new(base_url: Url, tokens: Arc<dyn AccessTokenSource>) -> Self {
		Self { client: ReqwestClient::default(), base_url, tokens }
	}

	/// Creates a client rooted at [`PartnerConfig::api_base_url`] whose requests are bounded
	/// by [`PartnerConfig::call_timeout`].
	pub fn from_config(config: &PartnerConfig, tokens: Arc<dyn AccessTokenSource>) -> Result<Self> {
		let mut builder = ReqwestClient::builder();

		if let Some(timeout) = config.call_timeout() {
			builder = builder.timeout(timeout);
		}

		let client =
			builder.build().map_err(|e| Error::connection(ConfigError::http_client_build(e)))?;

		Ok(Self::new(config.api_base_url.clone(), tokens).with_client(client))
	}

	/// Creates a client for the production partner API with default timeouts.
	pub fn production(tokens: Arc<dyn AccessTokenSource>) -> Result<Self> {
		Self::from_config(&PartnerConfig::default(), tokens)
	}

	/// Replaces the underlying reqwest client (timeouts, proxies, TLS settings).
	pub fn with_client(mut self, client: ReqwestClient) -> Self {
		self.client = client;

		self
	}

	fn endpoint(&self, segments: &[&str]) -> Result<Url> {
		let mut url = self.base_url.clone();

		url.path_segments_mut()
			.map_err(|_| Error::InvalidRequest {
				reason: format!("partner API base URL `{}` cannot carry a path", self.base_url),
			})?
			.pop_if_empty()
			.extend(segments);

		Ok(url)
	}

	fn request(
		&self,
		method: Method,
		segments: &[&str],
		ctx: Option<&PartnerContext>,
	) -> Result<RequestBuilder> {
		let token = self.tokens.access_token()?;
		let mut builder = self
			.client
			.request(method, self.endpoint(segments)?)
			.bearer_auth(token.expose())
			.header(ACCEPT, HeaderValue::from_static("application/json"));

		if let Some(ctx) = ctx {
			builder = builder
				.query(&[("onBehalfOfContentOwner", ctx.on_behalf_of_content_owner.as_str())]);
		}

		Ok(builder)
	}

	// `Ok(None)` on 404.
	async fn execute<T>(&self, resource: &'static str, builder: RequestBuilder) -> Result<Option<T>>
	where
		T: DeserializeOwned,
	{
		let response = builder.send().await.map_err(map_send_error)?;
		let status = response.status();

		if status == StatusCode::NOT_FOUND {
			return Ok(None);
		}

		let body = response.bytes().await.map_err(map_send_error)?;

		if !status.is_success() {
			return Err(Error::Api { status: status.as_u16(), message: error_message(&body) });
		}

		let mut de = serde_json::Deserializer::from_slice(&body);

		serde_path_to_error::deserialize(&mut de)
			.map(Some)
			.map_err(|source| TransientError::ApiResponseParse { resource, source }.into())
	}

	async fn fetch<T>(&self, resource: &'static str, id: &str, builder: RequestBuilder) -> Result<T>
	where
		T: DeserializeOwned,
	{
		self.execute(resource, builder)
			.await?
			.ok_or_else(|| Error::NotFound { resource, id: id.to_owned() })
	}
}
impl PartnerApi for ReqwestPartnerApi {
	fn search_claims<'a>(
		&'a self,
		ctx: &'a PartnerContext,
		video_id: &'a str,
	) -> PartnerFuture<'a, Vec<ClaimSnippet>> {
		Box::pin(async move {
			let builder =
				self.request(Method::GET, &["claimSearch"], Some(ctx))?.query(&[("videoId", video_id)]);
			let page: Option<ListResponse<ClaimSnippet>> =
				self.execute("claim search", builder).await?;

			Ok(page.map(|page| page.items).unwrap_or_default())
		})
	}

	fn get_claim<'a>(&'a self, ctx: &'a PartnerContext, claim_id: &'a str) -> PartnerFuture<'a, Claim> {
		Box::pin(async move {
			let builder = self.request(Method::GET, &["claims", claim_id], Some(ctx))?;

			self.fetch("claim", claim_id, builder).await
		})
	}

	fn insert_claim<'a>(&'a self, ctx: &'a PartnerContext, claim: &'a Claim) -> PartnerFuture<'a, Claim> {
		Box::pin(async move {
			let builder = self.request(Method::POST, &["claims"], Some(ctx))?.json(claim);

			self.fetch("claim", "<new>", builder).await
		})
	}

	fn update_claim<'a>(&'a self, ctx: &'a PartnerContext, claim: &'a Claim) -> PartnerFuture<'a, Claim> {
		Box::pin(async move {
			let id = require_id("claim", claim.id.as_deref())?;
			let builder = self.request(Method::PUT, &["claims", id], Some(ctx))?.json(claim);

			self.fetch("claim", id, builder).await
		})
	}

	fn get_asset<'a>(&'a self, ctx: &'a PartnerContext, asset_id: &'a str) -> PartnerFuture<'a, Asset> {
		Box::pin(async move {
			let builder = self.request(Method::GET, &["assets", asset_id], Some(ctx))?;

			self.fetch("asset", asset_id, builder).await
		})
	}

	fn insert_asset<'a>(&'a self, ctx: &'a PartnerContext, asset: &'a Asset) -> PartnerFuture<'a, Asset> {
		Box::pin(async move {
			let builder = self.request(Method::POST, &["assets"], Some(ctx))?.json(asset);

			self.fetch("asset", "<new>", builder).await
		})
	}

	fn update_asset<'a>(&'a self, ctx: &'a PartnerContext, asset: &'a Asset) -> PartnerFuture<'a, Asset> {
		Box::pin(async move {
			let id = require_id("asset", asset.id.as_deref())?;
			let builder = self.request(Method::PUT, &["assets", id], Some(ctx))?.json(asset);

			self.fetch("asset", id, builder).await
		})
	}

	fn update_ownership<'a>(
		&'a self,
		ctx: &'a PartnerContext,
		asset_id: &'a str,
		ownership: &'a RightsOwnership,
	) -> PartnerFuture<'a, RightsOwnership> {
		Box::pin(async move {
			let builder = self
				.request(Method::PUT, &["assets", asset_id, "ownership"], Some(ctx))?
				.json(ownership);

			self.fetch("asset", asset_id, builder).await
		})
	}

	fn get_video_advertising_options<'a>(
		&'a self,
		ctx: &'a PartnerContext,
		video_id: &'a str,
	) -> PartnerFuture<'a, Option<VideoAdvertisingOption>> {
		Box::pin(async move {
			let builder =
				self.request(Method::GET, &["videoAdvertisingOptions", video_id], Some(ctx))?;

			self.execute("video advertising options", builder).await
		})
	}

	fn update_video_advertising_options<'a>(
		&'a self,
		ctx: &'a PartnerContext,
		video_id: &'a str,
		options: &'a VideoAdvertisingOption,
	) -> PartnerFuture<'a, VideoAdvertisingOption> {
		Box::pin(async move {
			let builder = self
				.request(Method::PUT, &["videoAdvertisingOptions", video_id], Some(ctx))?
				.json(options);

			self.fetch("video advertising options", video_id, builder).await
		})
	}

	fn get_policy<'a>(&'a self, ctx: &'a PartnerContext, policy_id: &'a str) -> PartnerFuture<'a, Policy> {
		Box::pin(async move {
			let builder = self.request(Method::GET, &["policies", policy_id], Some(ctx))?;

			self.fetch("policy", policy_id, builder).await
		})
	}

	fn list_my_content_owners(&self) -> PartnerFuture<'_, Vec<ContentOwner>> {
		Box::pin(async move {
			let builder =
				self.request(Method::GET, &["contentOwners"], None)?.query(&[("fetchMine", "true")]);
			let page: Option<ListResponse<ContentOwner>> =
				self.execute("content owner list", builder).await?;

			Ok(page.map(|page| page.items).unwrap_or_default())
		})
	}
}
impl Debug for ReqwestPartnerApi {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("ReqwestPartnerApi").field("base_url", &self.base_url).finish()
	}
}

#[derive(Deserialize)]
struct ErrorEnvelope {
	error: ErrorDetail,
}

#[derive(Deserialize)]
struct ErrorDetail {
	message: String,
}

fn require_id<'a>(resource: &str, id: Option<&'a str>) -> Result<&'a str> {
	id.filter(|id| !id.is_empty())
		.ok_or_else(|| Error::InvalidRequest { reason: format!("{resource} update requires an id") })
}

fn error_message(body: &[u8]) -> String {
	if let Ok(envelope) = serde_json::from_slice::<ErrorEnvelope>(body) {
		return envelope.error.message;
	}

	let text = String::from_utf8_lossy(body);

	if text.trim().is_empty() {
		return "empty response body".into();
	}

	text.chars().take(ERROR_PREVIEW_LIMIT).collect()
}

fn map_send_error(err: ReqwestError) -> Error {
	if err.is_timeout() {
		return Error::Timeout { operation: "partner API call" };
	}

	TransportError::network_at("the partner API", err).into()
}
