//! Shared fixtures for integration tests.

#![allow(dead_code)]

// std
use std::sync::{Arc, Mutex};
// crates.io
use httpmock::MockServer;
use serde_json::{Map, Value, json};
use time::{Duration, OffsetDateTime};
// self
use yt_partner::{
	auth::{RawAuthorization, ScopeSet},
	config::{CredentialConfig, PartnerConfig},
	error::Result,
	partner::{
		Asset, Claim, ClaimSnippet, ContentOwner, FieldMap, PartnerApi, PartnerClient,
		PartnerContext, PartnerFuture, Policy, RightsOwnership, VideoAdvertisingOption,
	},
	provider::ProviderEndpoints,
};

pub const CLIENT_ID: &str = "client-1.apps.googleusercontent.com";
pub const CLIENT_SECRET: &str = "client-secret";
pub const OWNER: &str = "owner-1";

pub fn credential_config(server: &MockServer) -> CredentialConfig {
	let endpoints = ProviderEndpoints::parse(&server.url("/o/oauth2/auth"), &server.url("/o/oauth2/token"))
		.expect("Mock provider endpoints should parse.");
	let scopes = ScopeSet::new([
		"https://www.googleapis.com/auth/youtube",
		"https://www.googleapis.com/auth/youtubepartner",
	])
	.expect("Scope fixture should be valid.");

	CredentialConfig::new(CLIENT_ID, CLIENT_SECRET).with_endpoints(endpoints).with_scopes(scopes)
}

/// Bundle issued two hours ago with a one-hour lifetime.
pub fn expired_authorization(access: &str, refresh: Option<&str>) -> RawAuthorization {
	let created = OffsetDateTime::now_utc() - Duration::hours(2);
	let mut bundle = json!({
		"access_token": access,
		"token_type": "Bearer",
		"expires_in": 3600,
		"created": created.unix_timestamp(),
		"id_token": "id-token-fixture"
	});

	if let Some(refresh) = refresh {
		bundle["refresh_token"] = json!(refresh);
	}

	RawAuthorization::from_json_str(&bundle.to_string()).expect("Bundle fixture should parse.")
}

/// Bundle issued now with a one-hour lifetime.
pub fn fresh_authorization(access: &str) -> RawAuthorization {
	let bundle = json!({
		"access_token": access,
		"refresh_token": "refresh-fresh",
		"expires_in": 3600,
		"created": OffsetDateTime::now_utc().unix_timestamp()
	});

	RawAuthorization::from_json_str(&bundle.to_string()).expect("Bundle fixture should parse.")
}

pub fn fields(value: Value) -> FieldMap {
	match value {
		Value::Object(map) => map,
		other => panic!("Fixture must be an object, got {other}."),
	}
}

/// One call observed by [`RecordingApi`].
#[derive(Clone, Debug, PartialEq)]
pub enum Call {
	SearchClaims { owner: String, video_id: String },
	GetClaim(String),
	InsertClaim(Claim),
	UpdateClaim(Claim),
	GetAsset(String),
	InsertAsset(Asset),
	UpdateAsset(Asset),
	UpdateOwnership { asset_id: String, ownership: RightsOwnership },
	GetVideoAdvertisingOptions(String),
	UpdateVideoAdvertisingOptions(String, VideoAdvertisingOption),
	GetPolicy(String),
	ListMyContentOwners,
}
impl Call {
	pub fn name(&self) -> &'static str {
		match self {
			Call::SearchClaims { .. } => "search_claims",
			Call::GetClaim(_) => "get_claim",
			Call::InsertClaim(_) => "insert_claim",
			Call::UpdateClaim(_) => "update_claim",
			Call::GetAsset(_) => "get_asset",
			Call::InsertAsset(_) => "insert_asset",
			Call::UpdateAsset(_) => "update_asset",
			Call::UpdateOwnership { .. } => "update_ownership",
			Call::GetVideoAdvertisingOptions(_) => "get_video_advertising_options",
			Call::UpdateVideoAdvertisingOptions(..) => "update_video_advertising_options",
			Call::GetPolicy(_) => "get_policy",
			Call::ListMyContentOwners => "list_my_content_owners",
		}
	}
}

/// In-memory [`PartnerApi`] that records every call and answers from fixtures.
#[derive(Debug, Default)]
pub struct RecordingApi {
	pub calls: Mutex<Vec<Call>>,
	pub existing_claim: Option<Claim>,
	pub existing_asset: Option<Asset>,
	pub advertising_options: Option<VideoAdvertisingOption>,
	pub policies: Vec<Policy>,
	pub content_owners: Vec<ContentOwner>,
	/// Call whose future never resolves.
	pub stall_on: Option<&'static str>,
}
impl RecordingApi {
	pub fn with_claim(mut self, claim: Claim) -> Self {
		self.existing_claim = Some(claim);

		self
	}

	pub fn with_asset(mut self, asset: Asset) -> Self {
		self.existing_asset = Some(asset);

		self
	}

	pub fn calls(&self) -> Vec<Call> {
		self.calls.lock().expect("Call log lock should not be poisoned.").clone()
	}

	pub fn call_names(&self) -> Vec<&'static str> {
		self.calls().iter().map(Call::name).collect()
	}

	pub fn stalling_on(mut self, call: &'static str) -> Self {
		self.stall_on = Some(call);

		self
	}

	fn record(&self, call: Call) {
		self.calls.lock().expect("Call log lock should not be poisoned.").push(call);
	}

	// Answers the call recorded last, or never answers it when it is the stalled one.
	fn reply<'a, T>(&self, value: Result<T>) -> PartnerFuture<'a, T>
	where
		T: 'a + Send,
	{
		let stalled = self
			.stall_on
			.is_some_and(|name| self.calls().last().is_some_and(|call| call.name() == name));

		if stalled {
			return Box::pin(std::future::pending());
		}

		Box::pin(async move { value })
	}
}
impl PartnerApi for RecordingApi {
	fn search_claims<'a>(
		&'a self,
		ctx: &'a PartnerContext,
		video_id: &'a str,
	) -> PartnerFuture<'a, Vec<ClaimSnippet>> {
		self.record(Call::SearchClaims {
			owner: ctx.on_behalf_of_content_owner.clone(),
			video_id: video_id.to_owned(),
		});

		let hits = self
			.existing_claim
			.iter()
			.map(|claim| ClaimSnippet {
				id: claim.id.clone().unwrap_or_default(),
				asset_id: claim.asset_id.clone(),
				video_id: claim.video_id.clone(),
				..Default::default()
			})
			.collect();

		self.reply(Ok(hits))
	}

	fn get_claim<'a>(&'a self, _: &'a PartnerContext, claim_id: &'a str) -> PartnerFuture<'a, Claim> {
		self.record(Call::GetClaim(claim_id.to_owned()));

		let claim = self.existing_claim.clone().ok_or_else(|| yt_partner::error::Error::NotFound {
			resource: "claim",
			id: claim_id.to_owned(),
		});

		self.reply(claim)
	}

	fn insert_claim<'a>(&'a self, _: &'a PartnerContext, claim: &'a Claim) -> PartnerFuture<'a, Claim> {
		self.record(Call::InsertClaim(claim.clone()));

		let created = Claim { id: Some("claim-new".into()), ..claim.clone() };

		self.reply(Ok(created))
	}

	fn update_claim<'a>(&'a self, _: &'a PartnerContext, claim: &'a Claim) -> PartnerFuture<'a, Claim> {
		self.record(Call::UpdateClaim(claim.clone()));

		let updated = claim.clone();

		self.reply(Ok(updated))
	}

	fn get_asset<'a>(&'a self, _: &'a PartnerContext, asset_id: &'a str) -> PartnerFuture<'a, Asset> {
		self.record(Call::GetAsset(asset_id.to_owned()));

		let asset = self.existing_asset.clone().ok_or_else(|| yt_partner::error::Error::NotFound {
			resource: "asset",
			id: asset_id.to_owned(),
		});

		self.reply(asset)
	}

	fn insert_asset<'a>(&'a self, _: &'a PartnerContext, asset: &'a Asset) -> PartnerFuture<'a, Asset> {
		self.record(Call::InsertAsset(asset.clone()));

		let created = Asset { id: Some("asset-new".into()), ..asset.clone() };

		self.reply(Ok(created))
	}

	fn update_asset<'a>(&'a self, _: &'a PartnerContext, asset: &'a Asset) -> PartnerFuture<'a, Asset> {
		self.record(Call::UpdateAsset(asset.clone()));

		let updated = asset.clone();

		self.reply(Ok(updated))
	}

	fn update_ownership<'a>(
		&'a self,
		_: &'a PartnerContext,
		asset_id: &'a str,
		ownership: &'a RightsOwnership,
	) -> PartnerFuture<'a, RightsOwnership> {
		self.record(Call::UpdateOwnership {
			asset_id: asset_id.to_owned(),
			ownership: ownership.clone(),
		});

		let updated = ownership.clone();

		self.reply(Ok(updated))
	}

	fn get_video_advertising_options<'a>(
		&'a self,
		_: &'a PartnerContext,
		video_id: &'a str,
	) -> PartnerFuture<'a, Option<VideoAdvertisingOption>> {
		self.record(Call::GetVideoAdvertisingOptions(video_id.to_owned()));

		let options = self.advertising_options.clone();

		self.reply(Ok(options))
	}

	fn update_video_advertising_options<'a>(
		&'a self,
		_: &'a PartnerContext,
		video_id: &'a str,
		options: &'a VideoAdvertisingOption,
	) -> PartnerFuture<'a, VideoAdvertisingOption> {
		self.record(Call::UpdateVideoAdvertisingOptions(video_id.to_owned(), options.clone()));

		let updated = options.clone();

		self.reply(Ok(updated))
	}

	fn get_policy<'a>(&'a self, _: &'a PartnerContext, policy_id: &'a str) -> PartnerFuture<'a, Policy> {
		self.record(Call::GetPolicy(policy_id.to_owned()));

		let policy = self
			.policies
			.iter()
			.find(|policy| policy.id.as_deref() == Some(policy_id))
			.cloned()
			.ok_or_else(|| yt_partner::error::Error::NotFound {
				resource: "policy",
				id: policy_id.to_owned(),
			});

		self.reply(policy)
	}

	fn list_my_content_owners(&self) -> PartnerFuture<'_, Vec<ContentOwner>> {
		self.record(Call::ListMyContentOwners);

		let owners = self.content_owners.clone();

		self.reply(Ok(owners))
	}
}

/// Partner client for [`OWNER`] over `api`, with a generous rate limit.
pub fn partner_client(api: Arc<RecordingApi>) -> PartnerClient {
	PartnerClient::new(api, PartnerConfig::partner(OWNER).with_calls_per_second(100))
}

/// Empty object literal helper.
pub fn empty() -> Map<String, Value> {
	Map::new()
}
