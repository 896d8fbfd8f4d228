//! Runs `monetize_video` for a video with no claim yet against a local mock partner API,
//! using a policy built in memory.

// std
use std::sync::Arc;
// crates.io
use color_eyre::Result;
use httpmock::prelude::*;
use serde_json::{Value, json};
// self
use yt_partner::{
	auth::Secret,
	config::PartnerConfig,
	credential::StaticToken,
	partner::{FieldMap, MonetizeRequest, PartnerClient, ReqwestPartnerApi},
	url::Url,
};

#[tokio::main]
async fn main() -> Result<()> {
	color_eyre::install()?;

	let server = MockServer::start_async().await;

	server
		.mock_async(|when, then| {
			when.method(GET).path("/claimSearch");
			then.status(200).header("content-type", "application/json").json_body(json!({ "items": [] }));
		})
		.await;
	server
		.mock_async(|when, then| {
			when.method(POST).path("/claims");
			then.status(200)
				.header("content-type", "application/json")
				.json_body(json!({ "id": "claim-demo", "videoId": "vid1", "status": "pending" }));
		})
		.await;
	server
		.mock_async(|when, then| {
			when.method(GET).path("/videoAdvertisingOptions/vid1");
			then.status(404);
		})
		.await;
	server
		.mock_async(|when, then| {
			when.method(PUT).path("/videoAdvertisingOptions/vid1");
			then.status(200)
				.header("content-type", "application/json")
				.json_body(json!({ "id": "vid1", "adFormats": ["instream_trueview"] }));
		})
		.await;

	let config = PartnerConfig::partner("demo-owner").with_api_base_url(Url::parse(&server.url("/"))?);
	let api =
		ReqwestPartnerApi::from_config(&config, Arc::new(StaticToken(Secret::new("demo-bearer"))))?;
	let client = PartnerClient::new(Arc::new(api), config);
	let policy_data = fields(json!({
		"name": "Monetize worldwide",
		"rules": [{ "action": "monetize" }]
	}));
	let policy = client.get_or_create_policy(None, Some(&policy_data)).await?;
	let claim_data = fields(json!({
		"contentType": "audiovisual",
		"policy": serde_json::to_value(&policy)?
	}));
	let ads = fields(json!({ "adFormats": ["instream_trueview"] }));
	let request = MonetizeRequest::default()
		.with_claim_data(claim_data)
		.with_video_advertising_options_data(ads);
	let outcome = client.monetize_video("vid1", &request).await?;

	println!("Claim: {:?}.", outcome.claim);
	println!("Advertising: {:?}.", outcome.video_advertising_options);

	Ok(())
}

fn fields(value: Value) -> FieldMap {
	match value {
		Value::Object(map) => map,
		_ => FieldMap::new(),
	}
}
