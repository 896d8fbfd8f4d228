//! Walks through the consent URL, the authorization-code exchange, and the persisted bundle
//! against a local mock token endpoint.

// std
use std::sync::Arc;
// crates.io
use color_eyre::Result;
use httpmock::prelude::*;
// self
use yt_partner::{
	auth::ScopeSet,
	config::CredentialConfig,
	credential::{AccessTokenSource, ReqwestCredentialManager},
	provider::ProviderEndpoints,
	store::{FileStore, TokenStore},
};

#[tokio::main]
async fn main() -> Result<()> {
	color_eyre::install()?;

	let server = MockServer::start_async().await;
	let token_mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/o/oauth2/token").body_includes("grant_type=authorization_code");
			then.status(200).header("content-type", "application/json").body(
				"{\"access_token\":\"demo-access\",\"refresh_token\":\"demo-refresh\",\"token_type\":\"Bearer\",\"expires_in\":3600}",
			);
		})
		.await;
	let config = CredentialConfig::new("demo-client.apps.googleusercontent.com", "demo-secret")
		.with_endpoints(ProviderEndpoints::parse(
			&server.url("/o/oauth2/auth"),
			&server.url("/o/oauth2/token"),
		)?)
		.with_scopes(ScopeSet::new(["https://www.googleapis.com/auth/youtubepartner"])?);
	let path = std::env::temp_dir().join("yt-partner-demo-authorization.json");

	// Start from an empty store so no stale bundle triggers a refresh.
	let _ = std::fs::remove_file(&path);

	let store: Arc<dyn TokenStore> = Arc::new(FileStore::open(&path)?);
	let manager = ReqwestCredentialManager::initialize(config, store).await?;
	let redirect = "http://localhost:8080/oauth/callback";

	println!("Send your user to {}.", manager.authorization_url(redirect, None));

	// The redirect handler receives `?code=...` and completes the exchange.
	let bundle = manager.complete_authorization(redirect, "demo-code").await?;

	token_mock.assert_async().await;

	println!("Authorization saved to {}: {bundle:?}.", path.display());
	println!("Bearer ready: {}.", manager.access_token()?);

	Ok(())
}
