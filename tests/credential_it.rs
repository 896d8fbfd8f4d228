#![cfg(feature = "reqwest")]

mod common;

// std
use std::sync::Arc;
// crates.io
use httpmock::prelude::*;
// self
use common::{CLIENT_ID, CLIENT_SECRET, credential_config, expired_authorization, fresh_authorization};
use yt_partner::{
	credential::{AccessTokenSource, ReqwestCredentialManager},
	error::{ConfigError, Error},
	store::{FnStore, MemoryStore, StoreError, TokenStore},
};

const REDIRECT_URL: &str = "http://localhost:8080/oauth/callback";

#[tokio::test]
async fn expired_stored_bundle_is_refreshed_and_saved_once() {
	let server = MockServer::start_async().await;
	let mock = server
		.mock_async(|when, then| {
			when.method(POST)
				.path("/o/oauth2/token")
				.body_includes("grant_type=refresh_token")
				.body_includes("refresh_token=refresh-1");
			then.status(200).header("content-type", "application/json").body(
				"{\"access_token\":\"access-new\",\"token_type\":\"Bearer\",\"expires_in\":3600}",
			);
		})
		.await;
	let store = MemoryStore::seeded(expired_authorization("access-old", Some("refresh-1")));
	let manager = ReqwestCredentialManager::initialize(
		credential_config(&server),
		Arc::new(store.clone()) as Arc<dyn TokenStore>,
	)
	.await
	.expect("Initialization should refresh the expired bundle.");

	mock.assert_calls_async(1).await;

	assert_eq!(store.save_count(), 1);

	let saved = store.current().expect("Refreshed bundle should be persisted.");

	assert_eq!(saved.access_token(), Some("access-new"));
	assert_eq!(saved.refresh_token(), Some("refresh-1"));
	assert_eq!(saved.as_map()["id_token"], "id-token-fixture");
	assert!(!saved.is_expired());
	assert_eq!(
		manager.access_token().expect("A bearer should be installed.").expose(),
		"access-new"
	);
	assert_eq!(manager.refresh_metrics.successes(), 1);

	// Still valid, so a second check is a no-op.
	assert!(!manager.refresh_if_expired().await.expect("Second check should succeed."));
	mock.assert_calls_async(1).await;
	assert_eq!(store.save_count(), 1);
}

#[tokio::test]
async fn fresh_stored_bundle_is_installed_without_calls() {
	let server = MockServer::start_async().await;
	let mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/o/oauth2/token");
			then.status(500);
		})
		.await;
	let store = MemoryStore::seeded(fresh_authorization("access-fresh"));
	let manager = ReqwestCredentialManager::initialize(
		credential_config(&server),
		Arc::new(store.clone()) as Arc<dyn TokenStore>,
	)
	.await
	.expect("Initialization should succeed without a refresh.");

	mock.assert_calls_async(0).await;

	assert_eq!(store.save_count(), 0);
	assert!(!manager.is_expired());
	assert_eq!(
		manager.access_token().expect("Stored bearer should be installed.").expose(),
		"access-fresh"
	);
}

#[tokio::test]
async fn empty_store_leaves_manager_unauthorized() {
	let server = MockServer::start_async().await;
	let manager = ReqwestCredentialManager::initialize(
		credential_config(&server),
		Arc::new(MemoryStore::default()) as Arc<dyn TokenStore>,
	)
	.await
	.expect("Initialization should succeed with an empty store.");

	assert!(manager.authorization().is_none());
	assert!(manager.is_expired());
	assert!(matches!(manager.access_token(), Err(Error::Config(ConfigError::NotAuthorized))));
}

#[tokio::test]
async fn expired_bundle_without_refresh_token_fails() {
	let server = MockServer::start_async().await;
	let store = MemoryStore::seeded(expired_authorization("access-old", None));
	let err = ReqwestCredentialManager::initialize(
		credential_config(&server),
		Arc::new(store.clone()) as Arc<dyn TokenStore>,
	)
	.await
	.expect_err("An expired bundle needs a refresh token.");

	assert!(matches!(err, Error::Config(ConfigError::StoredAuthorizationWithoutRefreshToken)));
	assert_eq!(store.save_count(), 0);
}

#[tokio::test]
async fn revoked_refresh_token_surfaces_invalid_grant() {
	let server = MockServer::start_async().await;

	server
		.mock_async(|when, then| {
			when.method(POST).path("/o/oauth2/token");
			then.status(400)
				.header("content-type", "application/json")
				.body("{\"error\":\"invalid_grant\",\"error_description\":\"Token has been revoked.\"}");
		})
		.await;

	let store = MemoryStore::seeded(expired_authorization("access-old", Some("refresh-revoked")));
	let err = ReqwestCredentialManager::initialize(
		credential_config(&server),
		Arc::new(store.clone()) as Arc<dyn TokenStore>,
	)
	.await
	.expect_err("A revoked refresh token should fail initialization.");

	assert!(matches!(err, Error::InvalidGrant { .. }));
	assert_eq!(store.save_count(), 0);
}

#[tokio::test]
async fn failing_store_load_is_a_connection_error() {
	let server = MockServer::start_async().await;
	let store = FnStore::new(
		|| Err(StoreError::Backend { message: "settings table unavailable".into() }),
		|_| Ok(()),
	);
	let err = ReqwestCredentialManager::initialize(credential_config(&server), Arc::new(store))
		.await
		.expect_err("A failing load should abort initialization.");

	assert!(matches!(err, Error::Connection { .. }));
}

#[tokio::test]
async fn authorization_url_requests_offline_code() {
	let server = MockServer::start_async().await;
	let manager = ReqwestCredentialManager::initialize(
		credential_config(&server),
		Arc::new(MemoryStore::default()) as Arc<dyn TokenStore>,
	)
	.await
	.expect("Initialization should succeed.");
	let url = manager.authorization_url(REDIRECT_URL, None);
	let pairs = url.query_pairs().into_owned().collect::<Vec<_>>();
	let get = |key: &str| {
		pairs.iter().find(|(k, _)| k == key).map(|(_, v)| v.as_str()).unwrap_or_default().to_owned()
	};

	assert_eq!(url.path(), "/o/oauth2/auth");
	assert_eq!(get("client_id"), CLIENT_ID);
	assert_eq!(get("redirect_uri"), REDIRECT_URL);
	assert_eq!(
		get("scope"),
		"https://www.googleapis.com/auth/youtube https://www.googleapis.com/auth/youtubepartner"
	);
	assert_eq!(get("response_type"), "code");
	assert_eq!(get("access_type"), "offline");

	let custom = manager.authorization_url(REDIRECT_URL, Some("email"));

	assert!(custom.query_pairs().any(|(k, v)| k == "scope" && v == "email"));
}

#[tokio::test]
async fn code_exchange_installs_and_saves_bundle() {
	let server = MockServer::start_async().await;
	let mock = server
		.mock_async(|when, then| {
			when.method(POST)
				.path("/o/oauth2/token")
				.body_includes("grant_type=authorization_code")
				.body_includes("code=code-123")
				.body_includes(format!("client_secret={CLIENT_SECRET}"));
			then.status(200).header("content-type", "application/json").body(
				"{\"access_token\":\"access-1\",\"refresh_token\":\"refresh-1\",\"token_type\":\"Bearer\",\"expires_in\":3600}",
			);
		})
		.await;
	let store = MemoryStore::default();
	let manager = ReqwestCredentialManager::initialize(
		credential_config(&server),
		Arc::new(store.clone()) as Arc<dyn TokenStore>,
	)
	.await
	.expect("Initialization should succeed.");
	let bundle = manager
		.complete_authorization(REDIRECT_URL, "code-123")
		.await
		.expect("Code exchange should succeed.");

	mock.assert_calls_async(1).await;

	assert_eq!(bundle.refresh_token(), Some("refresh-1"));
	assert!(bundle.created().is_some());
	assert_eq!(store.save_count(), 1);
	assert_eq!(store.current(), Some(bundle));
	assert_eq!(manager.access_token().expect("Bearer should be installed.").expose(), "access-1");
}

#[tokio::test]
async fn code_exchange_without_refresh_token_is_not_saved() {
	let server = MockServer::start_async().await;

	server
		.mock_async(|when, then| {
			when.method(POST).path("/o/oauth2/token");
			then.status(200)
				.header("content-type", "application/json")
				.body("{\"access_token\":\"x\",\"expires_in\":3600}");
		})
		.await;

	let store = MemoryStore::default();
	let manager = ReqwestCredentialManager::initialize(
		credential_config(&server),
		Arc::new(store.clone()) as Arc<dyn TokenStore>,
	)
	.await
	.expect("Initialization should succeed.");
	let err = manager
		.complete_authorization(REDIRECT_URL, "code-123")
		.await
		.expect_err("A response without refresh token should fail.");

	assert!(matches!(err, Error::MissingRefreshToken));
	assert!(err.to_string().contains("revoke"));
	assert_eq!(store.save_count(), 0);
	assert!(manager.authorization().is_none());
}

#[tokio::test]
async fn rejected_code_is_classified() {
	let server = MockServer::start_async().await;

	server
		.mock_async(|when, then| {
			when.method(POST).path("/o/oauth2/token");
			then.status(401)
				.header("content-type", "application/json")
				.body("{\"error\":\"invalid_client\"}");
		})
		.await;

	let manager = ReqwestCredentialManager::initialize(
		credential_config(&server),
		Arc::new(MemoryStore::default()) as Arc<dyn TokenStore>,
	)
	.await
	.expect("Initialization should succeed.");

	assert!(matches!(
		manager.complete_authorization(REDIRECT_URL, "code-123").await,
		Err(Error::InvalidClient { .. })
	));
}
