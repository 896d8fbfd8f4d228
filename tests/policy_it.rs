mod common;

// std
use std::sync::Arc;
// crates.io
use serde_json::json;
// self
use common::{OWNER, RecordingApi, fields, partner_client};
use yt_partner::{
	config::PartnerConfig,
	error::Error,
	partner::{ContentOwner, PartnerClient, Policy, PolicyRule},
};

#[tokio::test]
async fn fetches_policy_by_id_and_applies_data() {
	let stored = Policy {
		id: Some("P1".into()),
		name: Some("Track".into()),
		rules: vec![PolicyRule { action: Some("track".into()), ..Default::default() }],
		..Default::default()
	};
	let api = Arc::new(RecordingApi { policies: vec![stored], ..Default::default() });
	let client = partner_client(api.clone());
	let data = fields(json!({ "rules": [{ "action": "monetize" }] }));
	let policy = client
		.get_or_create_policy(Some("P1"), Some(&data))
		.await
		.expect("Policy should be fetched and patched.");

	assert_eq!(api.call_names(), ["get_policy"]);
	assert_eq!(policy.id.as_deref(), Some("P1"));
	assert_eq!(policy.name.as_deref(), Some("Track"));
	assert_eq!(policy.rules, [PolicyRule { action: Some("monetize".into()), ..Default::default() }]);
}

#[tokio::test]
async fn builds_new_policy_without_any_call() {
	let api = Arc::new(RecordingApi::default());
	let client = partner_client(api.clone());
	let data = fields(json!({
		"name": "Monetize in US",
		"rules": [{ "action": "monetize", "subaction": ["review"] }]
	}));
	let policy = client
		.get_or_create_policy(None, Some(&data))
		.await
		.expect("A new policy should be built.");

	assert!(api.calls().is_empty());
	assert_eq!(policy.id, None);
	assert_eq!(policy.rules[0].subaction, ["review"]);
}

#[tokio::test]
async fn unknown_policy_is_not_found() {
	let api = Arc::new(RecordingApi::default());
	let client = partner_client(api);
	let err = client
		.get_or_create_policy(Some("missing"), None)
		.await
		.expect_err("An unknown id should fail.");

	assert!(matches!(err, Error::NotFound { resource: "policy", .. }));
}

#[tokio::test]
async fn invalid_rule_rejected() {
	let client = partner_client(Arc::new(RecordingApi::default()));
	let data = fields(json!({ "rules": [{ "conditions": {}, "subaction": 5 }] }));

	assert!(matches!(
		client.get_or_create_policy(None, Some(&data)).await,
		Err(Error::InvalidRequest { .. })
	));
}

#[tokio::test]
async fn configured_owner_short_circuits_discovery() {
	let api = Arc::new(RecordingApi::default());
	let client = partner_client(api.clone());

	assert_eq!(client.resolve_content_owner().await.expect("Owner should resolve."), OWNER);
	assert!(api.calls().is_empty());
}

#[tokio::test]
async fn discovery_lists_owners_without_partner_mode() {
	let api = Arc::new(RecordingApi {
		content_owners: vec![ContentOwner { id: "owner-found".into(), ..Default::default() }],
		..Default::default()
	});
	let client = PartnerClient::new(api.clone(), PartnerConfig::default());

	assert_eq!(client.resolve_content_owner().await.expect("Owner should resolve."), "owner-found");
	assert_eq!(api.call_names(), ["list_my_content_owners"]);

	let client = PartnerClient::new(Arc::new(RecordingApi::default()), PartnerConfig::default());

	assert!(matches!(client.resolve_content_owner().await, Err(Error::NotAPartner)));
}
