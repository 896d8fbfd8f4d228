//! Partner API resources in the provider's camelCase wire shape.
//!
//! Only the fields the workflows read are typed. Everything else lands in `extra` and is
//! written back unchanged, so a fetch, patch, update cycle never drops provider data.

// self
use crate::_prelude::*;

/// Partial resource keyed by provider field names.
pub type FieldMap = JsonMap<String, JsonValue>;

/// Content-ownership assertion on a video.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Claim {
	/// Claim id; `None` for a claim not yet submitted.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub id: Option<String>,
	/// Asset the claim is made for.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub asset_id: Option<String>,
	/// Claimed video.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub video_id: Option<String>,
	/// Claimed content type (`audio`, `video`, `audiovisual`).
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub content_type: Option<String>,
	/// Claim status as reported by the provider.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub status: Option<String>,
	/// Applied policy; kept verbatim because callers may send either an id or a full policy.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub policy: Option<JsonValue>,
	/// Provider fields without a typed counterpart.
	#[serde(flatten)]
	pub extra: FieldMap,
}

/// Claim search hit.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClaimSnippet {
	/// Claim id.
	pub id: String,
	/// Asset the claim is made for.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub asset_id: Option<String>,
	/// Claimed video.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub video_id: Option<String>,
	/// Provider fields without a typed counterpart.
	#[serde(flatten)]
	pub extra: FieldMap,
}

/// Rights-management metadata record.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Asset {
	/// Asset id; `None` before insertion.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub id: Option<String>,
	/// Asset type (`web`, `music_video`, ...).
	#[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
	pub asset_type: Option<String>,
	/// Descriptive metadata (title, custom id, ...).
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub metadata: Option<FieldMap>,
	/// Provider fields without a typed counterpart.
	#[serde(flatten)]
	pub extra: FieldMap,
}

/// Owner share of an asset in a set of territories.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TerritoryOwners {
	/// Content owner id.
	#[serde(default)]
	pub owner: String,
	/// Ownership percentage.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub ratio: Option<f64>,
	/// `include` or `exclude` for the listed territories.
	#[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
	pub territory_type: Option<String>,
	/// ISO 3166 territory codes.
	#[serde(default, skip_serializing_if = "Vec::is_empty")]
	pub territories: Vec<String>,
	/// Provider fields without a typed counterpart.
	#[serde(flatten)]
	pub extra: FieldMap,
}

/// Ownership record of an asset.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RightsOwnership {
	/// General ownership entries.
	#[serde(default)]
	pub general: Vec<TerritoryOwners>,
	/// Provider fields without a typed counterpart.
	#[serde(flatten)]
	pub extra: FieldMap,
}

/// Advertising settings of a video.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoAdvertisingOption {
	/// Video id.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub id: Option<String>,
	/// Enabled ad formats.
	#[serde(default, skip_serializing_if = "Vec::is_empty")]
	pub ad_formats: Vec<String>,
	/// Ad break positions (`preroll`, `postroll`, ...).
	#[serde(default, skip_serializing_if = "Vec::is_empty")]
	pub break_position: Vec<String>,
	/// Provider fields without a typed counterpart.
	#[serde(flatten)]
	pub extra: FieldMap,
}

/// Rule of a policy.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PolicyRule {
	/// Action taken when the rule matches (`monetize`, `block`, `track`, `takedown`).
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub action: Option<String>,
	/// Secondary actions.
	#[serde(default, skip_serializing_if = "Vec::is_empty")]
	pub subaction: Vec<String>,
	/// Match conditions, kept as the provider shapes them.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub conditions: Option<JsonValue>,
	/// Provider fields without a typed counterpart.
	#[serde(flatten)]
	pub extra: FieldMap,
}

/// Named rule set applied to claims.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Policy {
	/// Policy id; `None` for an in-memory policy that was never saved.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub id: Option<String>,
	/// Display name.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub name: Option<String>,
	/// Ordered rules.
	#[serde(default)]
	pub rules: Vec<PolicyRule>,
	/// Provider fields without a typed counterpart.
	#[serde(flatten)]
	pub extra: FieldMap,
}

/// Partner identity the account manages.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentOwner {
	/// Content owner id.
	pub id: String,
	/// Display name.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub display_name: Option<String>,
	/// Provider fields without a typed counterpart.
	#[serde(flatten)]
	pub extra: FieldMap,
}

/// Generic list envelope.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListResponse<T> {
	/// Page items.
	#[serde(default = "Vec::new")]
	pub items: Vec<T>,
	/// Token of the next page, if any.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub next_page_token: Option<String>,
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn unknown_fields_survive_a_round_trip() {
		let raw = serde_json::json!({
			"id": "claim-1",
			"assetId": "A1",
			"videoId": "vid1",
			"policy": { "id": "P" },
			"matchInfo": { "referenceId": "R9" },
			"blockOutsideOwnership": false
		});
		let claim: Claim = serde_json::from_value(raw.clone()).expect("Claim fixture should parse.");

		assert_eq!(claim.asset_id.as_deref(), Some("A1"));
		assert!(claim.extra.contains_key("matchInfo"));
		assert_eq!(serde_json::to_value(&claim).expect("Claim should serialize."), raw);
	}

	#[test]
	fn empty_claim_serializes_to_empty_object() {
		let value = serde_json::to_value(Claim::default()).expect("Default claim should serialize.");

		assert_eq!(value, serde_json::json!({}));
	}
}
