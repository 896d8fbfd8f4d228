//! Policy accessor and content-owner discovery.

// self
use crate::{
	_prelude::*,
	obs::{self, OpKind, OpOutcome, OpSpan},
	partner::{FieldMap, PartnerClient, Policy, PolicyRule, apply_patch},
};

impl PartnerClient {
	/// Fetches policy `id`, or starts from an empty policy when `id` is `None`, then applies
	/// `policy_data`.
	///
	/// Every entry of `policy_data.rules` must describe a [`PolicyRule`]. The result is
	/// never persisted; pass it inside the claim data of
	/// [`PartnerClient::monetize_video`] to apply it.
	pub async fn get_or_create_policy(
		&self,
		id: Option<&str>,
		policy_data: Option<&FieldMap>,
	) -> Result<Policy> {
		const KIND: OpKind = OpKind::Policy;

		let span = OpSpan::new(KIND, "get_or_create_policy");

		obs::record_op_outcome(KIND, OpOutcome::Attempt);

		let result = span
			.instrument(async move {
				let ctx = self.partner_context()?;
				let mut policy = match id {
					Some(id) => self.gated("policy fetch", |api| api.get_policy(&ctx, id)).await?,
					None => Policy::default(),
				};

				if let Some(data) = policy_data {
					apply_patch(&mut policy, &structured_rules(data)?)?;
				}

				Ok(policy)
			})
			.await;

		obs::record_result(KIND, &result);

		result
	}

	/// Configured content owner, or the first owner the authorized account manages.
	///
	/// The lookup is made only when no owner is configured, does not pass the rate gate,
	/// and needs no partner mode. An account managing no owner yields
	/// [`Error::NotAPartner`].
	pub async fn resolve_content_owner(&self) -> Result<String> {
		let configured = self.config().on_behalf_of_content_owner.as_deref();

		if let Some(owner) = configured.filter(|owner| !owner.is_empty()) {
			return Ok(owner.to_owned());
		}

		let owners = self.api().list_my_content_owners().await?;

		owners.into_iter().next().map(|owner| owner.id).ok_or(Error::NotAPartner)
	}
}

fn structured_rules(data: &FieldMap) -> Result<FieldMap> {
	let mut data = data.clone();
	let Some(rules) = data.get_mut("rules") else {
		return Ok(data);
	};
	let JsonValue::Array(entries) = rules else {
		return Err(Error::InvalidRequest { reason: "policy `rules` must be an array".into() });
	};

	for (index, entry) in entries.iter_mut().enumerate() {
		let rule: PolicyRule =
			serde_path_to_error::deserialize(entry.take()).map_err(|e| Error::InvalidRequest {
				reason: format!("policy rule {index} is invalid at `{}`: {}", e.path(), e.inner()),
			})?;

		*entry = serde_json::to_value(rule).map_err(|e| Error::InvalidRequest {
			reason: format!("policy rule {index} cannot be serialized: {e}"),
		})?;
	}

	Ok(data)
}
