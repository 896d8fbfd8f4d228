//! `monetize_video`: claim, asset, ownership, and advertising reconcile for one video.

// self
use crate::{
	_prelude::*,
	obs::{self, OpKind, OpOutcome, OpSpan},
	partner::{
		Asset, Claim, FieldMap, PartnerClient, PartnerContext, RightsOwnership, TerritoryOwners,
		VideoAdvertisingOption, apply_patch, from_fields,
	},
};

/// Optional inputs of [`PartnerClient::monetize_video`]; absent parts skip their step.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct MonetizeRequest {
	/// Asset metadata, merged as the asset's `metadata` field when non-empty.
	pub metadata_asset_data: Option<FieldMap>,
	/// Asset fields.
	pub asset_data: Option<FieldMap>,
	/// Ownership share applied for the configured owner.
	pub owners_data: Option<FieldMap>,
	/// Claim fields; a `policy` value is sent as given.
	pub claim_data: Option<FieldMap>,
	/// Advertising settings.
	pub video_advertising_options_data: Option<FieldMap>,
}
impl MonetizeRequest {
	/// Sets the asset metadata.
	pub fn with_metadata_asset_data(mut self, data: FieldMap) -> Self {
		self.metadata_asset_data = Some(data);

		self
	}

	/// Sets the asset fields.
	pub fn with_asset_data(mut self, data: FieldMap) -> Self {
		self.asset_data = Some(data);

		self
	}

	/// Sets the ownership share.
	pub fn with_owners_data(mut self, data: FieldMap) -> Self {
		self.owners_data = Some(data);

		self
	}

	/// Sets the claim fields.
	pub fn with_claim_data(mut self, data: FieldMap) -> Self {
		self.claim_data = Some(data);

		self
	}

	/// Sets the advertising settings.
	pub fn with_video_advertising_options_data(mut self, data: FieldMap) -> Self {
		self.video_advertising_options_data = Some(data);

		self
	}

	fn touches_asset(&self) -> bool {
		self.asset_data.is_some() || self.metadata_asset_data.is_some()
	}

	fn asset_fields(&self) -> FieldMap {
		let mut fields = self.asset_data.clone().unwrap_or_default();

		if let Some(metadata) = self.metadata_asset_data.as_ref().filter(|m| !m.is_empty()) {
			fields.insert("metadata".into(), JsonValue::Object(metadata.clone()));
		}

		fields
	}
}

/// Claim and advertising settings of the video after [`PartnerClient::monetize_video`].
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MonetizeOutcome {
	/// Updated or inserted claim, otherwise the claim as found (possibly an unsubmitted
	/// placeholder).
	pub claim: Claim,
	/// Updated advertising settings, otherwise as fetched or defaulted.
	pub video_advertising_options: VideoAdvertisingOption,
}

// Ids produced by earlier steps and consumed by later ones.
#[derive(Debug)]
struct PartnerEntityRefs {
	claim: Claim,
	asset_id: Option<String>,
}

impl PartnerClient {
	/// Ensures `video_id` is claimed, owned, and monetized as `request` describes.
	///
	/// Steps run strictly in order and each makes only the calls its inputs require:
	/// claim lookup, asset reconcile, ownership reconcile, claim reconcile, then the
	/// advertising settings, which are always fetched. The workflow is not atomic: a
	/// failure partway leaves earlier provider-side changes in place.
	///
	/// Fails with [`Error::NotAPartner`] outside partner mode and with
	/// [`Error::InvalidRequest`] when ownership is given without any asset input, both
	/// before any call is made.
	pub async fn monetize_video(
		&self,
		video_id: &str,
		request: &MonetizeRequest,
	) -> Result<MonetizeOutcome> {
		const KIND: OpKind = OpKind::Monetize;

		let span = OpSpan::new(KIND, "monetize_video");

		obs::record_op_outcome(KIND, OpOutcome::Attempt);

		let result = span
			.instrument(async move {
				let ctx = self.partner_context()?;

				if request.owners_data.is_some() && !request.touches_asset() {
					return Err(Error::InvalidRequest {
						reason: "ownership data requires asset or metadata data".into(),
					});
				}

				let mut refs = PartnerEntityRefs {
					claim: self.find_claim(&ctx, video_id).await?,
					asset_id: None,
				};

				if request.touches_asset() {
					refs.asset_id = self.reconcile_asset(&ctx, &refs.claim, request).await?;
				}
				if let Some(owners) = &request.owners_data {
					self.reconcile_ownership(&ctx, refs.asset_id.as_deref(), owners).await?;
				}

				let claim = match &request.claim_data {
					Some(claim_data) => self.reconcile_claim(&ctx, refs, video_id, claim_data).await?,
					None => refs.claim,
				};
				let mut options = self
					.gated("video advertising options fetch", |api| {
						api.get_video_advertising_options(&ctx, video_id)
					})
					.await?
					.unwrap_or_default();

				if let Some(data) = &request.video_advertising_options_data {
					apply_patch(&mut options, data)?;
					options = self
						.gated("video advertising options update", |api| {
							api.update_video_advertising_options(&ctx, video_id, &options)
						})
						.await?;
				}

				Ok(MonetizeOutcome { claim, video_advertising_options: options })
			})
			.await;

		obs::record_result(KIND, &result);

		result
	}

	async fn find_claim(&self, ctx: &PartnerContext, video_id: &str) -> Result<Claim> {
		let hits = self.gated("claim search", |api| api.search_claims(ctx, video_id)).await?;
		let Some(first) = hits.into_iter().next() else {
			return Ok(Claim::default());
		};

		self.gated("claim fetch", |api| api.get_claim(ctx, &first.id)).await
	}

	async fn reconcile_asset(
		&self,
		ctx: &PartnerContext,
		claim: &Claim,
		request: &MonetizeRequest,
	) -> Result<Option<String>> {
		let fields = request.asset_fields();
		let asset = match claim.asset_id.as_deref().filter(|id| !id.is_empty()) {
			Some(asset_id) => {
				let mut asset = self.gated("asset fetch", |api| api.get_asset(ctx, asset_id)).await?;

				apply_patch(&mut asset, &fields)?;

				if asset.id.is_none() {
					asset.id = Some(asset_id.to_owned());
				}

				self.gated("asset update", |api| api.update_asset(ctx, &asset)).await?
			},
			None => {
				let asset: Asset = from_fields(&fields)?;

				self.gated("asset insert", |api| api.insert_asset(ctx, &asset)).await?
			},
		};

		Ok(asset.id)
	}

	async fn reconcile_ownership(
		&self,
		ctx: &PartnerContext,
		asset_id: Option<&str>,
		owners: &FieldMap,
	) -> Result<RightsOwnership> {
		let asset_id = asset_id.ok_or_else(|| Error::InvalidRequest {
			reason: "the asset step returned no asset id for the ownership update".into(),
		})?;
		let mut fields = owners.clone();

		fields.insert("owner".into(), JsonValue::String(ctx.on_behalf_of_content_owner.clone()));

		let owners: TerritoryOwners = from_fields(&fields)?;
		let ownership = RightsOwnership { general: vec![owners], ..Default::default() };

		self.gated("ownership update", |api| api.update_ownership(ctx, asset_id, &ownership)).await
	}

	async fn reconcile_claim(
		&self,
		ctx: &PartnerContext,
		refs: PartnerEntityRefs,
		video_id: &str,
		claim_data: &FieldMap,
	) -> Result<Claim> {
		let mut claim = refs.claim;

		if claim.id.is_some() {
			apply_patch(&mut claim, claim_data)?;

			return self.gated("claim update", |api| api.update_claim(ctx, &claim)).await;
		}

		claim.asset_id = refs.asset_id;
		claim.video_id = Some(video_id.to_owned());
		apply_patch(&mut claim, claim_data)?;

		self.gated("claim insert", |api| api.insert_claim(ctx, &claim)).await
	}
}
