//! Remote procedures of the partner API used by the workflows.

#[cfg(feature = "reqwest")] pub mod rest;

#[cfg(feature = "reqwest")] pub use rest::ReqwestPartnerApi;

// self
use crate::{
	_prelude::*,
	partner::{
		Asset, Claim, ClaimSnippet, ContentOwner, Policy, RightsOwnership, VideoAdvertisingOption,
	},
};

/// Boxed future returned by [`PartnerApi`] methods.
pub type PartnerFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T>> + 'a + Send>>;

/// Scope every partner request is made under.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PartnerContext {
	/// Sent as the `onBehalfOfContentOwner` query parameter.
	pub on_behalf_of_content_owner: String,
}
impl PartnerContext {
	/// Creates a context for `owner`.
	pub fn new(owner: impl Into<String>) -> Self {
		Self { on_behalf_of_content_owner: owner.into() }
	}
}

/// Partner API seam.
///
/// Implementations perform exactly one remote call per method and never retry. Direct
/// lookups that find nothing fail with [`Error::NotFound`], except
/// [`PartnerApi::get_video_advertising_options`], which reports absence as `None`.
pub trait PartnerApi
where
	Self: Send + Sync,
{
	/// Claims made on `video_id`.
	fn search_claims<'a>(
		&'a self,
		ctx: &'a PartnerContext,
		video_id: &'a str,
	) -> PartnerFuture<'a, Vec<ClaimSnippet>>;

	/// Full claim by id.
	fn get_claim<'a>(&'a self, ctx: &'a PartnerContext, claim_id: &'a str)
	-> PartnerFuture<'a, Claim>;

	/// Submits a new claim.
	fn insert_claim<'a>(&'a self, ctx: &'a PartnerContext, claim: &'a Claim)
	-> PartnerFuture<'a, Claim>;

	/// Replaces the claim identified by `claim.id`.
	fn update_claim<'a>(&'a self, ctx: &'a PartnerContext, claim: &'a Claim)
	-> PartnerFuture<'a, Claim>;

	/// Asset by id.
	fn get_asset<'a>(&'a self, ctx: &'a PartnerContext, asset_id: &'a str)
	-> PartnerFuture<'a, Asset>;

	/// Creates an asset.
	fn insert_asset<'a>(&'a self, ctx: &'a PartnerContext, asset: &'a Asset)
	-> PartnerFuture<'a, Asset>;

	/// Replaces the asset identified by `asset.id`.
	fn update_asset<'a>(&'a self, ctx: &'a PartnerContext, asset: &'a Asset)
	-> PartnerFuture<'a, Asset>;

	/// Replaces the ownership record of `asset_id`.
	fn update_ownership<'a>(
		&'a self,
		ctx: &'a PartnerContext,
		asset_id: &'a str,
		ownership: &'a RightsOwnership,
	) -> PartnerFuture<'a, RightsOwnership>;

	/// Advertising settings of `video_id`, or `None` when the video has none.
	fn get_video_advertising_options<'a>(
		&'a self,
		ctx: &'a PartnerContext,
		video_id: &'a str,
	) -> PartnerFuture<'a, Option<VideoAdvertisingOption>>;

	/// Replaces the advertising settings of `video_id`.
	fn update_video_advertising_options<'a>(
		&'a self,
		ctx: &'a PartnerContext,
		video_id: &'a str,
		options: &'a VideoAdvertisingOption,
	) -> PartnerFuture<'a, VideoAdvertisingOption>;

	/// Policy by id.
	fn get_policy<'a>(&'a self, ctx: &'a PartnerContext, policy_id: &'a str)
	-> PartnerFuture<'a, Policy>;

	/// Content owners managed by the authorized account; not partner-scoped.
	fn list_my_content_owners(&self) -> PartnerFuture<'_, Vec<ContentOwner>>;
}
