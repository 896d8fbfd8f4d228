//! Credential manager: client identity, consent URL, code exchange, and refresh-on-expiry.

pub mod authorize;
pub mod refresh;

pub use refresh::*;

// self
use crate::{
	_prelude::*,
	auth::{Credential, RawAuthorization, Secret},
	config::CredentialConfig,
	error::ConfigError,
	http::TokenHttpClient,
	oauth::{BasicFacade, TransportErrorMapper},
	obs::{self, OpKind, OpOutcome, OpSpan},
	provider::ProviderStrategy,
	store::TokenStore,
};
#[cfg(feature = "reqwest")]
use crate::{
	http::ReqwestHttpClient, oauth::ReqwestTransportErrorMapper, provider::GoogleTokenStrategy,
};

#[cfg(feature = "reqwest")]
/// Credential manager specialized for the crate's default reqwest transport stack.
pub type ReqwestCredentialManager = CredentialManager<ReqwestHttpClient, ReqwestTransportErrorMapper>;

/// Source of bearer tokens for API clients.
///
/// API components receive this capability instead of owning OAuth state themselves.
pub trait AccessTokenSource
where
	Self: Send + Sync,
{
	/// Returns the access token to send as `Authorization: Bearer`.
	fn access_token(&self) -> Result<Secret>;
}

/// Static bearer token, mostly useful with mock servers.
#[derive(Clone, Debug)]
pub struct StaticToken(pub Secret);
impl AccessTokenSource for StaticToken {
	fn access_token(&self) -> Result<Secret> {
		Ok(self.0.clone())
	}
}

/// Owns the OAuth client identity and the installed authorization for one account.
///
/// The manager never decides where tokens live: every exchange and refresh is handed to
/// the host's [`TokenStore`]. Refresh happens during [`CredentialManager::initialize`] and
/// whenever the host calls [`CredentialManager::refresh_if_expired`]; there is no
/// background refresh.
pub struct CredentialManager<C, M>
where
	C: ?Sized + TokenHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	/// Token store that persists every obtained or refreshed bundle.
	pub store: Arc<dyn TokenStore>,
	/// Strategy used to classify token-endpoint rejections.
	pub strategy: Arc<dyn ProviderStrategy>,
	/// Client identity, scopes, and endpoints.
	pub config: CredentialConfig,
	/// Shared counters for refresh outcomes.
	pub refresh_metrics: Arc<RefreshMetrics>,
	facade: Arc<BasicFacade<C, M>>,
	authorization: Arc<RwLock<Option<RawAuthorization>>>,
	refresh_guard: Arc<AsyncMutex<()>>,
}
impl<C, M> CredentialManager<C, M>
where
	C: ?Sized + TokenHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	/// Builds the client state, installs the stored authorization, and refreshes it when it
	/// has expired.
	///
	/// Client construction and store load failures surface as [`Error::Connection`]. An
	/// expired stored bundle is refreshed exactly once and the result saved exactly once
	/// before this returns.
	pub async fn initialize_with_http_client(
		config: CredentialConfig,
		store: Arc<dyn TokenStore>,
		strategy: Arc<dyn ProviderStrategy>,
		http_client: impl Into<Arc<C>>,
		mapper: impl Into<Arc<M>>,
	) -> Result<Self> {
		const KIND: OpKind = OpKind::Initialize;

		let span = OpSpan::new(KIND, "initialize");

		obs::record_op_outcome(KIND, OpOutcome::Attempt);

		let result = span
			.instrument(async move {
				let facade = BasicFacade::from_endpoints(
					&config.endpoints,
					&config.client_id,
					&config.client_secret,
					http_client,
					mapper,
				)
				.map_err(Error::connection)?;
				let manager = Self {
					store,
					strategy,
					config,
					refresh_metrics: Default::default(),
					facade: Arc::new(facade),
					authorization: Default::default(),
					refresh_guard: Default::default(),
				};

				if let Some(stored) = manager.store.load().await.map_err(Error::connection)? {
					manager.install(stored);
					manager.refresh_if_expired().await?;
				}

				Ok(manager)
			})
			.await;

		obs::record_result(KIND, &result);

		result
	}

	/// Currently installed bundle.
	pub fn authorization(&self) -> Option<RawAuthorization> {
		self.authorization.read().clone()
	}

	/// Credential view of the installed bundle.
	pub fn credential(&self) -> Option<Credential> {
		self.authorization.read().as_ref().map(|authorization| {
			Credential::from_authorization(
				self.config.client_id.clone(),
				self.config.client_secret.clone(),
				&self.config.scopes,
				authorization,
			)
		})
	}

	/// Expiry predicate of the installed bundle; `true` when nothing is installed.
	pub fn is_expired(&self) -> bool {
		self.authorization.read().as_ref().is_none_or(RawAuthorization::is_expired)
	}

	fn install(&self, authorization: RawAuthorization) {
		*self.authorization.write() = Some(authorization);
	}
}
#[cfg(feature = "reqwest")]
impl CredentialManager<ReqwestHttpClient, ReqwestTransportErrorMapper> {
	/// Initializes a manager backed by a reqwest client honoring
	/// [`CredentialConfig::request_timeout`].
	pub async fn initialize(config: CredentialConfig, store: Arc<dyn TokenStore>) -> Result<Self> {
		let http_client =
			ReqwestHttpClient::with_timeout(config.request_timeout()).map_err(|e| {
				Error::connection(ConfigError::http_client_build(e))
			})?;

		Self::initialize_with_http_client(
			config,
			store,
			Arc::new(GoogleTokenStrategy),
			http_client,
			ReqwestTransportErrorMapper,
		)
		.await
	}
}
impl<C, M> AccessTokenSource for CredentialManager<C, M>
where
	C: ?Sized + TokenHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	fn access_token(&self) -> Result<Secret> {
		self.authorization
			.read()
			.as_ref()
			.and_then(RawAuthorization::access_token)
			.map(Secret::new)
			.ok_or_else(|| ConfigError::NotAuthorized.into())
	}
}
impl<C, M> Clone for CredentialManager<C, M>
where
	C: ?Sized + TokenHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	fn clone(&self) -> Self {
		Self {
			store: self.store.clone(),
			strategy: self.strategy.clone(),
			config: self.config.clone(),
			refresh_metrics: self.refresh_metrics.clone(),
			facade: self.facade.clone(),
			authorization: self.authorization.clone(),
			refresh_guard: self.refresh_guard.clone(),
		}
	}
}
impl<C, M> Debug for CredentialManager<C, M>
where
	C: ?Sized + TokenHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("CredentialManager")
			.field("client_id", &self.config.client_id)
			.field("endpoints", &self.config.endpoints)
			.field("authorized", &self.authorization.read().is_some())
			.finish()
	}
}
