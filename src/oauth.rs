//! Token-endpoint facade: the `oauth2` refresh grant plus the direct code exchange.

pub use oauth2;

// crates.io
use oauth2::{
	AsyncHttpClient, AuthType, AuthUrl, ClientId, ClientSecret, EndpointNotSet, EndpointSet,
	HttpClientError, HttpRequest, RefreshToken, RequestTokenError, TokenResponse, TokenUrl,
	basic::{BasicClient, BasicErrorResponse, BasicRequestTokenError},
	http::{
		Method, Request,
		header::{ACCEPT, CONTENT_TYPE},
	},
};
use url::form_urlencoded;
// self
use crate::{
	_prelude::*,
	auth::{RawAuthorization, Secret},
	error::{ConfigError, TransientError, TransportError},
	http::{ResponseMetadata, ResponseMetadataSlot, TokenHttpClient},
	provider::{
		GrantType, ProviderEndpoints, ProviderErrorContext, ProviderErrorKind, ProviderStrategy,
	},
};

type ConfiguredBasicClient =
	BasicClient<EndpointSet, EndpointNotSet, EndpointNotSet, EndpointNotSet, EndpointSet>;
type FacadeTokenResponse = oauth2::basic::BasicTokenResponse;
type FacadeFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T>> + 'a + Send>>;

/// Maps HTTP transport failures into crate [`Error`] values.
pub trait TransportErrorMapper<E>
where
	Self: 'static + Send + Sync,
	E: 'static + Send + Sync + StdError,
{
	/// Converts an [`HttpClientError`] emitted by the transport into a crate error.
	fn map_transport_error(
		&self,
		strategy: &dyn ProviderStrategy,
		grant: GrantType,
		metadata: Option<&ResponseMetadata>,
		error: HttpClientError<E>,
	) -> Error;
}

/// Default mapper for reqwest-backed transports.
///
/// Request timeouts become [`Error::Timeout`]; other network failures become
/// [`TransportError::Network`].
#[cfg(feature = "reqwest")]
#[derive(Clone, Debug, Default)]
pub struct ReqwestTransportErrorMapper;
#[cfg(feature = "reqwest")]
impl TransportErrorMapper<ReqwestError> for ReqwestTransportErrorMapper {
	fn map_transport_error(
		&self,
		_strategy: &dyn ProviderStrategy,
		_grant: GrantType,
		meta: Option<&ResponseMetadata>,
		err: HttpClientError<ReqwestError>,
	) -> Error {
		match err {
			HttpClientError::Reqwest(inner) => map_reqwest_error(*inner),
			HttpClientError::Http(inner) => ConfigError::from(inner).into(),
			HttpClientError::Io(inner) => TransportError::Io(inner).into(),
			HttpClientError::Other(message) => map_generic_transport_error(meta, message),
			_ => map_unknown_transport_error(meta),
		}
	}
}

/// Access-token fields returned by a refresh grant.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct RefreshedToken {
	pub(crate) access_token: String,
	pub(crate) expires_in: i64,
	pub(crate) refresh_token: Option<String>,
	pub(crate) scope: Option<String>,
}
impl RefreshedToken {
	/// Writes the refreshed fields over `authorization`, keeping its refresh token when the
	/// provider did not rotate it.
	pub(crate) fn merge_into(self, authorization: &mut RawAuthorization, now: OffsetDateTime) {
		authorization.set("access_token", self.access_token);
		authorization.set("expires_in", self.expires_in);
		authorization.set("created", now.unix_timestamp());

		if let Some(refresh) = self.refresh_token {
			authorization.set("refresh_token", refresh);
		}
		if let Some(scope) = self.scope {
			authorization.set("scope", scope);
		}
	}
}

pub(crate) trait OAuth2Facade {
	fn refresh_token<'a, 'strategy, 'refresh>(
		&'a self,
		strategy: &'strategy dyn ProviderStrategy,
		refresh_token: &'refresh str,
	) -> FacadeFuture<'a, RefreshedToken>
	where
		'strategy: 'a,
		'refresh: 'a;

	fn exchange_authorization_code<'a, 'strategy, 'code, 'redirect>(
		&'a self,
		strategy: &'strategy dyn ProviderStrategy,
		code: &'code str,
		redirect_uri: &'redirect str,
	) -> FacadeFuture<'a, RawAuthorization>
	where
		'strategy: 'a,
		'code: 'a,
		'redirect: 'a;
}

pub(crate) struct BasicFacade<C, M>
where
	C: ?Sized + TokenHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	oauth_client: ConfiguredBasicClient,
	token_url: Url,
	client_id: String,
	client_secret: Secret,
	http_client: Arc<C>,
	error_mapper: Arc<M>,
}
impl<C, M> BasicFacade<C, M>
where
	C: ?Sized + TokenHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	pub(crate) fn from_endpoints(
		endpoints: &ProviderEndpoints,
		client_id: &str,
		client_secret: &Secret,
		http_client: impl Into<Arc<C>>,
		error_mapper: impl Into<Arc<M>>,
	) -> Result<Self> {
		let auth_url = AuthUrl::new(endpoints.authorization.to_string())
			.map_err(|source| ConfigError::InvalidEndpoint { source })?;
		let token_url = TokenUrl::new(endpoints.token.to_string())
			.map_err(|source| ConfigError::InvalidEndpoint { source })?;
		let oauth_client = BasicClient::new(ClientId::new(client_id.to_owned()))
			.set_client_secret(ClientSecret::new(client_secret.expose().to_owned()))
			.set_auth_uri(auth_url)
			.set_token_uri(token_url)
			.set_auth_type(AuthType::RequestBody);

		Ok(Self {
			oauth_client,
			token_url: endpoints.token.clone(),
			client_id: client_id.to_owned(),
			client_secret: client_secret.clone(),
			http_client: http_client.into(),
			error_mapper: error_mapper.into(),
		})
	}

	fn code_exchange_request(
		&self,
		strategy: &dyn ProviderStrategy,
		code: &str,
		redirect_uri: &str,
	) -> Result<HttpRequest> {
		let mut form = BTreeMap::from([
			("code".to_owned(), code.to_owned()),
			("client_id".to_owned(), self.client_id.clone()),
			("client_secret".to_owned(), self.client_secret.expose().to_owned()),
			("redirect_uri".to_owned(), redirect_uri.to_owned()),
			("grant_type".to_owned(), GrantType::AuthorizationCode.as_str().to_owned()),
		]);

		strategy.augment_token_request(GrantType::AuthorizationCode, &mut form);

		let body = form_urlencoded::Serializer::new(String::new()).extend_pairs(&form).finish();
		let request = Request::builder()
			.method(Method::POST)
			.uri(self.token_url.as_str())
			.header(CONTENT_TYPE, "application/x-www-form-urlencoded")
			.header(ACCEPT, "application/json")
			.body(body.into_bytes())
			.map_err(ConfigError::from)?;

		Ok(request)
	}
}
impl<C, M> OAuth2Facade for BasicFacade<C, M>
where
	C: ?Sized + TokenHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	fn refresh_token<'a, 'strategy, 'refresh>(
		&'a self,
		strategy: &'strategy dyn ProviderStrategy,
		refresh_token: &'refresh str,
	) -> FacadeFuture<'a, RefreshedToken>
	where
		'strategy: 'a,
		'refresh: 'a,
	{
		let meta = ResponseMetadataSlot::default();

		Box::pin(async move {
			let instrumented = self.http_client.with_metadata(meta.clone());
			let refresh_secret = RefreshToken::new(refresh_token.to_owned());
			let response = self
				.oauth_client
				.exchange_refresh_token(&refresh_secret)
				.request_async(&instrumented)
				.await
				.map_err(|err| {
					map_request_error(
						strategy,
						GrantType::RefreshToken,
						meta.take(),
						err,
						self.error_mapper.as_ref(),
					)
				})?;

			map_refresh_token_response(response)
		})
	}

	fn exchange_authorization_code<'a, 'strategy, 'code, 'redirect>(
		&'a self,
		strategy: &'strategy dyn ProviderStrategy,
		code: &'code str,
		redirect_uri: &'redirect str,
	) -> FacadeFuture<'a, RawAuthorization>
	where
		'strategy: 'a,
		'code: 'a,
		'redirect: 'a,
	{
		let meta = ResponseMetadataSlot::default();

		Box::pin(async move {
			let request = self.code_exchange_request(strategy, code, redirect_uri)?;
			let instrumented = self.http_client.with_metadata(meta.clone());
			let response = instrumented.call(request).await.map_err(|err| {
				self.error_mapper.map_transport_error(
					strategy,
					GrantType::AuthorizationCode,
					meta.take().as_ref(),
					err,
				)
			})?;
			let captured = meta.take();
			let status = response.status();

			if !status.is_success() {
				return Err(map_endpoint_rejection(
					strategy,
					GrantType::AuthorizationCode,
					status.as_u16(),
					response.body(),
					captured.as_ref(),
				));
			}

			let authorization = RawAuthorization::from_json_slice(response.body()).map_err(
				|source| TransientError::TokenResponseParse {
					source,
					status: Some(status.as_u16()),
				},
			)?;

			if authorization.access_token().is_none() {
				return Err(TransientError::TokenEndpoint {
					message: "Authorization response is missing access_token".into(),
					status: Some(status.as_u16()),
					retry_after: meta_retry_after(captured.as_ref()),
				}
				.into());
			}
			if authorization.refresh_token().is_none() {
				return Err(Error::MissingRefreshToken);
			}

			Ok(authorization)
		})
	}
}

fn map_refresh_token_response(response: FacadeTokenResponse) -> Result<RefreshedToken> {
	let expires_in = response.expires_in().ok_or(ConfigError::MissingExpiresIn)?.as_secs();
	let expires_in = i64::try_from(expires_in).map_err(|_| ConfigError::ExpiresInOutOfRange)?;

	if expires_in <= 0 {
		return Err(ConfigError::NonPositiveExpiresIn.into());
	}

	let scope = response.scopes().map(|scopes| {
		let names: Vec<&str> = scopes.iter().map(|scope| scope.as_str()).collect();

		names.join(" ")
	});

	Ok(RefreshedToken {
		access_token: response.access_token().secret().to_owned(),
		expires_in,
		refresh_token: response.refresh_token().map(|token| token.secret().to_owned()),
		scope,
	})
}

#[derive(Deserialize)]
struct EndpointErrorBody {
	error: Option<String>,
	error_description: Option<String>,
}

/// Classifies a non-success token-endpoint response through `strategy`.
pub(crate) fn map_endpoint_rejection(
	strategy: &dyn ProviderStrategy,
	grant: GrantType,
	status: u16,
	body: &[u8],
	meta: Option<&ResponseMetadata>,
) -> Error {
	let mut ctx = ProviderErrorContext::new(grant).with_http_status(status);
	let parsed = serde_json::from_slice::<EndpointErrorBody>(body).ok();
	let mut description = None;

	match parsed {
		Some(EndpointErrorBody { error, error_description }) => {
			if let Some(error) = error {
				ctx = ctx.with_oauth_error(error);
			}
			if let Some(text) = error_description {
				ctx = ctx.with_error_description(text.clone());
				description = Some(text);
			}
		},
		None =>
			if !body.is_empty() {
				ctx = ctx.with_body_preview(String::from_utf8_lossy(body).into_owned());
			},
	}

	let message = description
		.or_else(|| ctx.oauth_error.clone())
		.or_else(|| ctx.body_preview.clone())
		.unwrap_or_else(|| format!("HTTP {status}"));
	let message = format!("Token endpoint rejected the request: {message}");
	let kind = strategy.classify_token_error(&ctx);

	classified_error(kind, message, Some(status), meta_retry_after(meta))
}

fn classified_error(
	kind: ProviderErrorKind,
	message: String,
	status: Option<u16>,
	retry_after: Option<Duration>,
) -> Error {
	match kind {
		ProviderErrorKind::InvalidGrant => Error::InvalidGrant { reason: message },
		ProviderErrorKind::InvalidClient => Error::InvalidClient { reason: message },
		ProviderErrorKind::InsufficientScope => Error::InsufficientScope { reason: message },
		ProviderErrorKind::Transient =>
			TransientError::TokenEndpoint { message, status, retry_after }.into(),
	}
}

fn map_request_error<E, M>(
	strategy: &dyn ProviderStrategy,
	grant: GrantType,
	meta: Option<ResponseMetadata>,
	err: BasicRequestTokenError<HttpClientError<E>>,
	mapper: &M,
) -> Error
where
	E: 'static + Send + Sync + StdError,
	M: ?Sized + TransportErrorMapper<E>,
{
	let meta_ref = meta.as_ref();

	match err {
		RequestTokenError::ServerResponse(response) =>
			map_server_response_error(strategy, grant, response, meta_ref),
		RequestTokenError::Request(error) =>
			mapper.map_transport_error(strategy, grant, meta_ref, error),
		RequestTokenError::Parse(error, _body) =>
			TransientError::TokenResponseParse { source: error, status: meta_status(meta_ref) }
				.into(),
		RequestTokenError::Other(message) => TransientError::TokenEndpoint {
			message: format!("Token endpoint returned an unexpected response: {message}"),
			status: meta_status(meta_ref),
			retry_after: meta_retry_after(meta_ref),
		}
		.into(),
	}
}

fn map_server_response_error(
	strategy: &dyn ProviderStrategy,
	grant: GrantType,
	response: BasicErrorResponse,
	meta: Option<&ResponseMetadata>,
) -> Error {
	let mut ctx =
		ProviderErrorContext::new(grant).with_oauth_error(response.error().as_ref().to_string());

	if let Some(description) = response.error_description() {
		ctx = ctx.with_error_description(description.clone());
	}
	if let Some(status) = meta_status(meta) {
		ctx = ctx.with_http_status(status);
	}

	let message = if let Some(description) = response.error_description() {
		format!("Token endpoint returned an OAuth error: {description}")
	} else {
		format!("Token endpoint returned an OAuth error: {}", response.error().as_ref())
	};

	classified_error(
		strategy.classify_token_error(&ctx),
		message,
		meta_status(meta),
		meta_retry_after(meta),
	)
}

#[cfg(feature = "reqwest")]
fn map_reqwest_error(err: ReqwestError) -> Error {
	if err.is_builder() {
		return ConfigError::from(err).into();
	}
	if err.is_timeout() {
		return Error::Timeout { operation: "token endpoint request" };
	}

	TransportError::from(err).into()
}

fn map_generic_transport_error(meta: Option<&ResponseMetadata>, message: impl Display) -> Error {
	TransientError::TokenEndpoint {
		message: format!("HTTP client error occurred while calling the token endpoint: {message}"),
		status: meta_status(meta),
		retry_after: meta_retry_after(meta),
	}
	.into()
}

fn map_unknown_transport_error(meta: Option<&ResponseMetadata>) -> Error {
	TransientError::TokenEndpoint {
		message: "HTTP client error occurred while calling the token endpoint".into(),
		status: meta_status(meta),
		retry_after: meta_retry_after(meta),
	}
	.into()
}

fn meta_status(meta: Option<&ResponseMetadata>) -> Option<u16> {
	meta.and_then(|value| value.status)
}

fn meta_retry_after(meta: Option<&ResponseMetadata>) -> Option<Duration> {
	meta.and_then(|value| value.retry_after)
}

#[cfg(all(test, feature = "reqwest"))]
mod tests {
	// self
	use super::*;
	use crate::{http::ReqwestHttpClient, provider::GoogleTokenStrategy};

	fn facade() -> BasicFacade<ReqwestHttpClient, ReqwestTransportErrorMapper> {
		BasicFacade::from_endpoints(
			&ProviderEndpoints::google(),
			"client-id",
			&Secret::new("client-secret"),
			Arc::new(ReqwestHttpClient::default()),
			Arc::new(ReqwestTransportErrorMapper),
		)
		.expect("Facade should build from Google endpoints.")
	}

	#[test]
	fn code_exchange_posts_form_to_token_endpoint() {
		let request = facade()
			.code_exchange_request(&GoogleTokenStrategy, "code123", "https://app.test/cb")
			.expect("Exchange request should build.");
		let body = String::from_utf8(request.body().clone()).expect("Form body should be UTF-8.");
		let pairs: BTreeMap<String, String> =
			form_urlencoded::parse(body.as_bytes()).into_owned().collect();

		assert_eq!(request.method(), Method::POST);
		assert_eq!(request.uri().to_string(), crate::provider::GOOGLE_TOKEN_ENDPOINT);
		assert_eq!(pairs["code"], "code123");
		assert_eq!(pairs["client_id"], "client-id");
		assert_eq!(pairs["client_secret"], "client-secret");
		assert_eq!(pairs["redirect_uri"], "https://app.test/cb");
		assert_eq!(pairs["grant_type"], "authorization_code");
	}

	#[test]
	fn rejection_uses_oauth_error_fields() {
		let err = map_endpoint_rejection(
			&GoogleTokenStrategy,
			GrantType::AuthorizationCode,
			400,
			br#"{"error":"invalid_grant","error_description":"Code was already redeemed."}"#,
			None,
		);

		match err {
			Error::InvalidGrant { reason } => assert!(reason.contains("already redeemed")),
			other => panic!("Unexpected error: {other:?}"),
		}
	}

	#[test]
	fn rejection_without_json_falls_back_to_status() {
		let err = map_endpoint_rejection(
			&GoogleTokenStrategy,
			GrantType::AuthorizationCode,
			503,
			b"<html>maintenance</html>",
			Some(&ResponseMetadata { status: Some(503), retry_after: Some(Duration::seconds(5)) }),
		);

		assert!(matches!(
			err,
			Error::Transient(TransientError::TokenEndpoint {
				status: Some(503),
				retry_after: Some(_),
				..
			})
		));
	}

	#[test]
	fn refreshed_token_keeps_unrotated_refresh_token() {
		let mut authorization = RawAuthorization::from_json_str(
			r#"{"access_token":"old","refresh_token":"keep","expires_in":3600,"created":1,"id_token":"idt"}"#,
		)
		.expect("Fixture should parse.");
		let now = time::macros::datetime!(2025-01-01 00:00 UTC);

		RefreshedToken {
			access_token: "new".into(),
			expires_in: 3599,
			refresh_token: None,
			scope: None,
		}
		.merge_into(&mut authorization, now);

		assert_eq!(authorization.access_token(), Some("new"));
		assert_eq!(authorization.refresh_token(), Some("keep"));
		assert_eq!(authorization.expires_in(), Some(3599));
		assert_eq!(authorization.created(), Some(now));
		assert_eq!(authorization.as_map()["id_token"], "idt");
	}
}
