//! Reqwest client wrapper that signs every outgoing request.
//!
//! [`SignedClient`] owns a [`HeaderFactory`]; immediately before each dispatch it advances the
//! counter (persisting it when a store backs the sequence), mints a header, and overwrites the
//! request's `Authorization` value. Retried requests are new dispatches and therefore carry new
//! sequence numbers. The first request from a fresh `Fixed(0)` signer carries `seq = 1`.

// std
use std::time::Duration;
// crates.io
use reqwest::{
	Body, IntoUrl, Method, Request, RequestBuilder, Response,
	header::{HeaderName, HeaderValue},
};
// self
use crate::{
	_prelude::*,
	error::{ConfigError, TransportError},
	factory::HeaderFactory,
	message::MessageSigner,
	obs::{self, OpKind, OpOutcome, OpSpan},
	sequence::{SequenceSource, SequenceStore},
	token::Claims,
};

/// HTTP client whose requests all carry a freshly signed, auto-incrementing bearer token.
#[derive(Clone, Debug)]
pub struct SignedClient {
	client: ReqwestClient,
	headers: HeaderFactory,
}
impl SignedClient {
	/// Starts a builder for the provided signer.
	pub fn builder(signer: Arc<dyn MessageSigner>) -> SignedClientBuilder {
		SignedClientBuilder::new(signer)
	}

	/// Wraps `client` so every request is signed by `signer`.
	pub fn wrap(
		client: ReqwestClient,
		signer: Arc<dyn MessageSigner>,
		source: SequenceSource,
		claims: Claims,
	) -> Result<Self> {
		let headers = HeaderFactory::from_source(signer, claims, source)?;

		Ok(Self { client, headers })
	}

	/// Wraps `client` around an existing header factory (and therefore its counter).
	pub fn with_factory(client: ReqwestClient, headers: HeaderFactory) -> Self {
		Self { client, headers }
	}

	/// Starts a request with an arbitrary method.
	pub fn request(&self, method: Method, url: impl IntoUrl) -> SignedRequestBuilder<'_> {
		SignedRequestBuilder { client: self, inner: self.client.request(method, url) }
	}

	/// Starts a `GET` request.
	pub fn get(&self, url: impl IntoUrl) -> SignedRequestBuilder<'_> {
		self.request(Method::GET, url)
	}

	/// Starts a `POST` request.
	pub fn post(&self, url: impl IntoUrl) -> SignedRequestBuilder<'_> {
		self.request(Method::POST, url)
	}

	/// Starts a `PUT` request.
	pub fn put(&self, url: impl IntoUrl) -> SignedRequestBuilder<'_> {
		self.request(Method::PUT, url)
	}

	/// Starts a `PATCH` request.
	pub fn patch(&self, url: impl IntoUrl) -> SignedRequestBuilder<'_> {
		self.request(Method::PATCH, url)
	}

	/// Starts a `DELETE` request.
	pub fn delete(&self, url: impl IntoUrl) -> SignedRequestBuilder<'_> {
		self.request(Method::DELETE, url)
	}

	/// Signs and sends an already-built request.
	pub async fn execute(&self, request: Request) -> Result<Response> {
		const KIND: OpKind = OpKind::Send;

		let span = OpSpan::new(KIND, "execute");

		obs::record_op_outcome(KIND, OpOutcome::Attempt);

		let result = span
			.instrument(async move {
				let request = self.headers.sign_request(request).await?;
				let response =
					self.client.execute(request).await.map_err(TransportError::from)?;

				Ok::<_, Error>(response)
			})
			.await;

		match &result {
			Ok(_) => obs::record_op_outcome(KIND, OpOutcome::Success),
			Err(_) => obs::record_op_outcome(KIND, OpOutcome::Failure),
		}

		result
	}

	/// Last sequence number placed on a request.
	pub fn current_sequence(&self) -> u64 {
		self.headers.current_sequence()
	}

	/// Header factory driving this client.
	pub fn header_factory(&self) -> &HeaderFactory {
		&self.headers
	}

	/// Underlying reqwest client.
	pub fn inner(&self) -> &ReqwestClient {
		&self.client
	}
}

/// Request builder whose [`send`](Self::send) signs the request right before dispatch.
#[derive(Debug)]
pub struct SignedRequestBuilder<'a> {
	client: &'a SignedClient,
	inner: RequestBuilder,
}
impl SignedRequestBuilder<'_> {
	/// Adds a header. An `Authorization` header set here is overwritten at send time.
	pub fn header(mut self, key: HeaderName, value: HeaderValue) -> Self {
		self.inner = self.inner.header(key, value);

		self
	}

	/// Appends query parameters.
	pub fn query<T>(mut self, query: &T) -> Self
	where
		T: ?Sized + Serialize,
	{
		self.inner = self.inner.query(query);

		self
	}

	/// Sets the request body.
	pub fn body(mut self, body: impl Into<Body>) -> Self {
		self.inner = self.inner.body(body);

		self
	}

	/// Sets a per-request timeout.
	pub fn timeout(mut self, timeout: Duration) -> Self {
		self.inner = self.inner.timeout(timeout);

		self
	}

	/// Builds, signs, and sends the request.
	pub async fn send(self) -> Result<Response> {
		let request = self.inner.build().map_err(ConfigError::invalid_request)?;

		self.client.execute(request).await
	}
}

/// Builder for [`SignedClient`].
pub struct SignedClientBuilder {
	signer: Arc<dyn MessageSigner>,
	client: Option<ReqwestClient>,
	source: SequenceSource,
	sequence: Option<Arc<SequenceStore>>,
	claims: Claims,
}
impl SignedClientBuilder {
	/// Creates a builder seeded with the signer; the counter defaults to `Fixed(0)`.
	pub fn new(signer: Arc<dyn MessageSigner>) -> Self {
		Self {
			signer,
			client: None,
			source: SequenceSource::default(),
			sequence: None,
			claims: Claims::default(),
		}
	}

	/// Uses a preconfigured reqwest client instead of `Client::new()`.
	pub fn client(mut self, client: ReqwestClient) -> Self {
		self.client = Some(client);

		self
	}

	/// Chooses where the counter starts from.
	pub fn sequence(mut self, source: impl Into<SequenceSource>) -> Self {
		self.source = source.into();

		self
	}

	/// Shares an already-resolved counter (overrides [`sequence`](Self::sequence)).
	pub fn shared_sequence(mut self, sequence: Arc<SequenceStore>) -> Self {
		self.sequence = Some(sequence);

		self
	}

	/// Extra claims merged into every token.
	pub fn claims(mut self, claims: Claims) -> Self {
		self.claims = claims;

		self
	}

	/// Resolves the counter and validates claims.
	pub fn build(self) -> Result<SignedClient> {
		let sequence = match self.sequence {
			Some(sequence) => sequence,
			None => Arc::new(SequenceStore::from_source(self.source)?),
		};
		let headers = HeaderFactory::new(self.signer, self.claims, sequence)?;

		Ok(SignedClient::with_factory(self.client.unwrap_or_default(), headers))
	}
}
impl Debug for SignedClientBuilder {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("SignedClientBuilder")
			.field("source", &self.source)
			.field("claims", &self.claims)
			.finish_non_exhaustive()
	}
}
