//! Token and header creation, both one-shot (caller supplies `seq`) and stateful (the factory
//! owns a [`SequenceStore`] and advances it on every call).

// self
use crate::{
	_prelude::*,
	codec,
	error::ConfigError,
	ext::AuthorizationTarget,
	message::MessageSigner,
	obs::{self, OpKind, OpOutcome, OpSpan},
	sequence::{SequenceSource, SequenceStore},
	token::{Claims, Payload, Token},
};

/// Signs `{ seq } ∪ claims` with `signer`.
///
/// `seq` must be positive; reserved claim names are rejected before the signer is invoked.
pub async fn create_token<S>(signer: &S, seq: u64, claims: &Claims) -> Result<Token>
where
	S: MessageSigner + ?Sized,
{
	if seq == 0 {
		return Err(ConfigError::ZeroSequence.into());
	}

	claims.validate().map_err(ConfigError::from)?;

	let span = OpSpan::new(OpKind::Sign, "create_token");

	obs::record_op_outcome(OpKind::Sign, OpOutcome::Attempt);

	let result = span.instrument(signer.create(Payload::new(seq, claims.clone()))).await;

	match result {
		Ok(token) => {
			obs::record_op_outcome(OpKind::Sign, OpOutcome::Success);

			Ok(token)
		},
		Err(e) => {
			obs::record_op_outcome(OpKind::Sign, OpOutcome::Failure);

			Err(e.into())
		},
	}
}

/// Signs a token and encodes it as a `Bearer` header value.
pub async fn create_header<S>(signer: &S, seq: u64, claims: &Claims) -> Result<String>
where
	S: MessageSigner + ?Sized,
{
	let token = create_token(signer, seq, claims).await?;

	Ok(codec::encode_header(&token)?)
}

/// Shared state of the stateful factories: who signs, what extra claims ride along, and which
/// counter advances.
#[derive(Clone)]
struct Minter {
	signer: Arc<dyn MessageSigner>,
	claims: Claims,
	sequence: Arc<SequenceStore>,
}
impl Minter {
	fn new(
		signer: Arc<dyn MessageSigner>,
		claims: Claims,
		sequence: Arc<SequenceStore>,
	) -> Result<Self> {
		claims.validate().map_err(ConfigError::from)?;

		Ok(Self { signer, claims, sequence })
	}

	async fn mint(&self) -> Result<Token> {
		// Advance before the first await so concurrent callers never share a value.
		let seq = self.sequence.next()?;

		create_token(self.signer.as_ref(), seq, &self.claims).await
	}
}
impl Debug for Minter {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("Minter")
			.field("claims", &self.claims)
			.field("sequence", &self.sequence)
			.finish_non_exhaustive()
	}
}

/// Produces a fresh `Bearer` header, with the next sequence number, on every call.
#[derive(Clone, Debug)]
pub struct HeaderFactory(Minter);
impl HeaderFactory {
	/// Builds a factory around an existing (possibly shared) counter.
	pub fn new(
		signer: Arc<dyn MessageSigner>,
		claims: Claims,
		sequence: Arc<SequenceStore>,
	) -> Result<Self> {
		Ok(Self(Minter::new(signer, claims, sequence)?))
	}

	/// Builds a factory and resolves its counter from `source`.
	pub fn from_source(
		signer: Arc<dyn MessageSigner>,
		claims: Claims,
		source: SequenceSource,
	) -> Result<Self> {
		let sequence = SequenceStore::from_source(source)?;

		Self::new(signer, claims, Arc::new(sequence))
	}

	/// Advances the counter and returns `Bearer <base64(JSON(token))>`.
	pub async fn next_header(&self) -> Result<String> {
		let token = self.0.mint().await?;

		Ok(codec::encode_header(&token)?)
	}

	/// Mints the next header and attaches it to `request` as its `Authorization` value.
	///
	/// This is the "before send" hook: call it immediately before dispatching the request.
	/// Each call consumes a sequence number, including calls for retried requests.
	pub async fn sign_request<R>(&self, request: R) -> Result<R>
	where
		R: AuthorizationTarget,
	{
		let header = self.next_header().await?;

		request.set_authorization(&header)
	}

	/// Last issued sequence number.
	pub fn current_sequence(&self) -> u64 {
		self.0.sequence.current()
	}

	/// Counter shared by this factory.
	pub fn sequence(&self) -> &Arc<SequenceStore> {
		&self.0.sequence
	}
}

/// Produces a fresh bare token string (no `Bearer` prefix) on every call.
///
/// Useful where the credential travels outside an `Authorization` header, such as a query
/// parameter or a websocket handshake message.
#[derive(Clone, Debug)]
pub struct TokenFactory(Minter);
impl TokenFactory {
	/// Builds a factory around an existing (possibly shared) counter.
	pub fn new(
		signer: Arc<dyn MessageSigner>,
		claims: Claims,
		sequence: Arc<SequenceStore>,
	) -> Result<Self> {
		Ok(Self(Minter::new(signer, claims, sequence)?))
	}

	/// Builds a factory and resolves its counter from `source`.
	pub fn from_source(
		signer: Arc<dyn MessageSigner>,
		claims: Claims,
		source: SequenceSource,
	) -> Result<Self> {
		let sequence = SequenceStore::from_source(source)?;

		Self::new(signer, claims, Arc::new(sequence))
	}

	/// Advances the counter and returns `base64(JSON(token))`.
	pub async fn next_token(&self) -> Result<String> {
		let token = self.0.mint().await?;

		Ok(codec::encode_token(&token)?)
	}

	/// Last issued sequence number.
	pub fn current_sequence(&self) -> u64 {
		self.0.sequence.current()
	}
}
