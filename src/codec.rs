//! Conversions between [`Token`] values, bare base64 token strings, and `Bearer` header values.

// crates.io
use base64::{
	Engine,
	alphabet,
	engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig, general_purpose::STANDARD},
};
// self
use crate::{_prelude::*, token::Token};

/// Authorization scheme emitted in front of encoded tokens.
pub const BEARER_SCHEME: &str = "Bearer";

const LENIENT: GeneralPurposeConfig =
	GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent);
const STANDARD_LENIENT: GeneralPurpose = GeneralPurpose::new(&alphabet::STANDARD, LENIENT);
const URL_SAFE_LENIENT: GeneralPurpose = GeneralPurpose::new(&alphabet::URL_SAFE, LENIENT);

/// Failures raised while decoding headers or bare tokens.
#[derive(Debug, ThisError)]
pub enum DecodeError {
	/// The header has no space between the scheme and the token.
	#[error("Authorization header is missing the scheme separator.")]
	MissingSeparator,
	/// The header uses a scheme other than `Bearer`.
	#[error("Authorization scheme `{scheme}` is not supported.")]
	UnsupportedScheme {
		/// Scheme that was supplied.
		scheme: String,
	},
	/// The token is not valid base64 in either the standard or URL-safe alphabet.
	#[error("Token is not valid base64.")]
	Base64(#[from] base64::DecodeError),
	/// The decoded bytes are not a token JSON object.
	#[error("Token JSON is malformed.")]
	Json(#[from] serde_path_to_error::Error<serde_json::Error>),
	/// The token JSON is followed by unexpected bytes.
	#[error("Token JSON is followed by trailing data.")]
	TrailingData(#[source] serde_json::Error),
}

/// Failure raised while serializing a token.
#[derive(Debug, ThisError)]
#[error("Token could not be serialized.")]
pub struct EncodeError(#[from] pub serde_json::Error);

/// Encodes a token as `Bearer <base64(JSON(token))>`.
pub fn encode_header(token: &Token) -> Result<String, EncodeError> {
	Ok(format!("{BEARER_SCHEME} {}", encode_token(token)?))
}

/// Encodes a token as bare base64 JSON, without the `Bearer` prefix.
pub fn encode_token(token: &Token) -> Result<String, EncodeError> {
	let json = serde_json::to_vec(token)?;

	Ok(STANDARD.encode(json))
}

/// Decodes a `Bearer <token>` header value.
///
/// The header is split on its first space; everything after it is the bare token.
pub fn decode_header(header: &str) -> Result<Token, DecodeError> {
	let (scheme, token) = header.trim().split_once(' ').ok_or(DecodeError::MissingSeparator)?;

	if !scheme.eq_ignore_ascii_case(BEARER_SCHEME) {
		return Err(DecodeError::UnsupportedScheme { scheme: scheme.to_owned() });
	}

	decode_token(token)
}

/// Decodes a bare base64 JSON token.
pub fn decode_token(token: &str) -> Result<Token, DecodeError> {
	let raw = token.trim();
	let bytes =
		STANDARD_LENIENT.decode(raw).or_else(|e| URL_SAFE_LENIENT.decode(raw).map_err(|_| e))?;
	let mut de = serde_json::Deserializer::from_slice(&bytes);
	let token = serde_path_to_error::deserialize(&mut de)?;

	de.end().map_err(DecodeError::TrailingData)?;

	Ok(token)
}
