//! Signed envelope model: the unsigned [`Payload`] handed to a signer and the resulting
//! [`Token`] that travels on the wire.

pub mod claims;

pub use claims::*;

// crates.io
use serde::{
	Deserializer,
	de::{self, Visitor},
};
// self
use crate::_prelude::*;

/// What a signer is asked to sign: a sequence number plus caller claims.
///
/// The two parts stay separate until the serialization boundary, where they are flattened into
/// one JSON object.
#[derive(Clone, Debug, PartialEq)]
pub struct Payload {
	/// Sequence number bound into the signature.
	pub seq: u64,
	/// Extra claims merged next to `seq`.
	pub claims: Claims,
}
impl Payload {
	/// Creates a payload for the provided sequence number and claims.
	pub fn new(seq: u64, claims: Claims) -> Self {
		Self { seq, claims }
	}

	/// Canonical bytes a signer must sign once it knows its `author` string.
	pub fn signable_bytes(&self, author: &str) -> Result<Vec<u8>, serde_json::Error> {
		signable_bytes(self.seq, author, &self.claims)
	}

	/// Attaches the signer's identity and signature, producing the wire token.
	pub fn into_token(self, author: impl Into<String>, signature: impl Into<String>) -> Token {
		Token {
			seq: self.seq,
			author: author.into(),
			signature: signature.into(),
			claims: self.claims,
		}
	}
}

/// Signed envelope carried inside `Authorization: Bearer <...>` headers.
///
/// On the wire this is a single flat JSON object:
/// `{ "seq": 1, "author": "...", "signature": "...", ...claims }`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Token {
	/// Monotonically increasing sequence number; strings are coerced on decode.
	#[serde(deserialize_with = "deserialize_seq")]
	pub seq: u64,
	/// Identity of the signing keypair.
	pub author: String,
	/// Signature over every other field.
	pub signature: String,
	/// Extra claims flattened at the same level as `seq`.
	#[serde(flatten)]
	pub claims: Claims,
}
impl Token {
	/// Canonical bytes the signature was produced over.
	pub fn signable_bytes(&self) -> Result<Vec<u8>, serde_json::Error> {
		signable_bytes(self.seq, &self.author, &self.claims)
	}

	/// Looks up an extra claim by name.
	pub fn claim(&self, key: &str) -> Option<&JsonValue> {
		self.claims.get(key)
	}
}

// Keys are sorted explicitly so the result does not depend on serde_json's map ordering.
fn signable_bytes(seq: u64, author: &str, claims: &Claims) -> Result<Vec<u8>, serde_json::Error> {
	let seq = JsonValue::from(seq);
	let author = JsonValue::from(author);
	let mut fields: BTreeMap<&str, &JsonValue> =
		claims.iter().map(|(key, value)| (key.as_str(), value)).collect();

	fields.insert("seq", &seq);
	fields.insert("author", &author);

	serde_json::to_vec(&fields)
}

fn deserialize_seq<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
	D: Deserializer<'de>,
{
	struct SeqVisitor;
	impl Visitor<'_> for SeqVisitor {
		type Value = u64;

		fn expecting(&self, f: &mut Formatter) -> FmtResult {
			f.write_str("a non-negative integer or a decimal string")
		}

		fn visit_u64<E>(self, v: u64) -> Result<u64, E>
		where
			E: de::Error,
		{
			Ok(v)
		}

		fn visit_i64<E>(self, v: i64) -> Result<u64, E>
		where
			E: de::Error,
		{
			u64::try_from(v).map_err(|_| E::invalid_value(de::Unexpected::Signed(v), &self))
		}

		fn visit_str<E>(self, v: &str) -> Result<u64, E>
		where
			E: de::Error,
		{
			v.trim().parse().map_err(|_| E::invalid_value(de::Unexpected::Str(v), &self))
		}
	}

	deserializer.deserialize_any(SeqVisitor)
}

#[cfg(test)]
mod tests {
	// crates.io
	use serde_json::json;
	// self
	use super::*;

	fn token(seq: u64) -> Token {
		Payload::new(seq, Claims::new().with("username", "alice").expect("Claims should build."))
			.into_token("did:key:test", "sig")
	}

	#[test]
	fn serializes_flat_object() {
		let value = serde_json::to_value(token(7)).expect("Token should serialize to JSON.");

		assert_eq!(
			value,
			json!({ "seq": 7, "author": "did:key:test", "signature": "sig", "username": "alice" })
		);
	}

	#[test]
	fn string_sequence_is_coerced() {
		let decoded: Token = serde_json::from_value(
			json!({ "seq": "12", "author": "a", "signature": "s", "extra": true }),
		)
		.expect("String sequence numbers should be accepted.");

		assert_eq!(decoded.seq, 12);
		assert_eq!(decoded.claim("extra"), Some(&json!(true)));
	}

	#[test]
	fn negative_or_fractional_sequence_is_rejected() {
		for seq in [json!(-1), json!(1.5), json!("abc")] {
			let result = serde_json::from_value::<Token>(
				json!({ "seq": seq, "author": "a", "signature": "s" }),
			);

			assert!(result.is_err(), "Sequence {seq} should be rejected.");
		}
	}

	#[test]
	fn signable_bytes_are_sorted_and_exclude_signature() {
		let bytes = token(3).signable_bytes().expect("Signable bytes should serialize.");

		assert_eq!(
			String::from_utf8(bytes).expect("Signable bytes should be UTF-8."),
			r#"{"author":"did:key:test","seq":3,"username":"alice"}"#
		);
	}
}
