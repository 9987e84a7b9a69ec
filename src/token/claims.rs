//! Caller-chosen extra claims carried next to `seq` inside a signed envelope.

// self
use crate::_prelude::*;

/// Field names owned by the envelope itself; claims may never use them.
pub const RESERVED_CLAIMS: [&str; 3] = ["seq", "author", "signature"];

/// Errors raised while building [`Claims`].
#[derive(Clone, Debug, PartialEq, Eq, ThisError)]
pub enum ClaimsError {
	/// The claim name collides with an envelope field.
	#[error("Claim `{key}` is reserved by the token envelope.")]
	Reserved {
		/// Offending claim name.
		key: String,
	},
	/// Claims must be supplied as a JSON object.
	#[error("Claims must be a JSON object, found {found}.")]
	NotAnObject {
		/// JSON type that was supplied instead.
		found: &'static str,
	},
}

/// Extra claims flattened next to `seq`, `author`, and `signature` on the wire.
///
/// Reserved names are rejected on every construction path, so a caller can never override the
/// sequence number or forge the author field through claims.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Claims(JsonMap<String, JsonValue>);
impl Claims {
	/// Creates an empty claim set.
	pub fn new() -> Self {
		Self::default()
	}

	/// Adds a claim, rejecting reserved names.
	pub fn with(
		mut self,
		key: impl Into<String>,
		value: impl Into<JsonValue>,
	) -> Result<Self, ClaimsError> {
		self.insert(key, value)?;

		Ok(self)
	}

	/// Inserts a claim in place, returning the previous value for that name.
	pub fn insert(
		&mut self,
		key: impl Into<String>,
		value: impl Into<JsonValue>,
	) -> Result<Option<JsonValue>, ClaimsError> {
		let key = key.into();

		validate_key(&key)?;

		Ok(self.0.insert(key, value.into()))
	}

	/// Looks up a claim by name.
	pub fn get(&self, key: &str) -> Option<&JsonValue> {
		self.0.get(key)
	}

	/// Number of claims.
	pub fn len(&self) -> usize {
		self.0.len()
	}

	/// Whether no claims are present.
	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}

	/// Iterates claims in map order.
	pub fn iter(&self) -> impl Iterator<Item = (&String, &JsonValue)> {
		self.0.iter()
	}

	/// Re-validates claims that bypassed the checked constructors (e.g. decoded from the wire).
	pub fn validate(&self) -> Result<(), ClaimsError> {
		self.0.keys().try_for_each(|key| validate_key(key))
	}
}
impl TryFrom<JsonValue> for Claims {
	type Error = ClaimsError;

	fn try_from(value: JsonValue) -> Result<Self, Self::Error> {
		let found = json_kind(&value);
		let JsonValue::Object(map) = value else {
			return Err(ClaimsError::NotAnObject { found });
		};
		let claims = Self(map);

		claims.validate()?;

		Ok(claims)
	}
}
impl TryFrom<JsonMap<String, JsonValue>> for Claims {
	type Error = ClaimsError;

	fn try_from(map: JsonMap<String, JsonValue>) -> Result<Self, Self::Error> {
		Self::try_from(JsonValue::Object(map))
	}
}

fn validate_key(key: &str) -> Result<(), ClaimsError> {
	if RESERVED_CLAIMS.contains(&key) {
		Err(ClaimsError::Reserved { key: key.to_owned() })
	} else {
		Ok(())
	}
}

fn json_kind(value: &JsonValue) -> &'static str {
	match value {
		JsonValue::Null => "null",
		JsonValue::Bool(_) => "a boolean",
		JsonValue::Number(_) => "a number",
		JsonValue::String(_) => "a string",
		JsonValue::Array(_) => "an array",
		JsonValue::Object(_) => "an object",
	}
}

#[cfg(test)]
mod tests {
	// crates.io
	use serde_json::json;
	// self
	use super::*;

	#[test]
	fn reserved_names_are_rejected() {
		for key in RESERVED_CLAIMS {
			let err =
				Claims::new().with(key, 1).expect_err("Reserved claim names must be rejected.");

			assert_eq!(err, ClaimsError::Reserved { key: key.into() });
		}
	}

	#[test]
	fn object_values_convert_and_others_fail() {
		let claims = Claims::try_from(json!({ "username": "alice", "role": ["admin"] }))
			.expect("Plain JSON objects should convert into claims.");

		assert_eq!(claims.len(), 2);
		assert_eq!(claims.get("username"), Some(&json!("alice")));
		assert_eq!(
			Claims::try_from(json!([1, 2])),
			Err(ClaimsError::NotAnObject { found: "an array" })
		);
		assert!(matches!(
			Claims::try_from(json!({ "seq": 9 })),
			Err(ClaimsError::Reserved { .. })
		));
	}
}
