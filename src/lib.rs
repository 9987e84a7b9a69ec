//! Replay-resistant signed bearer tokens: a strictly increasing sequence number is bound into a
//! signed envelope, encoded as `Bearer <base64(JSON)>`, attached to every outgoing request, and
//! checked for both signature and freshness on the receiving side.

#![deny(clippy::all, missing_docs, unused_crate_dependencies)]

pub mod codec;
pub mod error;
pub mod ext;
pub mod factory;
pub mod message;
pub mod obs;
pub mod sequence;
pub mod store;
pub mod token;
pub mod verify;

#[cfg(feature = "reqwest")] pub mod client;

mod _prelude {
	pub use std::{
		collections::{BTreeMap, HashMap},
		error::Error as StdError,
		fmt::{Debug, Display, Formatter, Result as FmtResult},
		future::Future,
		pin::Pin,
		str::FromStr,
		sync::Arc,
	};

	pub use parking_lot::{Mutex, RwLock};
	#[cfg(feature = "reqwest")]
	pub use reqwest::{Client as ReqwestClient, Error as ReqwestError};
	pub use serde::{Deserialize, Serialize};
	pub use serde_json::{Map as JsonMap, Value as JsonValue};
	pub use thiserror::Error as ThisError;

	pub use crate::error::{Error, Result};
}

#[cfg(feature = "reqwest")] pub use reqwest;
#[cfg(test)] use {color_eyre as _, httpmock as _, tokio as _};
