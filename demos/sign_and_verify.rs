//! Demonstrates a signed client talking to a mock server, then verifying the captured header
//! the way a receiving service would.

// std
use std::sync::Arc;
// crates.io
use color_eyre::Result;
use httpmock::prelude::*;
// self
use signed_bearer::{
	client::SignedClient,
	codec,
	factory,
	message::{Ed25519Signer, Ed25519Verifier},
	sequence::SequenceSource,
	store::MemoryStore,
	token::Claims,
	verify::{self, ReplayGuard},
};

#[tokio::main]
async fn main() -> Result<()> {
	color_eyre::install()?;

	let signer = Arc::new(Ed25519Signer::generate());
	let claims = Claims::new().with("username", "alice")?;
	let server = MockServer::start_async().await;
	let mock = server
		.mock_async(|when, then| {
			when.method(GET).path("/inbox").header_exists("authorization");
			then.status(200).body("ok");
		})
		.await;
	let store = MemoryStore::default();
	let client = SignedClient::builder(signer.clone())
		.sequence(SequenceSource::persistent(Arc::new(store)))
		.claims(claims.clone())
		.build()?;
	let response = client.get(server.url("/inbox")).send().await?;

	println!("Server answered {} for seq {}.", response.status(), client.current_sequence());

	mock.assert_async().await;

	// Re-mint the same header to play the receiving side.
	let header = factory::create_header(signer.as_ref(), client.current_sequence(), &claims).await?;
	let token = codec::decode_header(&header)?;
	let verifier = Ed25519Verifier::pinned(signer.verifying_key());

	println!("Author {} signed seq {}.", token.author, token.seq);
	println!("Fresh against seq 0: {}.", verify::verify(&verifier, &header, Some(0)).await);
	println!("Fresh against seq 1: {}.", verify::verify(&verifier, &header, Some(1)).await);

	let guard = ReplayGuard::new(Arc::new(verifier));

	println!("First delivery admitted: {}.", guard.admit(&header).await);
	println!("Replay admitted: {}.", guard.admit(&header).await);

	Ok(())
}
