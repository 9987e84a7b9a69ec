mod common;

// std
use std::sync::Arc;
// crates.io
use httpmock::prelude::*;
// self
use signed_bearer::{
	client::SignedClient,
	codec,
	factory,
	message::MessageSigner,
	reqwest::Client as ReqwestClient,
	sequence::{SequenceSource, StoreHandle},
	store::{KeyValueStore, MemoryStore},
	token::Claims,
};
use common::*;

async fn expected_header(seed: u8, seq: u64, claims: &Claims) -> String {
	let signer = test_signer(seed);

	factory::create_header(signer.as_ref(), seq, claims)
		.await
		.expect("Expected header fixture should mint.")
}

#[tokio::test]
async fn fixed_start_signs_one_then_two() {
	let server = MockServer::start_async().await;
	let first_header = expected_header(1, 1, &Claims::new()).await;
	let second_header = expected_header(1, 2, &Claims::new()).await;
	let first = server
		.mock_async(|when, then| {
			when.method(GET).path("/").header("authorization", first_header.as_str());
			then.status(200);
		})
		.await;
	let second = server
		.mock_async(|when, then| {
			when.method(GET).path("/").header("authorization", second_header.as_str());
			then.status(200);
		})
		.await;
	let signer: Arc<dyn MessageSigner> = test_signer(1);
	let client = SignedClient::wrap(
		ReqwestClient::new(),
		signer,
		SequenceSource::Fixed(0),
		Claims::new(),
	)
	.expect("Signed client should build.");

	for _ in 0..2 {
		let response =
			client.get(server.url("/")).send().await.expect("Signed request should succeed.");

		assert_eq!(response.status().as_u16(), 200);
	}

	first.assert_async().await;
	second.assert_async().await;
	assert_eq!(client.current_sequence(), 2);
}

#[tokio::test]
async fn persistent_store_tracks_every_request() {
	let server = MockServer::start_async().await;
	let mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/events");
			then.status(204);
		})
		.await;
	let backend = MemoryStore::default();
	let client = SignedClient::builder(test_signer(2))
		.sequence(SequenceSource::persistent(Arc::new(backend.clone())))
		.build()
		.expect("Signed client should build.");

	for body in ["first", "second"] {
		client
			.post(server.url("/events"))
			.body(body)
			.send()
			.await
			.expect("Signed request should succeed.");
	}

	mock.assert_calls_async(2).await;
	assert_eq!(
		backend.get("__seq").expect("Memory store reads should succeed."),
		Some("2".to_owned())
	);
}

#[tokio::test]
async fn seeded_store_continues_from_stored_value() {
	let server = MockServer::start_async().await;
	let expected = expected_header(3, 4, &Claims::new()).await;
	let mock = server
		.mock_async(|when, then| {
			when.method(GET).path("/resource").header("authorization", expected.as_str());
			then.status(200);
		})
		.await;
	let backend = MemoryStore::with_entries([("__seq", "3")]);
	let client = SignedClient::builder(test_signer(3))
		.sequence(StoreHandle::new(Arc::new(backend.clone())))
		.build()
		.expect("Signed client should build.");

	client.get(server.url("/resource")).send().await.expect("Signed request should succeed.");

	mock.assert_async().await;
	assert_eq!(
		backend.get("__seq").expect("Memory store reads should succeed."),
		Some("4".to_owned())
	);
}

#[tokio::test]
async fn extra_claims_ride_along() {
	let server = MockServer::start_async().await;
	let expected = expected_header(4, 1, &test_claims()).await;
	let mock = server
		.mock_async(|when, then| {
			when.method(GET).path("/").header("authorization", expected.as_str());
			then.status(200);
		})
		.await;
	let client = SignedClient::builder(test_signer(4))
		.claims(test_claims())
		.build()
		.expect("Signed client should build.");

	client.get(server.url("/")).send().await.expect("Signed request should succeed.");

	mock.assert_async().await;

	let decoded = codec::decode_header(&expected).expect("Expected header should decode.");

	assert_eq!(decoded.seq, 1);
	assert_eq!(decoded.claim("username"), Some(&"alice".into()));
}

#[tokio::test]
async fn failed_responses_still_consume_sequence_numbers() {
	let server = MockServer::start_async().await;
	let mock = server
		.mock_async(|when, then| {
			when.method(GET).path("/flaky");
			then.status(503);
		})
		.await;
	let client = SignedClient::builder(test_signer(5))
		.sequence(10_u64)
		.build()
		.expect("Signed client should build.");

	for _ in 0..3 {
		let response =
			client.get(server.url("/flaky")).send().await.expect("Transport should succeed.");

		assert_eq!(response.status().as_u16(), 503);
	}

	mock.assert_calls_async(3).await;
	assert_eq!(client.current_sequence(), 13);
}

#[tokio::test]
async fn prebuilt_requests_are_signed_on_execute() {
	let server = MockServer::start_async().await;
	let expected = expected_header(6, 1, &Claims::new()).await;
	let mock = server
		.mock_async(|when, then| {
			when.method(DELETE).path("/item").header("authorization", expected.as_str());
			then.status(200);
		})
		.await;
	let client =
		SignedClient::builder(test_signer(6)).build().expect("Signed client should build.");
	let request = client
		.inner()
		.delete(server.url("/item"))
		.header("authorization", "Bearer stale")
		.build()
		.expect("Request should build.");

	client.execute(request).await.expect("Signed request should succeed.");

	mock.assert_async().await;
}

#[test]
fn reserved_claims_cannot_override_the_sequence() {
	let claims = Claims::try_from(serde_json::json!({ "role": "admin" }))
		.expect("Non-reserved claims should convert.");
	let mut forged = claims.clone();

	assert!(forged.insert("seq", 99).is_err());
	assert!(SignedClient::builder(test_signer(7)).claims(claims).build().is_ok());
}
