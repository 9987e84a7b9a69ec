mod common;

// std
use std::{
	env, fs, process,
	sync::Arc,
	time::{SystemTime, UNIX_EPOCH},
};
// self
use signed_bearer::{
	codec,
	factory::{HeaderFactory, TokenFactory},
	sequence::{SequenceSource, SequenceStore, StoreHandle},
	store::{FileStore, KeyValueStore, MemoryStore},
	token::Claims,
};
use common::*;

fn temp_path() -> std::path::PathBuf {
	let nanos = SystemTime::now().duration_since(UNIX_EPOCH).map(|d| d.as_nanos()).unwrap_or(0);

	env::temp_dir().join(format!("signed_bearer_sequence_it_{}_{nanos}.json", process::id()))
}

#[tokio::test]
async fn file_backed_counter_survives_restart() {
	let path = temp_path();

	{
		let store = FileStore::open(&path).expect("File store should open.");
		let factory = HeaderFactory::from_source(
			test_signer(21),
			Claims::new(),
			SequenceSource::persistent(Arc::new(store)),
		)
		.expect("Header factory should build.");

		for expected in 1..=2 {
			let header = factory.next_header().await.expect("Header should mint.");

			assert_eq!(codec::decode_header(&header).expect("Header should decode.").seq, expected);
		}
	}

	let reopened = FileStore::open(&path).expect("File store should reopen.");

	assert_eq!(
		reopened.get("__seq").expect("File store reads should succeed."),
		Some("2".to_owned())
	);

	let factory = TokenFactory::from_source(
		test_signer(21),
		Claims::new(),
		SequenceSource::persistent(Arc::new(reopened)),
	)
	.expect("Token factory should build.");
	let token = factory.next_token().await.expect("Token should mint.");

	assert_eq!(codec::decode_token(&token).expect("Token should decode.").seq, 3);

	fs::remove_file(&path).unwrap_or_else(|e| {
		panic!("Failed to remove temporary file store snapshot {}: {e}", path.display())
	});
}

#[tokio::test]
async fn custom_keys_isolate_identities() {
	let backend = MemoryStore::default();
	let alice = HeaderFactory::from_source(
		test_signer(22),
		Claims::new(),
		StoreHandle::new(Arc::new(backend.clone())).with_key("alice.seq").into(),
	)
	.expect("Header factory should build.");
	let bob = HeaderFactory::from_source(
		test_signer(23),
		Claims::new(),
		StoreHandle::new(Arc::new(backend.clone())).with_key("bob.seq").into(),
	)
	.expect("Header factory should build.");

	alice.next_header().await.expect("Header should mint.");
	alice.next_header().await.expect("Header should mint.");
	bob.next_header().await.expect("Header should mint.");

	assert_eq!(backend.get("alice.seq").expect("Reads should succeed."), Some("2".to_owned()));
	assert_eq!(backend.get("bob.seq").expect("Reads should succeed."), Some("1".to_owned()));
}

#[tokio::test]
async fn concurrent_tasks_get_distinct_sequences() {
	let sequence = Arc::new(SequenceStore::ephemeral(0));
	let factory = HeaderFactory::new(test_signer(24), Claims::new(), sequence.clone())
		.expect("Header factory should build.");
	let tasks: Vec<_> = (0..16)
		.map(|_| {
			let factory = factory.clone();

			tokio::spawn(async move { factory.next_header().await })
		})
		.collect();
	let mut seen = Vec::new();

	for task in tasks {
		let header = task.await.expect("Task should not panic.").expect("Header should mint.");

		seen.push(codec::decode_header(&header).expect("Header should decode.").seq);
	}

	seen.sort_unstable();

	assert_eq!(seen, (1..=16).collect::<Vec<_>>());
	assert_eq!(sequence.current(), 16);
}
