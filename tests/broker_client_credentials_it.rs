// crates.io
use httpmock::prelude::*;
// self
use track_card::{
	_preludet::*,
	auth::{CachedToken, epoch_millis},
	broker::{TOKEN_CACHE_KEY, TokenBroker},
	error::CredentialError,
	http::ReqwestHttpClient,
	store::{CredentialStore, MemoryStore},
};

const CLIENT_ID: &str = "democlient";
const CLIENT_SECRET: &str = "demosecret";
// base64("democlient:demosecret")
const BASIC_HEADER: &str = "Basic ZGVtb2NsaWVudDpkZW1vc2VjcmV0";

fn broker_for(server: &MockServer) -> (TokenBroker, Arc<MemoryStore>) {
	build_test_broker(test_descriptor(&server.base_url()), CLIENT_ID, CLIENT_SECRET)
}

async fn mock_token_endpoint<'a>(server: &'a MockServer, token: &str) -> httpmock::Mock<'a> {
	let body = serde_json::json!({
		"access_token": token,
		"token_type": "bearer",
		"expires_in": 3600,
	})
	.to_string();

	server
		.mock_async(|when, then| {
			when.method(POST)
				.path("/api/token")
				.header("authorization", BASIC_HEADER)
				.header("content-type", "application/x-www-form-urlencoded");
			then.status(200).header("content-type", "application/json").body(body);
		})
		.await
}

#[tokio::test]
async fn first_call_exchanges_once_and_caches_expiry() {
	let server = MockServer::start_async().await;
	let (broker, store) = broker_for(&server);
	let mock = mock_token_endpoint(&server, "fresh-token").await;
	let now = OffsetDateTime::now_utc();
	let token = broker.access_token_at(now).await.expect("Token exchange should succeed.");

	assert_eq!(token.expose(), "fresh-token");

	mock.assert_calls_async(1).await;

	let raw = store
		.get(TOKEN_CACHE_KEY)
		.await
		.expect("Store read should succeed.")
		.expect("Token should be cached.");
	let cached = CachedToken::from_json(&raw).expect("Cached record should parse.");

	assert_eq!(cached.value.expose(), "fresh-token");
	assert_eq!(cached.expires_at_ms, epoch_millis(now) + 3_600_000);
}

#[tokio::test]
async fn calls_before_expiry_reuse_the_cache() {
	let server = MockServer::start_async().await;
	let (broker, _store) = broker_for(&server);
	let mock = mock_token_endpoint(&server, "reused-token").await;
	let now = OffsetDateTime::now_utc();

	broker.access_token_at(now).await.expect("First call should succeed.");

	let again = broker
		.access_token_at(now + Duration::minutes(59))
		.await
		.expect("Second call should succeed.");

	assert_eq!(again.expose(), "reused-token");

	mock.assert_calls_async(1).await;
}

#[tokio::test]
async fn calls_after_expiry_exchange_exactly_once_more() {
	let server = MockServer::start_async().await;
	let (broker, _store) = broker_for(&server);
	let mock = mock_token_endpoint(&server, "rolling-token").await;
	let now = OffsetDateTime::now_utc();

	broker.access_token_at(now).await.expect("First call should succeed.");
	broker
		.access_token_at(now + Duration::seconds(3600))
		.await
		.expect("Call at the expiry instant should refresh.");
	broker
		.access_token_at(now + Duration::seconds(3601))
		.await
		.expect("Call right after the refresh should reuse it.");

	mock.assert_calls_async(2).await;
}

#[tokio::test]
async fn missing_credentials_fail_before_any_request() {
	let server = MockServer::start_async().await;
	let mock = mock_token_endpoint(&server, "never").await;
	let store: Arc<dyn CredentialStore> = Arc::new(MemoryStore::default());
	let broker = TokenBroker::with_http_client(
		store,
		test_descriptor(&server.base_url()),
		ReqwestHttpClient::with_client(test_reqwest_client()),
	);
	let err =
		broker.access_token().await.expect_err("Missing credentials should be rejected.");

	assert!(matches!(err, Error::Credential(CredentialError::MissingClientCredentials)));

	mock.assert_calls_async(0).await;
}

#[tokio::test]
async fn rejected_exchange_carries_status_and_body_and_caches_nothing() {
	let server = MockServer::start_async().await;
	let (broker, store) = broker_for(&server);
	let mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/api/token");
			then.status(400)
				.header("content-type", "application/json")
				.body("{\"error\":\"invalid_client\",\"error_description\":\"Invalid client\"}");
		})
		.await;
	let err = broker.access_token().await.expect_err("Rejected exchange should fail.");

	match err {
		Error::Credential(CredentialError::Exchange { status, body }) => {
			assert_eq!(status, 400);
			assert_eq!(
				body,
				"{\"error\":\"invalid_client\",\"error_description\":\"Invalid client\"}"
			);
		},
		other => panic!("Unexpected error: {other:?}."),
	}

	mock.assert_calls_async(1).await;

	assert!(store.is_empty());
}

#[tokio::test]
async fn unreadable_cache_entry_counts_as_a_miss() {
	let server = MockServer::start_async().await;
	let (broker, store) = broker_for(&server);
	let mock = mock_token_endpoint(&server, "healed-token").await;

	store
		.set_with_ttl(TOKEN_CACHE_KEY, "legacy-plain-token".into(), None)
		.await
		.expect("Fixture write should succeed.");

	let token = broker.access_token().await.expect("Corrupt entry should be replaced.");

	assert_eq!(token.expose(), "healed-token");

	mock.assert_calls_async(1).await;
}

#[tokio::test]
async fn overlapping_misses_are_tolerated() {
	let server = MockServer::start_async().await;
	let (broker, _store) = broker_for(&server);
	let mock = mock_token_endpoint(&server, "racing-token").await;
	let (first, second) = tokio::join!(broker.access_token(), broker.access_token());

	assert_eq!(first.expect("First racer should succeed.").expose(), "racing-token");
	assert_eq!(second.expect("Second racer should succeed.").expose(), "racing-token");

	let calls = mock.calls_async().await;

	assert!((1..=2).contains(&calls), "unexpected exchange count {calls}");
}
