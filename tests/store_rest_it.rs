// crates.io
use httpmock::prelude::*;
use serde_json::json;
// self
use track_card::{
	_preludet::*,
	store::{CredentialStore, RestStore, StoreError},
};

fn store(server: &MockServer) -> RestStore {
	RestStore::with_client(
		Url::parse(&server.base_url()).expect("Mock store URL should parse."),
		Some("store-token".into()),
		test_reqwest_client(),
	)
}

#[tokio::test]
async fn set_sends_px_expiry_with_bearer_auth() {
	let server = MockServer::start_async().await;
	let mock = server
		.mock_async(|when, then| {
			when.method(POST)
				.path("/")
				.header("authorization", "Bearer store-token")
				.json_body(json!(["SET", "spotify_token", "payload", "PX", "3600000"]));
			then.status(200).header("content-type", "application/json").body("{\"result\":\"OK\"}");
		})
		.await;

	store(&server)
		.set_with_ttl("spotify_token", "payload".into(), Some(Duration::hours(1)))
		.await
		.expect("SET should succeed.");

	mock.assert_async().await;
}

#[tokio::test]
async fn get_maps_null_to_absent() {
	let server = MockServer::start_async().await;
	let hit = server
		.mock_async(|when, then| {
			when.method(POST).path("/").json_body(json!(["GET", "present"]));
			then.status(200).header("content-type", "application/json").body("{\"result\":\"cached\"}");
		})
		.await;
	let miss = server
		.mock_async(|when, then| {
			when.method(POST).path("/").json_body(json!(["GET", "absent"]));
			then.status(200).header("content-type", "application/json").body("{\"result\":null}");
		})
		.await;
	let store = store(&server);

	assert_eq!(store.get("present").await.expect("GET should succeed.").as_deref(), Some("cached"));
	assert_eq!(store.get("absent").await.expect("GET should succeed."), None);

	hit.assert_async().await;
	miss.assert_async().await;
}

#[tokio::test]
async fn command_errors_surface_as_backend_failures() {
	let server = MockServer::start_async().await;

	server
		.mock_async(|when, then| {
			when.method(POST).path("/");
			then.status(401)
				.header("content-type", "application/json")
				.body("{\"error\":\"WRONGPASS invalid password\"}");
		})
		.await;

	let err = store(&server).get("spotify_token").await.expect_err("Rejected command should fail.");

	assert!(matches!(err, StoreError::Backend { ref message } if message.contains("WRONGPASS")));
}
