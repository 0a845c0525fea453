//! Demonstrates the gateway recovering from an expired access token against a mock backend.
//!
//! 1. Log in and keep the returned credential in a [`MemoryCredentialStore`].
//! 2. Fire three calls at once after the backend expires the token.
//! 3. Watch one refresh call serve all three and each call replay with the new token.
//! 4. Hit an admin-only endpoint and get a plain 403 back while staying signed in.

// std
use std::sync::Arc;
// crates.io
use color_eyre::Result;
use httpmock::prelude::*;
// self
use marketplace_gateway::{
	config::GatewayConfig,
	error::FailureKind,
	gateway::{LoginRequest, ReqwestGateway},
	http::ReqwestTransport,
	notify::FnNotifier,
	reqwest::Client,
	request::RequestDescriptor,
	store::MemoryCredentialStore,
};

#[tokio::main]
async fn main() -> Result<()> {
	color_eyre::install()?;

	let server = MockServer::start_async().await;
	let login_mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/auth/login");
			then.status(200).header("content-type", "application/json").body(
				r#"{"accessToken":"demo-t1","user":{"id":42,"name":"Demo","role":"vendor"}}"#,
			);
		})
		.await;
	let expired_mock = server
		.mock_async(|when, then| {
			when.method(GET).header("authorization", "Bearer demo-t1");
			then.status(401).body(r#"{"message":"jwt expired"}"#);
		})
		.await;
	let refresh_mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/auth/refresh");
			then.status(200)
				.header("content-type", "application/json")
				.body(r#"{"accessToken":"demo-t2"}"#);
		})
		.await;
	let admin_mock = server
		.mock_async(|when, then| {
			when.method(GET).path("/admin/payouts").header("authorization", "Bearer demo-t2");
			then.status(403).body(r#"{"message":"admin role required"}"#);
		})
		.await;
	let data_mock = server
		.mock_async(|when, then| {
			when.method(GET).header("authorization", "Bearer demo-t2");
			then.status(200).header("content-type", "application/json").body(r#"{"items":[]}"#);
		})
		.await;
	let config = GatewayConfig::from_base_url(&server.base_url())?;
	// The mock server's certificate is self-signed; production code uses `ReqwestGateway::new`.
	let transport = ReqwestTransport::with_client(
		Client::builder()
			.cookie_store(true)
			.danger_accept_invalid_certs(true)
			.danger_accept_invalid_hostnames(true)
			.build()?,
		config.base_url().clone(),
	);
	let gateway = ReqwestGateway::with_transport(
		config,
		Arc::new(MemoryCredentialStore::default()),
		transport,
	)
	.with_notifier(Arc::new(FnNotifier::new(|| println!("Session expired; sign in again."))));
	let credential = gateway.login(&LoginRequest::new("vendor@example.com", "demo")).await?;

	println!("Signed in as {:?}.", credential.identity);

	let (orders, products, reviews) = tokio::join!(
		gateway.call(RequestDescriptor::get("/vendor/orders")),
		gateway.call(RequestDescriptor::get("/vendor/products")),
		gateway.call(RequestDescriptor::get("/vendor/reviews")),
	);

	for response in [orders?, products?, reviews?] {
		println!("Replayed call returned {}: {}.", response.status, response.text());
	}

	expired_mock.assert_calls_async(3).await;
	refresh_mock.assert_calls_async(1).await;
	data_mock.assert_calls_async(3).await;
	data_mock.delete_async().await;

	let stats = gateway.refresh_stats();

	println!("Refresh waves: {}, joined callers: {}.", stats.waves, stats.joined);

	match gateway.call(RequestDescriptor::get("/admin/payouts")).await {
		Err(err) if err.failure_kind() == Some(FailureKind::Forbidden) => println!(
			"Admin endpoint denied ({err}); still signed in: {}.",
			gateway.is_authenticated()
		),
		other => println!("Unexpected admin response: {other:?}."),
	}

	login_mock.assert_async().await;
	admin_mock.assert_async().await;

	Ok(())
}
