//! Look up catalog tracks through a cached client-credentials token broker and compose
//! shareable 1080×1920 promotional cards from the returned metadata.

#![deny(clippy::all, missing_docs, unused_crate_dependencies)]

pub mod api;
pub mod auth;
pub mod broker;
pub mod catalog;
pub mod config;
pub mod error;
pub mod http;
pub mod oauth;
pub mod obs;
pub mod provider;
pub mod render;
pub mod resolve;
pub mod store;
#[cfg(any(test, feature = "test"))]
pub mod _preludet {
	//! Convenience re-exports and helpers for integration tests; enabled via `cfg(test)` or the
	//! `test` crate feature.

	pub use crate::_prelude::*;

	// std
	use std::io::Cursor;
	// crates.io
	use image::{DynamicImage, ImageFormat, Rgba, RgbaImage};
	// self
	use crate::{
		broker::TokenBroker,
		http::ReqwestHttpClient,
		provider::CatalogDescriptor,
		render::Typeface,
		store::{CredentialStore, MemoryStore},
	};

	/// Monospaced stand-in face: every character advances `advance_em * px` and non-blank
	/// characters rasterize as solid blocks sitting on the baseline.
	#[derive(Clone, Copy, Debug)]
	pub struct BlockFace {
		/// Advance per character, relative to the pixel size.
		pub advance_em: f32,
	}
	impl Default for BlockFace {
		fn default() -> Self {
			Self { advance_em: 0.5 }
		}
	}
	impl Typeface for BlockFace {
		fn measure(&self, text: &str, px: f32) -> f32 {
			text.chars().count() as f32 * self.advance_em * px
		}

		fn rasterize(
			&self,
			text: &str,
			px: f32,
			origin: (f32, f32),
			plot: &mut dyn FnMut(i32, i32, f32),
		) {
			let advance = self.advance_em * px;

			for (index, ch) in text.chars().enumerate() {
				if ch.is_whitespace() {
					continue;
				}

				let left = (origin.0 + index as f32 * advance) as i32;
				let top = (origin.1 - px * 0.7) as i32;

				for y in top..origin.1 as i32 {
					for x in left + 1..left + advance as i32 - 1 {
						plot(x, y, 1.);
					}
				}
			}
		}
	}

	/// Encodes a solid `width`×`height` PNG.
	pub fn solid_png(width: u32, height: u32, rgba: [u8; 4]) -> Vec<u8> {
		let mut out = Cursor::new(Vec::new());

		DynamicImage::ImageRgba8(RgbaImage::from_pixel(width, height, Rgba(rgba)))
			.write_to(&mut out, ImageFormat::Png)
			.expect("Fixture image should encode.");

		out.into_inner()
	}

	/// Encodes a `width`×`height` PNG with a fixed red channel and green/blue ramps, which gives
	/// palette extraction more than one color to work with.
	pub fn ramp_png(width: u32, height: u32, red: u8) -> Vec<u8> {
		let mut out = Cursor::new(Vec::new());
		let image = RgbaImage::from_fn(width, height, |x, y| {
			Rgba([red, (x * 255 / width.max(1)) as u8, (y * 255 / height.max(1)) as u8, 255])
		});

		DynamicImage::ImageRgba8(image)
			.write_to(&mut out, ImageFormat::Png)
			.expect("Fixture image should encode.");

		out.into_inner()
	}

	/// Builds a reqwest HTTP client that accepts the self-signed certificates produced by
	/// `httpmock` during tests.
	pub fn test_reqwest_client() -> ReqwestClient {
		ReqwestClient::builder()
			.danger_accept_invalid_certs(true)
			.danger_accept_invalid_hostnames(true)
			.build()
			.expect("Failed to build insecure Reqwest client for tests.")
	}

	/// Builds a descriptor whose token endpoint and catalog base both live on `base`.
	pub fn test_descriptor(base: &str) -> CatalogDescriptor {
		let base = base.trim_end_matches('/');

		CatalogDescriptor::builder()
			.token_endpoint(
				Url::parse(&format!("{base}/api/token"))
					.expect("Mock token endpoint should parse successfully."),
			)
			.api_base(
				Url::parse(&format!("{base}/v1"))
					.expect("Mock catalog base should parse successfully."),
			)
			.build()
			.expect("Mock catalog descriptor should build successfully.")
	}

	/// Constructs a [`TokenBroker`] backed by an in-memory store and the reqwest transport used
	/// across integration tests.
	pub fn build_test_broker(
		descriptor: CatalogDescriptor,
		client_id: &str,
		client_secret: &str,
	) -> (TokenBroker, Arc<MemoryStore>) {
		let store_backend = Arc::new(MemoryStore::default());
		let store: Arc<dyn CredentialStore> = store_backend.clone();
		let broker = TokenBroker::with_http_client(
			store,
			descriptor,
			ReqwestHttpClient::with_client(test_reqwest_client()),
		)
		.with_client_credentials(client_id, client_secret);

		(broker, store_backend)
	}
}

mod _prelude {
	pub use std::{
		collections::HashMap,
		error::Error as StdError,
		fmt::{Debug, Display, Formatter, Result as FmtResult},
		future::Future,
		pin::Pin,
		str::FromStr,
		sync::Arc,
	};

	pub use parking_lot::{Mutex, RwLock};
	pub use reqwest::{Client as ReqwestClient, Error as ReqwestError};
	pub use serde::{Deserialize, Serialize};
	pub use thiserror::Error as ThisError;
	pub use time::{Duration, OffsetDateTime};
	pub use url::Url;

	pub use crate::error::{Error, Result};
}

pub use reqwest;
pub use url;
#[cfg(test)] use {color_eyre as _, httpmock as _, tokio as _};
#[cfg(feature = "cli")] use {clap as _, color_eyre as _, tokio as _, tracing_subscriber as _};
