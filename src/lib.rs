//! # zonal
//!
//! Cookie-driven time-zone resolution middleware for hyper services.
//! Nothing more. Nothing less.
//!
//! ## The contract
//!
//! A browser stores the visitor's canonical time-zone identifier in a cookie.
//! Your handlers want the human-readable display name, not the identifier.
//! zonal sits between the two: per request it reads one cookie, resolves the
//! identifier through a configurable mapping, writes the display name into
//! the request context, and gets out of the way.
//!
//! What zonal intentionally ignores:
//!
//! - **Routing** — put a router inside your handler or in front of zonal
//! - **Session management** — one cookie read, nothing stored
//! - **Cookie-jar semantics** — a minimal `Cookie:` header split, no
//!   decoding, no attributes
//!
//! What's left:
//!
//! - [`middleware::TimeZoneResolver`] — resolve + inject, every option
//!   overridable, the whole dispatch sequence replaceable
//! - A small serving surface — [`Request`] with a per-request [`Context`],
//!   [`Response`], [`Server`] with graceful shutdown on tokio + hyper
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use zonal::middleware::{TimeZoneMap, TimeZoneResolver};
//! use zonal::{Request, Response, Server};
//!
//! #[tokio::main]
//! async fn main() {
//!     let app = TimeZoneResolver::builder()
//!         .map(TimeZoneMap::from_pairs([
//!             ("Moscow", "Europe/Moscow"),
//!             ("Paris", "Europe/Paris"),
//!         ]))
//!         .wrap(hello);
//!
//!     Server::bind("0.0.0.0:3000").serve(app).await.unwrap();
//! }
//!
//! async fn hello(req: Request) -> Response {
//!     let tz = req.context().get("dummy.time_zone").unwrap_or("unknown");
//!     Response::text(format!("your time zone: {tz}"))
//! }
//! ```
//!
//! With the default `locale` feature enabled the resolver falls back to a
//! bundled display-name table when no map is configured; disable the feature
//! and it falls back to an empty map with a diagnostic warning instead.

mod context;
mod error;
mod handler;
mod request;
mod response;
mod server;

#[cfg(feature = "locale")]
pub mod locale;
pub mod middleware;

pub use context::Context;
pub use error::Error;
pub use handler::{BoxFuture, Handler};
pub use http::StatusCode;
pub use request::Request;
pub use response::{IntoResponse, Response};
pub use server::Server;
