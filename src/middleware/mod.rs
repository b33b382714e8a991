//! Middleware layer.
//!
//! A middleware is just another [`Handler`](crate::Handler) that owns the
//! handler it wraps. Layers nest like an onion — the server only ever sees
//! the outermost one:
//!
//! ```text
//! Server::serve(outer)
//!     outer: TimeZoneResolver ── reads cookie, writes context entry
//!         inner: async fn app(req) -> Response
//! ```
//!
//! Each layer decides what to do before and after delegating inward, and may
//! mutate the request's [`Context`](crate::Context) — the per-request store
//! downstream handlers read from. The middleware itself holds no mutable
//! state, so one instance serves any number of concurrent connections.

pub mod time_zone;

pub use time_zone::{CookieDispatch, Dispatch, TimeZoneMap, TimeZoneResolver};
