//! Cookie-driven time-zone resolution.
//!
//! [`TimeZoneResolver`] wraps a downstream handler. On every request it reads
//! one cookie carrying a canonical IANA identifier (falling back to a
//! configured default when the cookie is absent), resolves the identifier to
//! a human-readable display name through a [`TimeZoneMap`], writes the name
//! into the request [`Context`](crate::Context), and delegates inward. The
//! downstream response passes through untouched.
//!
//! Resolution is total: an unknown identifier, an empty map, or a producer
//! that blows up all degrade to the configured default display name. Nothing
//! on this path ever reaches the client as an error.
//!
//! ```rust
//! use zonal::middleware::{TimeZoneMap, TimeZoneResolver};
//! use zonal::{Request, Response};
//!
//! async fn app(req: Request) -> Response {
//!     let tz = req.context().get("dummy.time_zone").unwrap_or("unknown");
//!     Response::text(format!("hello from {tz}"))
//! }
//!
//! let mw = TimeZoneResolver::builder()
//!     .map(TimeZoneMap::from_pairs([("Moscow", "Europe/Moscow"), ("Paris", "Europe/Paris")]))
//!     .wrap(app);
//!
//! assert_eq!(mw.resolve("Europe/Paris"), "Paris");
//! assert_eq!(mw.resolve("Europe/Stockholm"), "Moscow"); // default display name
//! ```

use std::fmt;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;

use tracing::debug;
#[cfg(not(feature = "locale"))]
use tracing::warn;

use crate::handler::{BoxFuture, BoxedHandler, ErasedHandler, Handler, sealed};
use crate::request::Request;

/// Canonical identifier assumed when the request carries no cookie.
pub const DEFAULT_TIME_ZONE: &str = "Europe/Moscow";

/// Display name substituted when resolution finds no match.
pub const DEFAULT_DISPLAY_NAME: &str = "Moscow";

/// Cookie name read from and context key written to, unless overridden.
pub const DEFAULT_KEY: &str = "dummy.time_zone";

// ── TimeZoneMap ───────────────────────────────────────────────────────────────

/// The mapping source: ordered display-name → canonical-id pairs.
///
/// Two shapes, resolved on **every** access:
///
/// - [`Static`](TimeZoneMap::Static) — a fixed list of pairs. Insertion order
///   is lookup order; when two entries share a canonical id, the first wins.
/// - [`Producer`](TimeZoneMap::Producer) — a zero-argument function invoked
///   per lookup, never cached. This is the hook for maps that vary at
///   runtime, test doubles included.
#[derive(Clone)]
pub enum TimeZoneMap {
    Static(Vec<(String, String)>),
    Producer(Arc<dyn Fn() -> Vec<(String, String)> + Send + Sync>),
}

impl TimeZoneMap {
    /// A static map from `(display name, canonical id)` pairs.
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self::Static(pairs.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }

    /// A map backed by a producer function, re-invoked on every lookup.
    pub fn producer<F>(f: F) -> Self
    where
        F: Fn() -> Vec<(String, String)> + Send + Sync + 'static,
    {
        Self::Producer(Arc::new(f))
    }

    /// A map with no entries. Every lookup over it falls through to the
    /// configured default display name.
    pub fn empty() -> Self {
        Self::Static(Vec::new())
    }

    /// Resolves the source to a concrete pair list.
    ///
    /// A panicking producer yields the empty list — lookup failure must
    /// never escape to the caller, whatever shape it takes.
    pub fn entries(&self) -> Vec<(String, String)> {
        match self {
            Self::Static(pairs) => pairs.clone(),
            Self::Producer(f) => {
                let f = Arc::clone(f);
                match catch_unwind(AssertUnwindSafe(move || f())) {
                    Ok(pairs) => pairs,
                    Err(_) => {
                        debug!("time-zone map producer panicked, treating map as empty");
                        Vec::new()
                    }
                }
            }
        }
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for TimeZoneMap {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self::from_pairs(iter)
    }
}

impl fmt::Debug for TimeZoneMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Static(pairs) => f.debug_tuple("Static").field(&pairs.len()).finish(),
            Self::Producer(_) => f.debug_tuple("Producer").finish(),
        }
    }
}

// ── Dispatch strategy ─────────────────────────────────────────────────────────

/// The per-request strategy a [`TimeZoneResolver`] runs.
///
/// The default, [`CookieDispatch`], performs the full
/// cookie-read / resolve / inject / delegate sequence. Supplying your own via
/// [`Builder::dispatch`] replaces that sequence entirely — the strategy
/// receives the resolver (for its options, [`resolve`](TimeZoneResolver::resolve)
/// and [`delegate`](TimeZoneResolver::delegate)) and owns the request from
/// there.
///
/// Implemented for any `Fn(&TimeZoneResolver, Request) -> BoxFuture`:
///
/// ```rust
/// use zonal::middleware::TimeZoneResolver;
/// use zonal::{BoxFuture, Request, Response};
///
/// async fn app(_req: Request) -> Response { Response::text("ok") }
///
/// let mw = TimeZoneResolver::builder()
///     .dispatch(|mw: &TimeZoneResolver, mut req: Request| -> BoxFuture {
///         let tz = req.cookie("tz").unwrap_or("Etc/UTC").to_owned();
///         let name = mw.resolve(&tz);
///         req.context_mut().insert("tz.name", name);
///         mw.delegate(req)
///     })
///     .wrap(app);
/// ```
pub trait Dispatch: Send + Sync + 'static {
    fn call(&self, mw: &TimeZoneResolver, req: Request) -> BoxFuture;
}

impl<F> Dispatch for F
where
    F: Fn(&TimeZoneResolver, Request) -> BoxFuture + Send + Sync + 'static,
{
    fn call(&self, mw: &TimeZoneResolver, req: Request) -> BoxFuture {
        self(mw, req)
    }
}

/// The default dispatch: cookie-read, resolve, inject, delegate.
pub struct CookieDispatch;

impl Dispatch for CookieDispatch {
    fn call(&self, mw: &TimeZoneResolver, mut req: Request) -> BoxFuture {
        let canonical = match req.cookie(mw.cookie_key()) {
            Some(v) => v.to_owned(),
            None => mw.default_tz().to_owned(),
        };
        let display = mw.resolve(&canonical);
        req.context_mut().insert(mw.context_key(), display);
        mw.delegate(req)
    }
}

// ── TimeZoneResolver ──────────────────────────────────────────────────────────

#[derive(Clone, Debug)]
struct Options {
    default_tz: String,
    default_display: String,
    cookie_key: String,
    context_key: String,
}

/// Middleware that resolves a time-zone cookie to a display name and injects
/// it into the request context.
///
/// Construct via [`wrap`](TimeZoneResolver::wrap) (all defaults) or
/// [`builder`](TimeZoneResolver::builder). The instance is immutable after
/// construction; all per-request mutation lands on the caller-owned
/// [`Request`], so one resolver safely serves concurrent requests.
pub struct TimeZoneResolver {
    inner: BoxedHandler,
    options: Options,
    map: TimeZoneMap,
    dispatch: Arc<dyn Dispatch>,
}

impl TimeZoneResolver {
    /// Wraps `inner` with every option at its default.
    pub fn wrap(inner: impl Handler) -> Self {
        Self::builder().wrap(inner)
    }

    pub fn builder() -> Builder {
        Builder::new()
    }

    /// Resolves a canonical identifier (e.g. `"Europe/Paris"`) to its display
    /// name (e.g. `"Paris"`).
    ///
    /// Searches the mapping in order and returns the first entry whose
    /// canonical id equals `canonical`. No match — or any failure producing
    /// the mapping — returns the configured default display name. This
    /// method never panics and never errors.
    pub fn resolve(&self, canonical: &str) -> String {
        self.map
            .entries()
            .into_iter()
            .find(|(_, id)| id.as_str() == canonical)
            .map(|(name, _)| name)
            .unwrap_or_else(|| self.options.default_display.clone())
    }

    /// Runs the configured dispatch for one request — what the server does
    /// when this resolver is the serving handler.
    pub fn handle(&self, req: Request) -> BoxFuture {
        self.dispatch.call(self, req)
    }

    /// Invokes the wrapped downstream handler. Custom [`Dispatch`]
    /// implementations call this once they are done with the request.
    pub fn delegate(&self, req: Request) -> BoxFuture {
        self.inner.call(req)
    }

    /// Canonical identifier used when the cookie is absent.
    pub fn default_tz(&self) -> &str {
        &self.options.default_tz
    }

    /// Display name substituted on resolution failure.
    pub fn default_display(&self) -> &str {
        &self.options.default_display
    }

    /// Name of the cookie read from the request.
    pub fn cookie_key(&self) -> &str {
        &self.options.cookie_key
    }

    /// Context key the resolved display name is written under.
    pub fn context_key(&self) -> &str {
        &self.options.context_key
    }

    pub fn map(&self) -> &TimeZoneMap {
        &self.map
    }
}

impl ErasedHandler for TimeZoneResolver {
    fn call(&self, req: Request) -> BoxFuture {
        self.handle(req)
    }
}

impl sealed::Sealed for TimeZoneResolver {}

impl Handler for TimeZoneResolver {
    fn into_boxed_handler(self) -> BoxedHandler {
        Arc::new(self)
    }
}

// ── Builder ───────────────────────────────────────────────────────────────────

/// Fluent builder for [`TimeZoneResolver`]. Every option is independently
/// overridable; [`wrap`](Builder::wrap) terminates the chain.
pub struct Builder {
    options: Options,
    map: Option<TimeZoneMap>,
    dispatch: Arc<dyn Dispatch>,
}

impl Builder {
    fn new() -> Self {
        Self {
            options: Options {
                default_tz: DEFAULT_TIME_ZONE.to_owned(),
                default_display: DEFAULT_DISPLAY_NAME.to_owned(),
                cookie_key: DEFAULT_KEY.to_owned(),
                context_key: DEFAULT_KEY.to_owned(),
            },
            map: None,
            dispatch: Arc::new(CookieDispatch),
        }
    }

    /// Canonical identifier assumed when the request has no cookie.
    pub fn default_tz(mut self, tz: impl Into<String>) -> Self {
        self.options.default_tz = tz.into();
        self
    }

    /// Display name returned when resolution finds no match.
    pub fn default_display(mut self, name: impl Into<String>) -> Self {
        self.options.default_display = name.into();
        self
    }

    /// Cookie name to read. Defaults to [`DEFAULT_KEY`].
    pub fn cookie_key(mut self, key: impl Into<String>) -> Self {
        self.options.cookie_key = key.into();
        self
    }

    /// Context key to write. Defaults to [`DEFAULT_KEY`].
    pub fn context_key(mut self, key: impl Into<String>) -> Self {
        self.options.context_key = key.into();
        self
    }

    /// Sets the cookie name and the context key to the same value.
    pub fn key(self, key: impl Into<String>) -> Self {
        let key = key.into();
        self.cookie_key(key.clone()).context_key(key)
    }

    /// Supplies the mapping source. Without this, the bundled
    /// [`locale`](crate::locale) table is used (feature `locale`), or an
    /// empty map with a one-time diagnostic warning when the feature is off.
    pub fn map(mut self, map: TimeZoneMap) -> Self {
        self.map = Some(map);
        self
    }

    /// Replaces the entire default request-handling sequence.
    pub fn dispatch(mut self, dispatch: impl Dispatch) -> Self {
        self.dispatch = Arc::new(dispatch);
        self
    }

    /// Builds the resolver around the downstream handler.
    pub fn wrap(self, inner: impl Handler) -> TimeZoneResolver {
        let map = self.map.unwrap_or_else(default_map);
        TimeZoneResolver {
            inner: inner.into_boxed_handler(),
            options: self.options,
            map,
            dispatch: self.dispatch,
        }
    }
}

#[cfg(feature = "locale")]
fn default_map() -> TimeZoneMap {
    crate::locale::mapping()
}

#[cfg(not(feature = "locale"))]
fn default_map() -> TimeZoneMap {
    warn!(
        "no time-zone map configured and the `locale` feature is disabled; \
         falling back to an empty map — supply a map shaped \
         display-name => canonical-id, e.g. {{\"Moscow\" => \"Europe/Moscow\"}}"
    );
    TimeZoneMap::empty()
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use http::StatusCode;

    use super::*;
    use crate::response::Response;

    /// Terminal handler echoing one context entry as the response body.
    fn echo_handler(key: &'static str) -> impl Handler {
        move |req: Request| {
            let value = req.context().get(key).unwrap_or("<unset>").to_owned();
            async move { Response::text(value) }
        }
    }

    fn sample_map() -> TimeZoneMap {
        TimeZoneMap::from_pairs([("Moscow", "Europe/Moscow"), ("Paris", "Europe/Paris")])
    }

    async fn body_for(mw: &TimeZoneResolver, req: Request) -> String {
        let resp = mw.handle(req).await;
        String::from_utf8(resp.body_bytes().to_vec()).unwrap()
    }

    #[test]
    fn resolve_returns_paired_display_name() {
        let mw = TimeZoneResolver::builder().map(sample_map()).wrap(echo_handler(DEFAULT_KEY));
        assert_eq!(mw.resolve("Europe/Moscow"), "Moscow");
        assert_eq!(mw.resolve("Europe/Paris"), "Paris");
    }

    #[test]
    fn resolve_missing_returns_default_display() {
        let mw = TimeZoneResolver::builder().map(sample_map()).wrap(echo_handler(DEFAULT_KEY));
        assert_eq!(mw.resolve("Europe/Stockholm"), "Moscow");
    }

    #[test]
    fn resolve_missing_honours_configured_default() {
        let mw = TimeZoneResolver::builder()
            .map(sample_map())
            .default_display("Elsewhere")
            .wrap(echo_handler(DEFAULT_KEY));
        assert_eq!(mw.resolve("Europe/Stockholm"), "Elsewhere");
    }

    #[test]
    fn resolve_empty_map_returns_default_display() {
        let mw = TimeZoneResolver::builder()
            .map(TimeZoneMap::empty())
            .wrap(echo_handler(DEFAULT_KEY));
        assert_eq!(mw.resolve("Europe/Moscow"), "Moscow");
    }

    #[test]
    fn resolve_first_match_wins_in_map_order() {
        let mw = TimeZoneResolver::builder()
            .map(TimeZoneMap::from_pairs([
                ("Canberra", "Australia/Melbourne"),
                ("Melbourne", "Australia/Melbourne"),
            ]))
            .wrap(echo_handler(DEFAULT_KEY));
        assert_eq!(mw.resolve("Australia/Melbourne"), "Canberra");
    }

    #[test]
    fn producer_map_is_reinvoked_every_lookup() {
        static CALLS: AtomicUsize = AtomicUsize::new(0);

        let mw = TimeZoneResolver::builder()
            .map(TimeZoneMap::producer(|| {
                CALLS.fetch_add(1, Ordering::SeqCst);
                vec![("Canberra".to_owned(), "Australia/Melbourne".to_owned())]
            }))
            .wrap(echo_handler(DEFAULT_KEY));

        assert_eq!(mw.resolve("Australia/Melbourne"), "Canberra");
        assert_eq!(mw.resolve("Australia/Melbourne"), "Canberra");
        assert_eq!(CALLS.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn panicking_producer_degrades_to_default() {
        let mw = TimeZoneResolver::builder()
            .map(TimeZoneMap::producer(|| panic!("malformed map source")))
            .wrap(echo_handler(DEFAULT_KEY));
        assert_eq!(mw.resolve("Europe/Moscow"), "Moscow");
    }

    #[tokio::test]
    async fn cookie_present_injects_display_name() {
        let mw = TimeZoneResolver::builder().map(sample_map()).wrap(echo_handler(DEFAULT_KEY));
        let req = Request::fake(&[("cookie", "dummy.time_zone=Europe/Paris")]);
        assert_eq!(body_for(&mw, req).await, "Paris");
    }

    #[tokio::test]
    async fn cookie_absent_resolves_default_tz() {
        let mw = TimeZoneResolver::builder()
            .map(sample_map())
            .default_tz("Europe/Paris")
            .default_display("Paris")
            .wrap(echo_handler(DEFAULT_KEY));
        assert_eq!(body_for(&mw, Request::fake(&[])).await, "Paris");
    }

    #[tokio::test]
    async fn unknown_cookie_value_injects_default_display() {
        let mw = TimeZoneResolver::builder().map(sample_map()).wrap(echo_handler(DEFAULT_KEY));
        let req = Request::fake(&[("cookie", "dummy.time_zone=Europe/Stockholm")]);
        assert_eq!(body_for(&mw, req).await, "Moscow");
    }

    #[tokio::test]
    async fn custom_key_relocates_read_and_write() {
        let mw = TimeZoneResolver::builder()
            .map(sample_map())
            .key("some.time_zone")
            .wrap(echo_handler("some.time_zone"));
        let req = Request::fake(&[("cookie", "some.time_zone=Europe/Paris")]);
        assert_eq!(body_for(&mw, req).await, "Paris");

        // The default key is neither read nor written any more.
        let mw = TimeZoneResolver::builder()
            .map(sample_map())
            .key("some.time_zone")
            .wrap(echo_handler(DEFAULT_KEY));
        let req = Request::fake(&[("cookie", "some.time_zone=Europe/Paris")]);
        assert_eq!(body_for(&mw, req).await, "<unset>");
    }

    #[tokio::test]
    async fn independent_cookie_and_context_keys() {
        let mw = TimeZoneResolver::builder()
            .map(sample_map())
            .cookie_key("tz.cookie")
            .context_key("tz.display")
            .wrap(echo_handler("tz.display"));
        let req = Request::fake(&[("cookie", "tz.cookie=Europe/Moscow")]);
        assert_eq!(body_for(&mw, req).await, "Moscow");
    }

    #[tokio::test]
    async fn custom_dispatch_replaces_default_sequence() {
        let mw = TimeZoneResolver::builder()
            .map(sample_map())
            .dispatch(|mw: &TimeZoneResolver, mut req: Request| -> BoxFuture {
                // Ignore the cookie entirely, resolve a fixed identifier.
                let name = mw.resolve("Europe/Moscow");
                req.context_mut().insert(mw.context_key(), name);
                mw.delegate(req)
            })
            .wrap(echo_handler(DEFAULT_KEY));

        // Cookie says Paris; the custom dispatch never reads it.
        let req = Request::fake(&[("cookie", "dummy.time_zone=Europe/Paris")]);
        assert_eq!(body_for(&mw, req).await, "Moscow");
    }

    #[tokio::test]
    async fn downstream_response_passes_through_unchanged() {
        let mw = TimeZoneResolver::builder().map(sample_map()).wrap(|_req: Request| async {
            Response::builder()
                .status(StatusCode::CREATED)
                .header("location", "/zones/1")
                .text("created")
        });

        let resp = mw.handle(Request::fake(&[])).await.into_inner();
        assert_eq!(resp.status(), StatusCode::CREATED);
        assert_eq!(resp.headers().get("location").unwrap(), "/zones/1");
    }

    #[cfg(feature = "locale")]
    #[test]
    fn unconfigured_map_uses_bundled_locale_table() {
        let mw = TimeZoneResolver::wrap(echo_handler(DEFAULT_KEY));
        assert_eq!(mw.resolve("Europe/Copenhagen"), "Copenhagen");
        assert_eq!(mw.resolve("America/Chicago"), "Central Time (US & Canada)");
        assert_eq!(mw.resolve("Australia/Melbourne"), "Canberra");
    }

    #[cfg(not(feature = "locale"))]
    #[test]
    fn unconfigured_map_falls_back_to_empty() {
        let mw = TimeZoneResolver::wrap(echo_handler(DEFAULT_KEY));
        assert_eq!(mw.resolve("Europe/Moscow"), "Moscow");
        assert_eq!(mw.resolve("Europe/Paris"), "Moscow");
    }
}
