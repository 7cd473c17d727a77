//! Route groups: path prefixes, middleware chains, registration hooks.
//!
//! A [`Group`] is a named scope of route registrations. It owns no routes
//! itself; every registration is decorated (prefix prepended, middleware
//! chain folded around the handler) and forwarded to the [`Mux`] shared by
//! the whole hierarchy.
//!
//! # Derivation snapshots
//!
//! [`Group::subgroup`] and `Clone` copy the prefix and the middleware
//! sequence *at call time*. Mutating the parent afterwards (another
//! [`wrap`](Group::wrap), a changed prefix through
//! [`to_builder`](Group::to_builder)) never reaches groups derived earlier,
//! only ones derived later. Likewise a registered route keeps the chain it
//! was wrapped with forever; `wrap` affects only future registrations.
//!
//! # Concurrency
//!
//! Registration is a startup-time affair: call `handle`/`wrap`/`subgroup`
//! from one thread before the mux starts serving traffic. Nothing here locks
//! the prefix or the middleware sequence against concurrent mutation. Once
//! traffic begins the groups hold no state a request ever reads; the chain
//! was captured into the stored handler at registration time.

use std::sync::Arc;

use crate::error::RegisterError;
use crate::handler::{BoxedHandler, Handler};
use crate::mux::Mux;

/// The middleware contract: a function from handler to handler.
///
/// A middleware may run logic before, after, or instead of the handler it
/// wraps. By convention the wrapping call itself is side-effect free; work
/// belongs in request handling, not in registration.
pub type Middleware = Arc<dyn Fn(BoxedHandler) -> BoxedHandler + Send + Sync + 'static>;

/// Called once per successful registration, with the pattern exactly as the
/// caller supplied it (before prefixing).
pub type RegisterHook = Arc<dyn Fn(&str) + Send + Sync + 'static>;

/// Called once per failed registration, with the fully-qualified pattern and
/// the failure. Installing one turns a duplicate registration from fatal
/// into an observed event.
pub type RegisterErrorHook = Arc<dyn Fn(&str, &RegisterError) + Send + Sync + 'static>;

/// A scope of route registrations sharing a path prefix and a middleware
/// chain.
///
/// `Clone` produces an independent group carrying a copy of the middleware
/// sequence and the same prefix, while *sharing* the mux and both hooks.
///
/// ```rust
/// use routegroup::{Group, Request, Response};
///
/// async fn list(_req: Request) -> Response { Response::text("users") }
///
/// let root = Group::new();
/// let mut api = root.subgroup("/api");
/// api.wrap(routegroup::middleware::trace);
/// api.handle_fn("GET /users", list); // registers GET /api/users
/// ```
#[derive(Clone)]
pub struct Group {
    mux: Arc<Mux>,
    prefix: String,
    middlewares: Vec<Middleware>,
    on_register: Option<RegisterHook>,
    on_register_error: Option<RegisterErrorHook>,
}

impl Group {
    /// A root group with an empty prefix, no middlewares, no hooks, and a
    /// freshly allocated [`Mux`].
    pub fn new() -> Self {
        Self::builder().build()
    }

    /// Configure a group before building it. Builder methods apply in call
    /// order: mux, prefix, and hooks overwrite; middlewares and
    /// [`sub_prefix`](GroupBuilder::sub_prefix) append.
    pub fn builder() -> GroupBuilder {
        GroupBuilder {
            mux: None,
            prefix: String::new(),
            middlewares: Vec::new(),
            on_register: None,
            on_register_error: None,
        }
    }

    /// A builder pre-seeded with this group's mux, prefix, middleware copy,
    /// and hooks. This is `Clone` with configuration on top:
    ///
    /// ```rust
    /// # use routegroup::Group;
    /// let root = Group::new();
    /// let admin = root.to_builder().sub_prefix("/admin").build();
    /// ```
    pub fn to_builder(&self) -> GroupBuilder {
        GroupBuilder {
            mux: Some(Arc::clone(&self.mux)),
            prefix: self.prefix.clone(),
            middlewares: self.middlewares.clone(),
            on_register: self.on_register.clone(),
            on_register_error: self.on_register_error.clone(),
        }
    }

    /// Derives a child group whose prefix is this group's prefix with
    /// `suffix` appended.
    ///
    /// Concatenation is a pure string append, no separator normalization:
    /// supply the leading slash yourself. The child snapshots the parent's
    /// prefix and middleware sequence at call time and shares its mux and
    /// hooks.
    pub fn subgroup(&self, suffix: &str) -> Self {
        self.to_builder().sub_prefix(suffix).build()
    }

    /// Appends a middleware to this group's chain, in place.
    ///
    /// Visible only to registrations made on this exact group afterwards:
    /// routes already registered keep their chain, groups already derived
    /// keep their copy, and groups derived after this call inherit the
    /// extended chain.
    pub fn wrap<M>(&mut self, middleware: M) -> &mut Self
    where
        M: Fn(BoxedHandler) -> BoxedHandler + Send + Sync + 'static,
    {
        self.middlewares.push(Arc::new(middleware));
        self
    }

    /// Drops every middleware inherited or added so far, leaving future
    /// registrations on this group unwrapped.
    pub fn clear_middlewares(&mut self) -> &mut Self {
        self.middlewares.clear();
        self
    }

    /// Registers `handler` under `pattern` on the shared mux.
    ///
    /// The handler is wrapped by the middleware chain in insertion order,
    /// first-added innermost and last-added outermost, then registered under
    /// the fully-qualified pattern: for a pattern `"METHOD /path"` and a
    /// group prefix `/p`, that is `"METHOD /p/path"`.
    ///
    /// On success the registration hook (if any) observes the pattern as
    /// supplied here. On failure the error hook (if any) observes the
    /// fully-qualified pattern and the [`RegisterError`], and the call
    /// returns normally; the earlier registration for that pattern stays
    /// active.
    ///
    /// # Panics
    ///
    /// Panics on a failed registration when no error hook is installed,
    /// matching the mux's own view that a duplicate route at startup is
    /// fatal.
    pub fn handle(&self, pattern: &str, handler: BoxedHandler) {
        let mut wrapped = handler;
        for middleware in &self.middlewares {
            wrapped = middleware(wrapped);
        }

        let qualified = self.qualify(pattern);
        match self.mux.register(&qualified, wrapped) {
            Ok(()) => {
                if let Some(hook) = &self.on_register {
                    hook(pattern);
                }
            }
            Err(err) => match &self.on_register_error {
                Some(hook) => hook(&qualified, &err),
                None => panic!("route registration failed: {err}"),
            },
        }
    }

    /// Convenience over [`handle`](Group::handle) for plain `async fn`
    /// handlers.
    pub fn handle_fn(&self, pattern: &str, handler: impl Handler) {
        self.handle(pattern, handler.into_boxed_handler());
    }

    /// The multiplexer shared by this group's whole hierarchy. Hand it to
    /// [`Server::serve`](crate::Server::serve) or call
    /// [`dispatch`](Mux::dispatch) on it directly in tests.
    pub fn mux(&self) -> Arc<Mux> {
        Arc::clone(&self.mux)
    }

    /// The effective prefix prepended to every pattern registered here.
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Prepends the prefix, keeping an optional leading `"METHOD "` token in
    /// front: the pattern splits on its first space and reassembles as
    /// `METHOD prefix+path`.
    fn qualify(&self, pattern: &str) -> String {
        if self.prefix.is_empty() {
            return pattern.to_owned();
        }
        match pattern.split_once(' ') {
            None => format!("{}{}", self.prefix, pattern),
            Some((method, path)) => format!("{} {}{}", method, self.prefix, path),
        }
    }
}

impl Default for Group {
    fn default() -> Self {
        Self::new()
    }
}

/// Configures a [`Group`] under construction.
///
/// Obtained from [`Group::builder`] (zeroed) or [`Group::to_builder`]
/// (seeded from an existing group). [`build`](GroupBuilder::build) allocates
/// a default [`Mux`] if none was supplied.
pub struct GroupBuilder {
    mux: Option<Arc<Mux>>,
    prefix: String,
    middlewares: Vec<Middleware>,
    on_register: Option<RegisterHook>,
    on_register_error: Option<RegisterErrorHook>,
}

impl GroupBuilder {
    /// Sets the multiplexer registrations are forwarded to.
    pub fn mux(mut self, mux: Arc<Mux>) -> Self {
        self.mux = Some(mux);
        self
    }

    /// Sets the prefix from the root, replacing whatever was there.
    pub fn prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    /// Appends `suffix` to the current prefix. Pure string append; the
    /// caller supplies any separating slash.
    pub fn sub_prefix(mut self, suffix: &str) -> Self {
        self.prefix.push_str(suffix);
        self
    }

    /// Appends a middleware to the chain.
    pub fn middleware<M>(mut self, middleware: M) -> Self
    where
        M: Fn(BoxedHandler) -> BoxedHandler + Send + Sync + 'static,
    {
        self.middlewares.push(Arc::new(middleware));
        self
    }

    /// Sets the hook observing each successful registration.
    pub fn on_register<F>(mut self, hook: F) -> Self
    where
        F: Fn(&str) + Send + Sync + 'static,
    {
        self.on_register = Some(Arc::new(hook));
        self
    }

    /// Sets the hook observing each failed registration. While installed,
    /// a duplicate registration is reported here instead of panicking.
    pub fn on_register_error<F>(mut self, hook: F) -> Self
    where
        F: Fn(&str, &RegisterError) + Send + Sync + 'static,
    {
        self.on_register_error = Some(Arc::new(hook));
        self
    }

    pub fn build(self) -> Group {
        Group {
            mux: self.mux.unwrap_or_default(),
            prefix: self.prefix,
            middlewares: self.middlewares,
            on_register: self.on_register,
            on_register_error: self.on_register_error,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use http::{Method, StatusCode};

    use super::*;
    use crate::handler::handler_fn;
    use crate::request::Request;
    use crate::response::Response;

    type Log = Arc<Mutex<Vec<String>>>;

    async fn index(_req: Request) -> Response {
        Response::text("index")
    }

    /// Middleware that records its pre/post execution in `log`.
    fn tag(label: &'static str, log: Log) -> impl Fn(BoxedHandler) -> BoxedHandler {
        move |next: BoxedHandler| {
            let log = Arc::clone(&log);
            handler_fn(move |req: Request| {
                let next = Arc::clone(&next);
                let log = Arc::clone(&log);
                async move {
                    log.lock().unwrap().push(format!("{label}:pre"));
                    let res = next.call(req).await;
                    log.lock().unwrap().push(format!("{label}:post"));
                    res
                }
            })
        }
    }

    fn log() -> Log {
        Arc::new(Mutex::new(Vec::new()))
    }

    fn entries(log: &Log) -> Vec<String> {
        log.lock().unwrap().clone()
    }

    #[tokio::test]
    async fn nested_prefixes_concatenate_root_to_leaf() {
        let root = Group::new();
        let sub = root.subgroup("/group");
        let leaf = sub.subgroup("/{id}");
        assert_eq!(leaf.prefix(), "/group/{id}");

        leaf.handle_fn("GET /x", |req: Request| async move {
            Response::text(format!("id={}", req.param("id").unwrap_or("")))
        });

        let res = root.mux().dispatch(Request::new(Method::GET, "/group/7/x")).await;
        assert_eq!(res.status_code(), StatusCode::OK);
        assert_eq!(res.body(), b"id=7");
    }

    #[tokio::test]
    async fn methodless_pattern_gets_prefix_too() {
        let root = Group::new();
        let sub = root.subgroup("/api");
        sub.handle_fn("/ping", index);

        let res = root.mux().dispatch(Request::new(Method::POST, "/api/ping")).await;
        assert_eq!(res.status_code(), StatusCode::OK);
    }

    #[tokio::test]
    async fn hierarchy_shares_one_mux() {
        let root = Group::new();
        let sub = root.subgroup("/sub");
        assert!(Arc::ptr_eq(&root.mux(), &sub.mux()));

        sub.handle_fn("GET /x", index);
        let res = root.mux().dispatch(Request::new(Method::GET, "/sub/x")).await;
        assert_eq!(res.status_code(), StatusCode::OK);
    }

    #[tokio::test]
    async fn last_added_middleware_runs_outermost() {
        let log = log();
        let mut g = Group::new();
        g.wrap(tag("A", Arc::clone(&log))).wrap(tag("B", Arc::clone(&log)));
        g.handle_fn("GET /x", index);

        g.mux().dispatch(Request::new(Method::GET, "/x")).await;
        assert_eq!(entries(&log), ["B:pre", "A:pre", "A:post", "B:post"]);
    }

    #[tokio::test]
    async fn wrap_affects_only_future_registrations() {
        let log = log();
        let mut g = Group::new();
        g.handle_fn("GET /early", index);
        g.wrap(tag("A", Arc::clone(&log)));
        g.handle_fn("GET /late", index);

        let mux = g.mux();
        mux.dispatch(Request::new(Method::GET, "/early")).await;
        assert!(entries(&log).is_empty());

        mux.dispatch(Request::new(Method::GET, "/late")).await;
        assert_eq!(entries(&log), ["A:pre", "A:post"]);
    }

    #[tokio::test]
    async fn wrap_does_not_reach_already_derived_subgroups() {
        let log = log();
        let mut root = Group::new();
        let earlier = root.subgroup("/earlier");
        root.wrap(tag("A", Arc::clone(&log)));
        let later = root.subgroup("/later");

        earlier.handle_fn("GET /x", index);
        later.handle_fn("GET /x", index);

        let mux = root.mux();
        mux.dispatch(Request::new(Method::GET, "/earlier/x")).await;
        assert!(entries(&log).is_empty());

        mux.dispatch(Request::new(Method::GET, "/later/x")).await;
        assert_eq!(entries(&log), ["A:pre", "A:post"]);
    }

    #[tokio::test]
    async fn clone_copies_state_but_mutates_independently() {
        let log = log();
        let mut root = Group::builder().prefix("/v1").build();
        root.wrap(tag("A", Arc::clone(&log)));

        let mut copy = root.clone();
        assert_eq!(copy.prefix(), root.prefix());

        copy.wrap(tag("B", Arc::clone(&log)));
        root.handle_fn("GET /root", index);
        copy.handle_fn("GET /copy", index);

        let mux = root.mux();
        mux.dispatch(Request::new(Method::GET, "/v1/root")).await;
        assert_eq!(entries(&log), ["A:pre", "A:post"]);

        log.lock().unwrap().clear();
        mux.dispatch(Request::new(Method::GET, "/v1/copy")).await;
        assert_eq!(entries(&log), ["B:pre", "A:pre", "A:post", "B:post"]);
    }

    #[tokio::test]
    async fn clear_middlewares_resets_the_chain() {
        let log = log();
        let root = Group::builder().middleware(tag("A", Arc::clone(&log))).build();
        let mut sub = root.subgroup("/sub");
        sub.clear_middlewares().wrap(tag("B", Arc::clone(&log)));
        sub.handle_fn("GET /x", index);

        root.mux().dispatch(Request::new(Method::GET, "/sub/x")).await;
        assert_eq!(entries(&log), ["B:pre", "B:post"]);
    }

    #[test]
    fn success_hook_sees_caller_supplied_pattern() {
        let seen = log();
        let g = Group::builder()
            .prefix("/api")
            .on_register({
                let seen = Arc::clone(&seen);
                move |pattern: &str| seen.lock().unwrap().push(pattern.to_owned())
            })
            .build();

        g.handle_fn("GET /x", index);
        assert_eq!(entries(&seen), ["GET /x"]);
    }

    #[tokio::test]
    async fn error_hook_observes_duplicate_and_first_route_survives() {
        let seen = log();
        let g = Group::builder()
            .on_register_error({
                let seen = Arc::clone(&seen);
                move |pattern: &str, err: &RegisterError| {
                    assert!(matches!(err, RegisterError::Duplicate { .. }));
                    seen.lock().unwrap().push(pattern.to_owned());
                }
            })
            .build();

        g.handle_fn("GET /dup", |_req: Request| async { Response::text("first") });
        g.handle_fn("GET /dup", |_req: Request| async { Response::text("second") });
        assert_eq!(entries(&seen), ["GET /dup"]);

        let res = g.mux().dispatch(Request::new(Method::GET, "/dup")).await;
        assert_eq!(res.body(), b"first");
    }

    #[test]
    fn error_hook_observes_fully_qualified_pattern() {
        let seen = log();
        let root = Group::builder()
            .on_register_error({
                let seen = Arc::clone(&seen);
                move |pattern: &str, _err: &RegisterError| {
                    seen.lock().unwrap().push(pattern.to_owned())
                }
            })
            .build();

        let sub = root.subgroup("/api");
        sub.handle_fn("GET /x", index);
        sub.handle_fn("GET /x", index);
        assert_eq!(entries(&seen), ["GET /api/x"]);
    }

    #[test]
    #[should_panic(expected = "already registered")]
    fn duplicate_without_hook_is_fatal() {
        let g = Group::new();
        g.handle_fn("GET /dup", index);
        g.handle_fn("GET /dup", index);
    }

    #[test]
    fn hooks_are_shared_with_subgroups() {
        let seen = log();
        let root = Group::builder()
            .on_register({
                let seen = Arc::clone(&seen);
                move |pattern: &str| seen.lock().unwrap().push(pattern.to_owned())
            })
            .build();

        root.subgroup("/api").handle_fn("GET /x", index);
        assert_eq!(entries(&seen), ["GET /x"]);
    }

    #[test]
    fn builder_prefix_then_sub_prefix_appends() {
        let g = Group::builder().prefix("/v1").sub_prefix("/users").build();
        assert_eq!(g.prefix(), "/v1/users");
    }

    #[test]
    fn later_prefix_option_overrides_earlier() {
        let g = Group::builder().prefix("/v1").prefix("/v2").build();
        assert_eq!(g.prefix(), "/v2");
    }

    #[test]
    fn to_builder_prefix_override_does_not_touch_source() {
        let root = Group::builder().prefix("/v1").build();
        let moved = root.to_builder().prefix("/v2").build();
        assert_eq!(root.prefix(), "/v1");
        assert_eq!(moved.prefix(), "/v2");
    }
}
