//! Handler and middleware composition.
//!
//! A [`Handler`] turns a [`Request`] into a [`Response`]. A [`Middleware`]
//! receives the handler for "the rest of the pipeline" and returns a new
//! handler wrapping it. [`compose`] nests a list of middleware around a
//! terminal handler once, at startup:
//!
//! ```text
//! compose([A, B], T)  ==  A(B(T))
//!
//! request  → A.before → B.before → T
//! response ← A.after  ← B.after  ← T
//! ```
//!
//! A middleware that does not forward to `next` short-circuits everything
//! behind it, including the terminal handler.

use std::fmt;
use std::sync::Arc;

use crate::http::{Request, Response};

/// Anything that can answer a request.
///
/// Implemented for every `Fn(Request) -> Response` closure. Handlers are
/// invoked concurrently from many threads and must not assume exclusive
/// access to shared state.
pub trait Handler: Send + Sync + 'static {
    fn call(&self, req: Request) -> Response;
}

impl<F> Handler for F
where
    F: Fn(Request) -> Response + Send + Sync + 'static,
{
    fn call(&self, req: Request) -> Response {
        self(req)
    }
}

/// Shared, type-erased handler.
pub type BoxHandler = Arc<dyn Handler>;

/// Wrap a handler for use in a pipeline.
pub fn handler<H: Handler>(h: H) -> BoxHandler {
    Arc::new(h)
}

/// Wraps the rest of the pipeline.
///
/// Implemented for every `Fn(BoxHandler) -> BoxHandler` closure. Use
/// [`from_fn`] for the common "before, call next, after" shape.
pub trait Middleware: Send + Sync + 'static {
    fn wrap(&self, next: BoxHandler) -> BoxHandler;
}

impl<F> Middleware for F
where
    F: Fn(BoxHandler) -> BoxHandler + Send + Sync + 'static,
{
    fn wrap(&self, next: BoxHandler) -> BoxHandler {
        self(next)
    }
}

/// Nest `middleware` around `terminal`; the first element is outermost.
pub fn compose(middleware: &[Arc<dyn Middleware>], terminal: BoxHandler) -> BoxHandler {
    middleware
        .iter()
        .rev()
        .fold(terminal, |next, m| m.wrap(next))
}

/// The remainder of the pipeline, as seen from inside a [`from_fn`] middleware.
#[derive(Clone)]
pub struct Next {
    inner: BoxHandler,
}

impl Next {
    pub fn new(inner: BoxHandler) -> Self {
        Self { inner }
    }

    /// Forward the request downstream and return its response.
    pub fn run(&self, req: Request) -> Response {
        self.inner.call(req)
    }
}

impl fmt::Debug for Next {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Next").finish_non_exhaustive()
    }
}

/// Middleware built from a `Fn(Request, &Next) -> Response` function.
pub struct FromFn<F> {
    f: Arc<F>,
}

/// Build middleware from a function that may run logic before and after
/// calling [`Next::run`], or return early without calling it.
pub fn from_fn<F>(f: F) -> FromFn<F>
where
    F: Fn(Request, &Next) -> Response + Send + Sync + 'static,
{
    FromFn { f: Arc::new(f) }
}

impl<F> Middleware for FromFn<F>
where
    F: Fn(Request, &Next) -> Response + Send + Sync + 'static,
{
    fn wrap(&self, next: BoxHandler) -> BoxHandler {
        let f = Arc::clone(&self.f);
        let next = Next::new(next);
        Arc::new(move |req: Request| (*f)(req, &next))
    }
}

/// Ordered middleware list, composed around a terminal handler on `build`.
#[derive(Clone, Default)]
pub struct Pipeline {
    middleware: Vec<Arc<dyn Middleware>>,
}

impl Pipeline {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append middleware; it runs after everything added before it.
    pub fn layer<M: Middleware>(mut self, middleware: M) -> Self {
        self.middleware.push(Arc::new(middleware));
        self
    }

    pub fn push(&mut self, middleware: Arc<dyn Middleware>) {
        self.middleware.push(middleware);
    }

    pub fn len(&self) -> usize {
        self.middleware.len()
    }

    pub fn is_empty(&self) -> bool {
        self.middleware.is_empty()
    }

    pub fn build(&self, terminal: BoxHandler) -> BoxHandler {
        compose(&self.middleware, terminal)
    }
}

impl fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pipeline")
            .field("len", &self.middleware.len())
            .finish()
    }
}
