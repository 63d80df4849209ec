//! Request gating for oauthgate.
//!
//! A protected route is served by a [`Chain`]: an ordered list of
//! [`Interceptor`]s followed by a terminal [`Handler`]. Each interceptor
//! either passes the request inward, possibly after enriching the
//! [`RequestContext`], or halts with its own response.
//!
//! The usual order, outermost first:
//!
//! 1. [`DeadlineInterceptor`] bounds how long the handler may run
//! 2. [`RequireTls`] redirects plain-HTTP requests to HTTPS
//! 3. [`SessionGate`] decodes the session cookie and diverts to a fallback
//!    when there is no usable session
//! 4. [`AdminGate`] rejects sessions outside the admin allow-list
//!
//! [`SessionChains`] assembles the common combinations.
//!
//! Response cookies collected in the context (the breadcrumb cookie, for
//! instance) are attached to whatever response the chain produces.

pub mod admin_gate;
pub mod chain;
pub mod compose;
pub mod context;
pub mod deadline;
pub mod response;
pub mod session_gate;
pub mod tls;

pub use admin_gate::AdminGate;
pub use chain::{Chain, Flow, Handler, Interceptor};
pub use compose::SessionChains;
pub use context::RequestContext;
pub use deadline::{DEFAULT_REQUEST_TIMEOUT, DeadlineInterceptor};
pub use response::found;
pub use session_gate::SessionGate;
pub use tls::RequireTls;
