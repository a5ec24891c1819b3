pub mod middleware;

pub use middleware::{identity_middleware, AuthenticatedCaller};
