//! Navigation context threaded through the route tree.

use std::sync::Arc;

use crate::auth::RequestAuthContext;
use crate::query::QueryClient;

/// Immutable context handed from each route to its descendants.
///
/// Hooks never mutate it; augmenting produces a new value. `auth` is `None`
/// until the root hook has run.
#[derive(Clone)]
pub struct RouteContext {
    query_client: QueryClient,
    auth: Option<Arc<RequestAuthContext>>,
}

impl RouteContext {
    #[must_use]
    pub fn new(query_client: QueryClient) -> Self {
        Self { query_client, auth: None }
    }

    /// Return a copy with the identity merged in.
    #[must_use]
    pub fn with_auth(&self, auth: RequestAuthContext) -> Self {
        Self { query_client: self.query_client.clone(), auth: Some(Arc::new(auth)) }
    }

    #[must_use]
    pub fn query_client(&self) -> &QueryClient {
        &self.query_client
    }

    #[must_use]
    pub fn auth(&self) -> Option<&RequestAuthContext> {
        self.auth.as_deref()
    }

    /// The merged identity, `None` both before the merge and for anonymous
    /// callers.
    #[must_use]
    pub fn user_id(&self) -> Option<&str> {
        self.auth().and_then(RequestAuthContext::user_id)
    }
}
