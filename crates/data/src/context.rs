//! Context seam and context creation capabilities.
//!
//! A context is whatever session object an ORM hands out. The repository base
//! only needs two things from it: a way to make one, and a way to release it.

use async_trait::async_trait;
use common::AppResult;

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// An ORM session that can be released once its owner is done with it.
///
/// Release takes `&self` because a context may be shared behind an `Arc`;
/// the repository base guarantees only the owner calls it, and only once.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
pub trait DbContext: Send + Sync {
    /// Release the resources held by this context
    fn release(&self) -> AppResult<()>;
}

/// Synchronous context creation.
pub trait ContextFactory<C>: Send + Sync {
    /// Create a new context
    fn create(&self) -> AppResult<C>;
}

impl<C, F> ContextFactory<C> for F
where
    F: Fn() -> AppResult<C> + Send + Sync,
{
    fn create(&self) -> AppResult<C> {
        self()
    }
}

/// Factory for default-constructible contexts.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultContextFactory;

impl<C: Default> ContextFactory<C> for DefaultContextFactory {
    fn create(&self) -> AppResult<C> {
        Ok(C::default())
    }
}

/// Asynchronous context creation, for contexts that need I/O to open.
#[async_trait]
pub trait ConnectContext<C>: Send + Sync {
    /// Open a new context
    async fn connect(&self) -> AppResult<C>;
}
