//! Ownership-gated repository base.
//!
//! `DbRepositoryBase` holds a context and remembers whether it created that
//! context. Disposal releases the context only when this instance is the owner
//! and never more than once. Dropping the base runs the same disposal.

use std::fmt;
use std::sync::Arc;

use common::{AppError, AppResult, OptionExt};

use crate::context::{ConnectContext, ContextFactory, DbContext, DefaultContextFactory};

/// Base for repositories built on top of a data context.
///
/// Two ways in:
/// - owning: [`new`](Self::new), [`with_factory`](Self::with_factory),
///   [`connect`](Self::connect), [`from_owned`](Self::from_owned)
/// - sharing: [`shared`](Self::shared), usually fed from another
///   repository's [`share`](Self::share)
pub struct DbRepositoryBase<C: DbContext> {
    context: Option<Arc<C>>,
    owner: bool,
    disposed: bool,
}

impl<C: DbContext> DbRepositoryBase<C> {
    /// Create a repository that owns a default-constructed context.
    pub fn new() -> Self
    where
        C: Default,
    {
        Self::from_owned(C::default())
    }

    /// Create a repository that owns a context made by `factory`.
    pub fn with_factory<F>(factory: &F) -> AppResult<Self>
    where
        F: ContextFactory<C> + ?Sized,
    {
        let mut repository = Self::shared(None);
        repository.create_context_if_absent(factory)?;
        Ok(repository)
    }

    /// Create a repository that owns a context opened by `connector`.
    pub async fn connect<K>(connector: &K) -> AppResult<Self>
    where
        K: ConnectContext<C> + ?Sized,
    {
        let context = connector.connect().await?;
        Ok(Self::from_owned(context))
    }

    /// Take ownership of an already created context.
    pub fn from_owned(context: C) -> Self {
        tracing::debug!("Repository created with owned context");
        Self {
            context: Some(Arc::new(context)),
            owner: true,
            disposed: false,
        }
    }

    /// Create a repository that borrows `context`.
    ///
    /// An absent context is accepted; using it later fails with
    /// [`AppError::MissingContext`].
    pub fn shared(context: impl Into<Option<Arc<C>>>) -> Self {
        let context = context.into();
        if context.is_none() {
            tracing::trace!("Repository created without a context");
        }
        Self {
            context,
            owner: false,
            disposed: false,
        }
    }

    /// Create a context with `factory` if none is held, becoming its owner.
    ///
    /// No-op when a context is already held, owned or not. A disposed
    /// repository never creates a context again.
    pub fn create_context_if_absent<F>(&mut self, factory: &F) -> AppResult<()>
    where
        F: ContextFactory<C> + ?Sized,
    {
        if self.disposed {
            return Err(AppError::RepositoryDisposed);
        }
        if self.context.is_some() {
            return Ok(());
        }

        let context = factory.create()?;
        self.context = Some(Arc::new(context));
        self.owner = true;
        tracing::debug!("Context created, repository is owner");
        Ok(())
    }

    /// Same as [`create_context_if_absent`](Self::create_context_if_absent)
    /// using the context's `Default`.
    pub fn create_default_context_if_absent(&mut self) -> AppResult<()>
    where
        C: Default,
    {
        self.create_context_if_absent(&DefaultContextFactory)
    }

    /// Borrow the held context.
    pub fn context(&self) -> AppResult<&C> {
        if self.disposed {
            return Err(AppError::RepositoryDisposed);
        }
        self.context.as_deref().ok_or_missing_context()
    }

    /// Hand out the held context for another repository to borrow.
    pub fn share(&self) -> Option<Arc<C>> {
        if self.disposed {
            return None;
        }
        self.context.clone()
    }

    /// Whether this repository created its context.
    pub fn is_owner(&self) -> bool {
        self.owner
    }

    /// Whether disposal has run.
    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    /// Release the context if owned. Idempotent.
    ///
    /// The repository is marked disposed before the release runs, so a
    /// failed release is reported once and never retried.
    pub fn dispose(&mut self) -> AppResult<()> {
        if self.disposed {
            return Ok(());
        }
        self.disposed = true;

        let context = self.context.take();
        if !self.owner {
            tracing::trace!("Borrowed context left unreleased");
            return Ok(());
        }

        if let Some(context) = context {
            if let Err(e) = context.release() {
                tracing::warn!("Context release failed: {}", e);
                return Err(e);
            }
            tracing::debug!("Owned context released");
        }

        Ok(())
    }
}

impl<C: DbContext + Default> Default for DbRepositoryBase<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: DbContext> fmt::Debug for DbRepositoryBase<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DbRepositoryBase")
            .field("has_context", &self.context.is_some())
            .field("owner", &self.owner)
            .field("disposed", &self.disposed)
            .finish()
    }
}

impl<C: DbContext> Drop for DbRepositoryBase<C> {
    fn drop(&mut self) {
        if let Err(e) = self.dispose() {
            tracing::error!("Context release failed during drop: {}", e);
        }
    }
}

/// Repository built on a [`DbRepositoryBase`].
///
/// Implementors add their data operations against [`context`](Self::context).
/// Overriding [`dispose`](Self::dispose) to clean up their own state must
/// still end by disposing the base.
pub trait DbRepository {
    type Context: DbContext;

    fn base(&self) -> &DbRepositoryBase<Self::Context>;

    fn base_mut(&mut self) -> &mut DbRepositoryBase<Self::Context>;

    /// Borrow the context held by the base
    fn context(&self) -> AppResult<&Self::Context> {
        self.base().context()
    }

    /// Whether the base created its context
    fn is_context_owner(&self) -> bool {
        self.base().is_owner()
    }

    /// Dispose the base
    fn dispose(&mut self) -> AppResult<()> {
        self.base_mut().dispose()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::MockDbContext;

    fn releasing_mock(times: usize) -> MockDbContext {
        let mut context = MockDbContext::new();
        context.expect_release().times(times).returning(|| Ok(()));
        context
    }

    #[test]
    fn test_owner_releases_once_across_repeated_dispose() {
        let mut repo = DbRepositoryBase::from_owned(releasing_mock(1));

        assert!(repo.is_owner());
        repo.dispose().unwrap();
        repo.dispose().unwrap();
        assert!(repo.is_disposed());
    }

    #[test]
    fn test_borrower_never_releases() {
        let shared = Arc::new(releasing_mock(0));
        let mut repo = DbRepositoryBase::shared(shared.clone());

        assert!(!repo.is_owner());
        assert!(Arc::ptr_eq(&shared, &repo.share().unwrap()));
        repo.dispose().unwrap();
        repo.dispose().unwrap();
    }

    #[test]
    fn test_drop_releases_owned_context() {
        let repo = DbRepositoryBase::from_owned(releasing_mock(1));
        drop(repo);
    }

    #[test]
    fn test_drop_after_dispose_does_not_release_again() {
        let mut repo = DbRepositoryBase::from_owned(releasing_mock(1));
        repo.dispose().unwrap();
        drop(repo);
    }

    #[test]
    fn test_failed_release_still_marks_disposed() {
        let mut context = MockDbContext::new();
        context
            .expect_release()
            .times(1)
            .returning(|| Err(AppError::context_release("connection reset")));
        let mut repo = DbRepositoryBase::from_owned(context);

        let err = repo.dispose().unwrap_err();
        assert!(matches!(err, AppError::ContextRelease(_)));
        assert!(repo.is_disposed());

        // Not retried
        repo.dispose().unwrap();
    }

    #[test]
    fn test_factory_failure_surfaces_from_construction() {
        let factory = || -> AppResult<MockDbContext> { Err(AppError::context_init("bad dsn")) };
        let err = DbRepositoryBase::with_factory(&factory).unwrap_err();
        assert!(matches!(err, AppError::ContextInit(_)));
    }

    #[test]
    fn test_create_if_absent_is_noop_when_context_held() {
        let shared = Arc::new(releasing_mock(0));
        let mut repo = DbRepositoryBase::shared(shared);
        let factory = || -> AppResult<MockDbContext> { panic!("factory must not run") };

        repo.create_context_if_absent(&factory).unwrap();
        assert!(!repo.is_owner());
    }

    #[test]
    fn test_create_if_absent_takes_ownership_of_empty_repo() {
        let mut repo = DbRepositoryBase::<MockDbContext>::shared(None);
        let factory = || -> AppResult<MockDbContext> { Ok(releasing_mock(1)) };

        repo.create_context_if_absent(&factory).unwrap();
        assert!(repo.is_owner());
        assert!(repo.context().is_ok());
    }

    #[test]
    fn test_create_if_absent_after_dispose_is_rejected() {
        let shared = Arc::new(releasing_mock(0));
        let mut repo = DbRepositoryBase::shared(shared);
        repo.dispose().unwrap();
        let factory = || -> AppResult<MockDbContext> { panic!("factory must not run") };

        let err = repo.create_context_if_absent(&factory).unwrap_err();
        assert!(matches!(err, AppError::RepositoryDisposed));
        assert!(!repo.is_owner());
    }

    #[test]
    fn test_context_after_dispose_is_rejected() {
        let mut repo = DbRepositoryBase::from_owned(releasing_mock(1));
        repo.dispose().unwrap();

        assert!(matches!(repo.context(), Err(AppError::RepositoryDisposed)));
        assert!(repo.share().is_none());
    }

    #[test]
    fn test_debug_shows_state_only() {
        let repo = DbRepositoryBase::<MockDbContext>::shared(None);
        assert_eq!(
            format!("{:?}", repo),
            "DbRepositoryBase { has_context: false, owner: false, disposed: false }"
        );
    }
}
