//! Repository base over an ORM context.
//!
//! A repository either creates and owns its context, or borrows one that
//! another repository created. Only the owner ever releases the context, and
//! it does so at most once, on explicit disposal or on drop.
//!
//! # Modules
//!
//! - **context**: the context seam and the ways to create one
//! - **repository**: the ownership-gated base and the repository trait
//! - **setting**: the connection-string name setting
//! - **orm**: sea-orm backed context, connector and factory

pub mod context;
pub mod orm;
pub mod repository;
pub mod setting;

pub use common::{AppError, AppResult};
pub use context::{ConnectContext, ContextFactory, DbContext, DefaultContextFactory};
pub use orm::{PooledContextFactory, SeaOrmConnector, SeaOrmContext};
pub use repository::{DbRepository, DbRepositoryBase};
pub use setting::{
    connection_string_name, reset_connection_string_name, set_connection_string_name,
    DataSettings, CONNECTION_STRING_NAME_ENV, DEFAULT_CONNECTION_STRING_NAME,
};

#[cfg(any(test, feature = "test-utils"))]
pub use context::MockDbContext;
