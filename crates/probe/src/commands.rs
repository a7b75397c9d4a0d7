//! Command implementations.

use common::AppResult;
use data_repository::{DataSettings, DbRepository, DbRepositoryBase, SeaOrmConnector, SeaOrmContext};

/// Repository that only checks connectivity.
struct HealthRepository {
    base: DbRepositoryBase<SeaOrmContext>,
}

impl HealthRepository {
    async fn ping(&self) -> AppResult<()> {
        let context = self.context()?;
        context.ping().await?;
        tracing::info!(context_id = %context.id(), "Ping succeeded");
        Ok(())
    }
}

impl DbRepository for HealthRepository {
    type Context = SeaOrmContext;

    fn base(&self) -> &DbRepositoryBase<SeaOrmContext> {
        &self.base
    }

    fn base_mut(&mut self) -> &mut DbRepositoryBase<SeaOrmContext> {
        &mut self.base
    }
}

/// Execute the check command
pub async fn check(settings: DataSettings) -> AppResult<()> {
    let connector = SeaOrmConnector::from_settings(&settings)?;

    let mut owner = HealthRepository {
        base: DbRepositoryBase::connect(&connector).await?,
    };
    owner.ping().await?;

    let mut borrower = HealthRepository {
        base: DbRepositoryBase::shared(owner.base().share()),
    };
    borrower.ping().await?;

    borrower.dispose()?;
    owner.dispose()?;

    println!("ok: {}", settings.connection_string_name);
    Ok(())
}

/// Execute the show command
pub fn show(settings: DataSettings) -> AppResult<()> {
    let status = match settings.resolve_connection_string() {
        Ok(_) => "set",
        Err(e) => {
            tracing::debug!("{}", e);
            "missing"
        }
    };

    println!("{} ({})", settings.connection_string_name, status);
    Ok(())
}
