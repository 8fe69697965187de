use crate::error::DbError;
use configuration::DatabaseSettings;
use sqlx::postgres::{PgConnectOptions, PgPoolOptions};
use sqlx::PgPool;
use std::str::FromStr;
use std::time::Duration;

/// Establishes a connection pool to the library database.
///
/// Every operation borrows a connection from this pool for the length of one
/// transaction and hands it back on every exit path, including errors.
pub async fn connect(settings: &DatabaseSettings) -> Result<PgPool, DbError> {
    let options = connect_options(settings)?;

    let pool = PgPoolOptions::new()
        .max_connections(settings.max_connections)
        .acquire_timeout(Duration::from_secs(settings.acquire_timeout_secs))
        .connect_with(options)
        .await?;

    tracing::info!(
        max_connections = settings.max_connections,
        "Connected to the library database."
    );
    Ok(pool)
}

/// Builds the connection options, preferring a full URL when one is configured.
pub fn connect_options(settings: &DatabaseSettings) -> Result<PgConnectOptions, DbError> {
    if let Some(url) = &settings.url {
        return PgConnectOptions::from_str(url)
            .map_err(|e| DbError::ConnectionConfigError(format!("invalid database URL: {e}")));
    }

    let mut options = PgConnectOptions::new()
        .host(&settings.host)
        .port(settings.port)
        .database(&settings.name)
        .username(&settings.user);
    if !settings.password.is_empty() {
        options = options.password(&settings.password);
    }
    Ok(options)
}

/// Applies the bundled schema migrations.
///
/// Already-applied migrations are skipped, so this is safe to call on every start.
pub async fn run_migrations(pool: &PgPool) -> Result<(), DbError> {
    // Use a relative path from the crate root
    sqlx::migrate!("./migrations").run(pool).await?;
    tracing::info!("Database migrations are up to date.");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_options_from_discrete_fields() {
        let settings = DatabaseSettings {
            host: "db.internal".to_string(),
            port: 6543,
            name: "branch_library".to_string(),
            user: "librarian".to_string(),
            ..DatabaseSettings::default()
        };
        let options = connect_options(&settings).unwrap();
        assert_eq!(options.get_host(), "db.internal");
        assert_eq!(options.get_port(), 6543);
        assert_eq!(options.get_database(), Some("branch_library"));
        assert_eq!(options.get_username(), "librarian");
    }

    #[test]
    fn url_takes_precedence() {
        let settings = DatabaseSettings {
            url: Some("postgres://reader@replica:5433/archive".to_string()),
            ..DatabaseSettings::default()
        };
        let options = connect_options(&settings).unwrap();
        assert_eq!(options.get_host(), "replica");
        assert_eq!(options.get_port(), 5433);
        assert_eq!(options.get_database(), Some("archive"));
        assert_eq!(options.get_username(), "reader");
    }

    #[test]
    fn rejects_malformed_url() {
        let settings = DatabaseSettings {
            url: Some("not a url".to_string()),
            ..DatabaseSettings::default()
        };
        assert!(matches!(
            connect_options(&settings),
            Err(DbError::ConnectionConfigError(_))
        ));
    }
}
