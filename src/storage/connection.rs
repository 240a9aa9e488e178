use crate::storage::entity::{
    altitude, direcao_vento, leitura, precipitacao, pressao, temperatura, umidade_relativa,
    umidade_solo, velocidade_vento,
};
use log::info;
use sea_orm::sea_query::Table;
use sea_orm::{
    ConnectOptions, ConnectionTrait, Database, DatabaseConnection, DbErr, EntityTrait, Schema,
};
use std::time::Duration;

/// Handle on the relational store. Built once at startup and handed to the
/// services that need it; closed with [`Store::teardown`].
pub struct Store {
    db: DatabaseConnection,
}

impl Store {
    pub async fn init(db_url: &str) -> Result<Self, DbErr> {
        let db = establish_connection(db_url).await?;
        Ok(Self { db })
    }

    pub fn connection(&self) -> &DatabaseConnection {
        &self.db
    }

    pub async fn ping(&self) -> Result<(), DbErr> {
        self.db.ping().await
    }

    /// Drops every table and recreates the empty schema.
    pub async fn reset(&self) -> Result<(), DbErr> {
        // children first, the foreign keys point at Leitura
        drop_table(&self.db, temperatura::Entity).await?;
        drop_table(&self.db, pressao::Entity).await?;
        drop_table(&self.db, altitude::Entity).await?;
        drop_table(&self.db, velocidade_vento::Entity).await?;
        drop_table(&self.db, direcao_vento::Entity).await?;
        drop_table(&self.db, precipitacao::Entity).await?;
        drop_table(&self.db, umidade_solo::Entity).await?;
        drop_table(&self.db, umidade_relativa::Entity).await?;
        drop_table(&self.db, leitura::Entity).await?;

        create_schema(&self.db).await?;
        info!("Store reset: reading tables recreated empty.");
        Ok(())
    }

    pub async fn teardown(self) -> Result<(), DbErr> {
        self.db.close().await?;
        info!("Database connection closed.");
        Ok(())
    }
}

fn is_in_memory(db_url: &str) -> bool {
    db_url.contains(":memory:") || db_url.contains("mode=memory")
}

/// Idle and lifetime limit for the single in-memory connection. Left unset,
/// the pool falls back to its own defaults and recycles the connection,
/// taking the database with it.
const IN_MEMORY_KEEPALIVE: Duration = Duration::from_secs(10 * 365 * 24 * 60 * 60);

fn connect_options(db_url: &str) -> ConnectOptions {
    let mut opt = ConnectOptions::new(db_url.to_owned());
    opt.connect_timeout(Duration::from_secs(8))
        .acquire_timeout(Duration::from_secs(8))
        .sqlx_logging(true)
        .sqlx_logging_level(log::LevelFilter::Info);

    if is_in_memory(db_url) {
        // every pooled connection would otherwise open its own private database
        opt.max_connections(1)
            .min_connections(1)
            .idle_timeout(IN_MEMORY_KEEPALIVE)
            .max_lifetime(IN_MEMORY_KEEPALIVE);
    } else {
        opt.max_connections(10)
            .min_connections(2)
            .idle_timeout(Duration::from_secs(8))
            .max_lifetime(Duration::from_secs(8));
    }
    opt
}

pub async fn establish_connection(db_url: &str) -> Result<DatabaseConnection, DbErr> {
    let in_memory = is_in_memory(db_url);
    let db = Database::connect(connect_options(db_url)).await?;

    if !in_memory {
        let _ = db
            .execute(sea_orm::Statement::from_string(
                sea_orm::DatabaseBackend::Sqlite,
                "PRAGMA journal_mode=WAL;".to_string(),
            ))
            .await?;
    }

    create_schema(&db).await?;

    info!("Database connection established and reading tables initialized.");

    Ok(db)
}

async fn create_schema(db: &DatabaseConnection) -> Result<(), DbErr> {
    let schema = Schema::new(db.get_database_backend());

    // Leitura first so the category foreign keys resolve
    create_table(db, &schema, leitura::Entity).await?;
    create_table(db, &schema, temperatura::Entity).await?;
    create_table(db, &schema, pressao::Entity).await?;
    create_table(db, &schema, altitude::Entity).await?;
    create_table(db, &schema, velocidade_vento::Entity).await?;
    create_table(db, &schema, direcao_vento::Entity).await?;
    create_table(db, &schema, precipitacao::Entity).await?;
    create_table(db, &schema, umidade_solo::Entity).await?;
    create_table(db, &schema, umidade_relativa::Entity).await?;

    Ok(())
}

async fn create_table<E: EntityTrait>(
    db: &DatabaseConnection,
    schema: &Schema,
    entity: E,
) -> Result<(), DbErr> {
    let builder = db.get_database_backend();
    let stmt = builder.build(schema.create_table_from_entity(entity).if_not_exists());
    db.execute(stmt).await?;
    Ok(())
}

async fn drop_table<E: EntityTrait>(db: &DatabaseConnection, entity: E) -> Result<(), DbErr> {
    let builder = db.get_database_backend();
    let stmt = builder.build(Table::drop().table(entity).if_exists());
    db.execute(stmt).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_in_memory_urls() {
        assert!(is_in_memory("sqlite::memory:"));
        assert!(is_in_memory("sqlite://file:readings?mode=memory&cache=shared"));
        assert!(!is_in_memory("sqlite://readings.db?mode=rwc"));
    }

    #[test]
    fn in_memory_connection_is_never_recycled() {
        let opt = connect_options("sqlite::memory:");
        assert_eq!(opt.get_max_connections(), Some(1));
        assert_eq!(opt.get_min_connections(), Some(1));
        assert_eq!(opt.get_idle_timeout(), Some(IN_MEMORY_KEEPALIVE));
        assert_eq!(opt.get_max_lifetime(), Some(IN_MEMORY_KEEPALIVE));

        let opt = connect_options("sqlite://readings.db?mode=rwc");
        assert_eq!(opt.get_max_connections(), Some(10));
        assert_eq!(opt.get_max_lifetime(), Some(Duration::from_secs(8)));
    }

    #[tokio::test]
    async fn init_ping_and_teardown() {
        let store = Store::init("sqlite::memory:").await.unwrap();
        store.ping().await.unwrap();
        store.reset().await.unwrap();
        store.ping().await.unwrap();
        store.teardown().await.unwrap();
    }
}
