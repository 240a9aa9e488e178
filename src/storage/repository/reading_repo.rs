use crate::codec::{Category, MeasuredValue, Measurement};
use crate::storage::entity::leitura::{self, ActiveModel as LeituraActiveModel, Entity as Leitura};
use crate::storage::entity::{
    altitude, direcao_vento, precipitacao, pressao, temperatura, umidade_relativa, umidade_solo,
    velocidade_vento,
};
use sea_orm::sea_query::Query;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DbErr, EntityTrait, LoaderTrait,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Select, Set,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A reading with the rows of every category attached.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reading {
    #[serde(flatten)]
    pub leitura: leitura::Model,
    #[serde(rename = "Temperatura")]
    pub temperatura: Vec<temperatura::Model>,
    #[serde(rename = "Pressao")]
    pub pressao: Vec<pressao::Model>,
    #[serde(rename = "Altitude")]
    pub altitude: Vec<altitude::Model>,
    #[serde(rename = "VelocidadeVento")]
    pub velocidade_vento: Vec<velocidade_vento::Model>,
    #[serde(rename = "DirecaoVento")]
    pub direcao_vento: Vec<direcao_vento::Model>,
    #[serde(rename = "Precipitacao")]
    pub precipitacao: Vec<precipitacao::Model>,
    #[serde(rename = "UmidadeSolo")]
    pub umidade_solo: Vec<umidade_solo::Model>,
    #[serde(rename = "UmidadeRelativa")]
    pub umidade_relativa: Vec<umidade_relativa::Model>,
}

impl Reading {
    pub fn id(&self) -> i32 {
        self.leitura.id
    }

    pub fn created_at(&self) -> i64 {
        self.leitura.created_at
    }

    pub fn count(&self, category: Category) -> usize {
        match category {
            Category::Temperatura => self.temperatura.len(),
            Category::Pressao => self.pressao.len(),
            Category::Altitude => self.altitude.len(),
            Category::VelocidadeVento => self.velocidade_vento.len(),
            Category::DirecaoVento => self.direcao_vento.len(),
            Category::Precipitacao => self.precipitacao.len(),
            Category::UmidadeSolo => self.umidade_solo.len(),
            Category::UmidadeRelativa => self.umidade_relativa.len(),
        }
    }

    pub fn row_count(&self) -> usize {
        Category::ALL.into_iter().map(|c| self.count(c)).sum()
    }

    /// Complete means at least one row in every category.
    pub fn is_complete(&self) -> bool {
        Category::ALL.into_iter().all(|c| self.count(c) > 0)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct StoreStats {
    pub readings: u64,
    pub complete_readings: u64,
    pub measurements: BTreeMap<&'static str, u64>,
}

macro_rules! insert_single_valued {
    ($entity:ident, $db:expr, $m:expr, $valor:expr, $leitura_id:expr) => {
        $entity::ActiveModel {
            sensor: Set($m.sensor.clone()),
            valor: Set($valor),
            unidade: Set($m.unit.clone()),
            ordem_grandeza: Set($m.magnitude),
            leitura_id: Set($leitura_id),
            ..Default::default()
        }
        .insert($db)
        .await
        .map(|row| row.id)
    };
}

pub struct ReadingRepository;

impl ReadingRepository {
    pub async fn insert_reading<C: ConnectionTrait>(
        db: &C,
        created_at: i64,
    ) -> Result<leitura::Model, DbErr> {
        let active_model = LeituraActiveModel {
            created_at: Set(created_at),
            updated_at: Set(created_at),
            ..Default::default()
        };
        active_model.insert(db).await
    }

    /// Inserts one category row owned by `leitura_id`, returning the row id.
    pub async fn insert_measurement<C: ConnectionTrait>(
        db: &C,
        category: Category,
        leitura_id: i32,
        m: &Measurement,
    ) -> Result<i32, DbErr> {
        match (category, &m.value) {
            (Category::VelocidadeVento, MeasuredValue::Wind { mean, max }) => {
                velocidade_vento::ActiveModel {
                    sensor: Set(m.sensor.clone()),
                    media: Set(*mean),
                    maximo: Set(*max),
                    unidade: Set(m.unit.clone()),
                    ordem_grandeza: Set(m.magnitude),
                    leitura_id: Set(leitura_id),
                    ..Default::default()
                }
                .insert(db)
                .await
                .map(|row| row.id)
            }
            (Category::Temperatura, MeasuredValue::Single(v)) => {
                insert_single_valued!(temperatura, db, m, *v, leitura_id)
            }
            (Category::Pressao, MeasuredValue::Single(v)) => {
                insert_single_valued!(pressao, db, m, *v, leitura_id)
            }
            (Category::Altitude, MeasuredValue::Single(v)) => {
                insert_single_valued!(altitude, db, m, *v, leitura_id)
            }
            (Category::DirecaoVento, MeasuredValue::Single(v)) => {
                insert_single_valued!(direcao_vento, db, m, *v, leitura_id)
            }
            (Category::Precipitacao, MeasuredValue::Single(v)) => {
                insert_single_valued!(precipitacao, db, m, *v, leitura_id)
            }
            (Category::UmidadeSolo, MeasuredValue::Single(v)) => {
                insert_single_valued!(umidade_solo, db, m, *v, leitura_id)
            }
            (Category::UmidadeRelativa, MeasuredValue::Single(v)) => {
                insert_single_valued!(umidade_relativa, db, m, *v, leitura_id)
            }
            (category, value) => Err(DbErr::Custom(format!(
                "measurement {:?} does not fit category {}",
                value, category
            ))),
        }
    }

    /// Loads one reading with all of its rows, complete or not.
    pub async fn find_by_id<C: ConnectionTrait>(
        db: &C,
        id: i32,
    ) -> Result<Option<Reading>, DbErr> {
        let Some(leitura) = Leitura::find_by_id(id).one(db).await? else {
            return Ok(None);
        };
        Ok(Self::with_categories(db, vec![leitura]).await?.pop())
    }

    /// Most recent complete readings, newest first.
    pub async fn find_recent_complete<C: ConnectionTrait>(
        db: &C,
        limit: u64,
    ) -> Result<Vec<Reading>, DbErr> {
        let leituras = Self::complete_only(Leitura::find())
            .order_by_desc(leitura::Column::Id)
            .limit(limit)
            .all(db)
            .await?;
        Self::with_categories(db, leituras).await
    }

    /// Complete readings with `from_ms <= createdAt < to_ms`, oldest first.
    pub async fn find_complete_between<C: ConnectionTrait>(
        db: &C,
        from_ms: i64,
        to_ms: i64,
    ) -> Result<Vec<Reading>, DbErr> {
        let leituras = Self::complete_only(Leitura::find())
            .filter(leitura::Column::CreatedAt.gte(from_ms))
            .filter(leitura::Column::CreatedAt.lt(to_ms))
            .order_by_asc(leitura::Column::Id)
            .all(db)
            .await?;
        Self::with_categories(db, leituras).await
    }

    pub async fn stats<C: ConnectionTrait>(db: &C) -> Result<StoreStats, DbErr> {
        let mut measurements = BTreeMap::new();
        measurements.insert(
            Category::Temperatura.table_name(),
            temperatura::Entity::find().count(db).await?,
        );
        measurements.insert(
            Category::Pressao.table_name(),
            pressao::Entity::find().count(db).await?,
        );
        measurements.insert(
            Category::Altitude.table_name(),
            altitude::Entity::find().count(db).await?,
        );
        measurements.insert(
            Category::VelocidadeVento.table_name(),
            velocidade_vento::Entity::find().count(db).await?,
        );
        measurements.insert(
            Category::DirecaoVento.table_name(),
            direcao_vento::Entity::find().count(db).await?,
        );
        measurements.insert(
            Category::Precipitacao.table_name(),
            precipitacao::Entity::find().count(db).await?,
        );
        measurements.insert(
            Category::UmidadeSolo.table_name(),
            umidade_solo::Entity::find().count(db).await?,
        );
        measurements.insert(
            Category::UmidadeRelativa.table_name(),
            umidade_relativa::Entity::find().count(db).await?,
        );

        Ok(StoreStats {
            readings: Leitura::find().count(db).await?,
            complete_readings: Self::complete_only(Leitura::find()).count(db).await?,
            measurements,
        })
    }

    /// Inner-join semantics across all eight categories: a reading is kept
    /// only if every category table references it. Filtering in SQL keeps
    /// LIMIT counting complete readings only.
    fn complete_only(select: Select<Leitura>) -> Select<Leitura> {
        select
            .filter(
                leitura::Column::Id.in_subquery(
                    Query::select()
                        .column(temperatura::Column::LeituraId)
                        .from(temperatura::Entity)
                        .to_owned(),
                ),
            )
            .filter(
                leitura::Column::Id.in_subquery(
                    Query::select()
                        .column(pressao::Column::LeituraId)
                        .from(pressao::Entity)
                        .to_owned(),
                ),
            )
            .filter(
                leitura::Column::Id.in_subquery(
                    Query::select()
                        .column(altitude::Column::LeituraId)
                        .from(altitude::Entity)
                        .to_owned(),
                ),
            )
            .filter(
                leitura::Column::Id.in_subquery(
                    Query::select()
                        .column(velocidade_vento::Column::LeituraId)
                        .from(velocidade_vento::Entity)
                        .to_owned(),
                ),
            )
            .filter(
                leitura::Column::Id.in_subquery(
                    Query::select()
                        .column(direcao_vento::Column::LeituraId)
                        .from(direcao_vento::Entity)
                        .to_owned(),
                ),
            )
            .filter(
                leitura::Column::Id.in_subquery(
                    Query::select()
                        .column(precipitacao::Column::LeituraId)
                        .from(precipitacao::Entity)
                        .to_owned(),
                ),
            )
            .filter(
                leitura::Column::Id.in_subquery(
                    Query::select()
                        .column(umidade_solo::Column::LeituraId)
                        .from(umidade_solo::Entity)
                        .to_owned(),
                ),
            )
            .filter(
                leitura::Column::Id.in_subquery(
                    Query::select()
                        .column(umidade_relativa::Column::LeituraId)
                        .from(umidade_relativa::Entity)
                        .to_owned(),
                ),
            )
    }

    /// Batch-loads every category for the given readings, one query per
    /// category, preserving the input order.
    async fn with_categories<C: ConnectionTrait>(
        db: &C,
        leituras: Vec<leitura::Model>,
    ) -> Result<Vec<Reading>, DbErr> {
        if leituras.is_empty() {
            return Ok(Vec::new());
        }

        let mut temperatura = leituras.load_many(temperatura::Entity, db).await?.into_iter();
        let mut pressao = leituras.load_many(pressao::Entity, db).await?.into_iter();
        let mut altitude = leituras.load_many(altitude::Entity, db).await?.into_iter();
        let mut velocidade_vento = leituras
            .load_many(velocidade_vento::Entity, db)
            .await?
            .into_iter();
        let mut direcao_vento = leituras
            .load_many(direcao_vento::Entity, db)
            .await?
            .into_iter();
        let mut precipitacao = leituras.load_many(precipitacao::Entity, db).await?.into_iter();
        let mut umidade_solo = leituras.load_many(umidade_solo::Entity, db).await?.into_iter();
        let mut umidade_relativa = leituras
            .load_many(umidade_relativa::Entity, db)
            .await?
            .into_iter();

        Ok(leituras
            .into_iter()
            .map(|leitura| Reading {
                leitura,
                temperatura: temperatura.next().unwrap_or_default(),
                pressao: pressao.next().unwrap_or_default(),
                altitude: altitude.next().unwrap_or_default(),
                velocidade_vento: velocidade_vento.next().unwrap_or_default(),
                direcao_vento: direcao_vento.next().unwrap_or_default(),
                precipitacao: precipitacao.next().unwrap_or_default(),
                umidade_solo: umidade_solo.next().unwrap_or_default(),
                umidade_relativa: umidade_relativa.next().unwrap_or_default(),
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::decode;
    use crate::storage::Store;

    async fn insert_all_categories(store: &Store, created_at: i64) -> i32 {
        let db = store.connection();
        let leitura = ReadingRepository::insert_reading(db, created_at).await.unwrap();
        for category in Category::ALL {
            let token = match category {
                Category::VelocidadeVento => "anemômetro$62$104$m/s$-1",
                _ => "S1$10$u$0",
            };
            let m = decode(category, token).unwrap();
            ReadingRepository::insert_measurement(db, category, leitura.id, &m)
                .await
                .unwrap();
        }
        leitura.id
    }

    #[tokio::test]
    async fn complete_filter_applies_before_limit() {
        let store = Store::init("sqlite::memory:").await.unwrap();
        let db = store.connection();

        let first = insert_all_categories(&store, 1_000).await;
        // newer but incomplete; must not use up the limit
        ReadingRepository::insert_reading(db, 2_000).await.unwrap();

        let recent = ReadingRepository::find_recent_complete(db, 1).await.unwrap();
        assert_eq!(recent.len(), 1);
        assert_eq!(recent[0].id(), first);
        assert!(recent[0].is_complete());
        assert_eq!(recent[0].row_count(), 8);
    }

    #[tokio::test]
    async fn find_by_id_returns_incomplete_readings_too() {
        let store = Store::init("sqlite::memory:").await.unwrap();
        let db = store.connection();
        let leitura = ReadingRepository::insert_reading(db, 5).await.unwrap();

        let found = ReadingRepository::find_by_id(db, leitura.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(found.row_count(), 0);
        assert!(!found.is_complete());
        assert!(ReadingRepository::find_by_id(db, leitura.id + 1)
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn mismatched_shape_is_rejected() {
        let store = Store::init("sqlite::memory:").await.unwrap();
        let db = store.connection();
        let leitura = ReadingRepository::insert_reading(db, 5).await.unwrap();
        let wind = decode(Category::VelocidadeVento, "a$1$2$m/s$0").unwrap();

        let err = ReadingRepository::insert_measurement(db, Category::Pressao, leitura.id, &wind)
            .await
            .unwrap_err();
        assert!(matches!(err, DbErr::Custom(_)));
    }

    #[tokio::test]
    async fn child_rows_require_an_existing_reading() {
        let store = Store::init("sqlite::memory:").await.unwrap();
        let m = decode(Category::Temperatura, "DHT11$260$°C$-1").unwrap();

        let res =
            ReadingRepository::insert_measurement(store.connection(), Category::Temperatura, 42, &m)
                .await;
        assert!(res.is_err());
    }

    #[tokio::test]
    async fn stats_count_every_table() {
        let store = Store::init("sqlite::memory:").await.unwrap();
        insert_all_categories(&store, 1).await;
        ReadingRepository::insert_reading(store.connection(), 2)
            .await
            .unwrap();

        let stats = ReadingRepository::stats(store.connection()).await.unwrap();
        assert_eq!(stats.readings, 2);
        assert_eq!(stats.complete_readings, 1);
        assert_eq!(stats.measurements.len(), 8);
        assert!(stats.measurements.values().all(|n| *n == 1));
    }
}
