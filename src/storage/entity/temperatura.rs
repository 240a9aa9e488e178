use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "Temperatura")]
#[serde(rename_all = "camelCase")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub sensor: String,
    pub valor: i32,
    pub unidade: String,
    #[sea_orm(column_name = "ordemGrandeza")]
    pub ordem_grandeza: i32,
    #[sea_orm(column_name = "leituraId")]
    pub leitura_id: i32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::leitura::Entity",
        from = "Column::LeituraId",
        to = "super::leitura::Column::Id"
    )]
    Leitura,
}

impl Related<super::leitura::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Leitura.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
