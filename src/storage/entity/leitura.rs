use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "Leitura")]
#[serde(rename_all = "camelCase")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    // epoch millis, UTC
    #[sea_orm(column_name = "createdAt")]
    pub created_at: i64,
    #[sea_orm(column_name = "updatedAt")]
    pub updated_at: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::temperatura::Entity")]
    Temperatura,
    #[sea_orm(has_many = "super::pressao::Entity")]
    Pressao,
    #[sea_orm(has_many = "super::altitude::Entity")]
    Altitude,
    #[sea_orm(has_many = "super::velocidade_vento::Entity")]
    VelocidadeVento,
    #[sea_orm(has_many = "super::direcao_vento::Entity")]
    DirecaoVento,
    #[sea_orm(has_many = "super::precipitacao::Entity")]
    Precipitacao,
    #[sea_orm(has_many = "super::umidade_solo::Entity")]
    UmidadeSolo,
    #[sea_orm(has_many = "super::umidade_relativa::Entity")]
    UmidadeRelativa,
}

impl Related<super::temperatura::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Temperatura.def()
    }
}

impl Related<super::pressao::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Pressao.def()
    }
}

impl Related<super::altitude::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Altitude.def()
    }
}

impl Related<super::velocidade_vento::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::VelocidadeVento.def()
    }
}

impl Related<super::direcao_vento::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::DirecaoVento.def()
    }
}

impl Related<super::precipitacao::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Precipitacao.def()
    }
}

impl Related<super::umidade_solo::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::UmidadeSolo.def()
    }
}

impl Related<super::umidade_relativa::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::UmidadeRelativa.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
