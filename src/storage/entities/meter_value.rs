//! Meter sample row, one per accepted `sampledValue`.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "meter_values")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub charger_id: i32,
    pub connector: i32,

    /// Transaction the sample belongs to; 0 when the charger sent none.
    pub transaccio: i64,

    /// Sample timestamp exactly as reported by the charger.
    pub hora: String,

    pub valor: String,
    pub unit: String,
    pub measurand: String,
    pub context: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
