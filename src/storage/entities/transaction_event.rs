//! Transaction lifecycle row: one "Start" and one "Stop" per transaction.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "transaccions")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub charger_id: i32,

    /// "Start" or "Stop".
    pub estat: String,

    pub connector: i32,

    /// Server clock at the time of the event.
    pub hora: String,

    /// Stop reason token; empty for starts and unspecified stops.
    pub motiu: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
