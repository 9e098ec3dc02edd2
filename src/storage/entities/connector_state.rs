//! Connector status history row, one per StatusNotification.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "estats")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub charger_id: i32,
    pub connector: i32,

    /// Reported connector status token.
    pub estat: String,

    /// Server clock at the time of the report.
    pub hora: String,

    pub error_code: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
