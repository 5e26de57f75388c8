//! SeaORM entity for the `companies` table
//!
//! `secondary_securities` and `denomination` are JSON-encoded text columns;
//! decoding happens in the repository, not here.

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "companies")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub cik: String,
    pub primary_ticker: Option<String>,
    #[sea_orm(column_type = "Text", nullable)]
    pub secondary_securities: Option<String>,
    #[sea_orm(column_type = "Text", nullable)]
    pub denomination: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
