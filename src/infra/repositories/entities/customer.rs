//! Customer database entity for SeaORM.

use sea_orm::entity::prelude::*;

use crate::domain::{Customer, CustomerProfile, Gender};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "customers")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub document_id: String,
    pub gender: String,
    pub phone: String,
    pub birthdate: Option<Date>,
    #[sea_orm(column_type = "Text")]
    pub address: String,
    #[sea_orm(unique)]
    pub user_id: Uuid,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::UserId",
        to = "super::user::Column::Id",
        on_delete = "Restrict"
    )]
    User,
    #[sea_orm(has_many = "super::order::Entity")]
    Order,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl Related<super::order::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Order.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for Customer {
    fn from(model: Model) -> Self {
        Customer {
            id: model.id,
            user_id: model.user_id,
            profile: CustomerProfile {
                document_id: model.document_id,
                gender: Gender::from(model.gender.as_str()),
                phone: model.phone,
                birthdate: model.birthdate,
                address: model.address,
            },
        }
    }
}
