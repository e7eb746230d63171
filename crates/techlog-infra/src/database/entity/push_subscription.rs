//! Push subscription entity for SeaORM. Endpoints are unique; the
//! device OS is stored as its lowercase string form.

use sea_orm::Set;
use sea_orm::entity::prelude::*;

use techlog_core::domain::DeviceOs;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "push_subscriptions")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub user_id: Uuid,
    #[sea_orm(unique, column_type = "Text")]
    pub endpoint: String,
    pub p256dh: String,
    pub auth: String,
    pub device_os: String,
    pub enabled: bool,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::UserId",
        to = "super::user::Column::Id",
        on_update = "Cascade",
        on_delete = "Cascade"
    )]
    User,
    /// Join target for the eligible-subscription scan; both tables key
    /// on the user id.
    #[sea_orm(
        belongs_to = "super::notification_preference::Entity",
        from = "Column::UserId",
        to = "super::notification_preference::Column::UserId"
    )]
    Preference,
}

impl ActiveModelBehavior for ActiveModel {}

/// Conversion from SeaORM Model to Domain PushSubscription.
impl From<Model> for techlog_core::domain::PushSubscription {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            user_id: model.user_id,
            endpoint: model.endpoint,
            p256dh: model.p256dh,
            auth: model.auth,
            device_os: DeviceOs::parse(&model.device_os),
            enabled: model.enabled,
            created_at: model.created_at.into(),
            updated_at: model.updated_at.into(),
        }
    }
}

/// Conversion from Domain PushSubscription to SeaORM ActiveModel.
impl From<techlog_core::domain::PushSubscription> for ActiveModel {
    fn from(subscription: techlog_core::domain::PushSubscription) -> Self {
        Self {
            id: Set(subscription.id),
            user_id: Set(subscription.user_id),
            endpoint: Set(subscription.endpoint),
            p256dh: Set(subscription.p256dh),
            auth: Set(subscription.auth),
            device_os: Set(subscription.device_os.as_str().to_string()),
            enabled: Set(subscription.enabled),
            created_at: Set(subscription.created_at.into()),
            updated_at: Set(subscription.updated_at.into()),
        }
    }
}
