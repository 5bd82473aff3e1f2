use sea_orm::entity::prelude::*;

/// Redemption state of a ticket.
///
/// `used` and `cancelled` are terminal; no transition is defined out of
/// either. Rows are retained forever for auditing.
#[derive(Debug, Clone, PartialEq, Eq, EnumIter, DeriveActiveEnum)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::None)")]
pub enum TicketStatus {
    #[sea_orm(string_value = "active")]
    Active,
    #[sea_orm(string_value = "used")]
    Used,
    #[sea_orm(string_value = "cancelled")]
    Cancelled,
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "ticket")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub event_id: i32,
    pub tier_id: i32,
    pub user_id: i32,
    /// Exactly one ticket may exist per payment.
    #[sea_orm(unique)]
    pub payment_id: i32,
    #[sea_orm(unique)]
    pub qr_code: String,
    #[sea_orm(unique)]
    pub backup_code: String,
    pub status: TicketStatus,
    pub cultural_selections: Option<Json>,
    pub issued_at: DateTimeUtc,
    pub used_at: Option<DateTimeUtc>,
    pub scanned_by: Option<i32>,
    pub scan_location: Option<String>,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::event::Entity",
        from = "Column::EventId",
        to = "super::event::Column::Id",
        on_update = "Cascade",
        on_delete = "Cascade"
    )]
    Event,
    #[sea_orm(
        belongs_to = "super::event_tier::Entity",
        from = "Column::TierId",
        to = "super::event_tier::Column::Id",
        on_update = "Cascade",
        on_delete = "Cascade"
    )]
    EventTier,
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::UserId",
        to = "super::user::Column::Id",
        on_update = "Cascade",
        on_delete = "Cascade"
    )]
    User,
    #[sea_orm(
        belongs_to = "super::payment::Entity",
        from = "Column::PaymentId",
        to = "super::payment::Column::Id",
        on_update = "Cascade",
        on_delete = "Cascade"
    )]
    Payment,
    #[sea_orm(has_many = "super::ticket_scan::Entity")]
    TicketScan,
}

impl Related<super::event::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Event.def()
    }
}

impl Related<super::event_tier::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::EventTier.def()
    }
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl Related<super::payment::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Payment.def()
    }
}

impl Related<super::ticket_scan::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::TicketScan.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
