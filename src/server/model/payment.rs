pub struct CreatePaymentParams {
    pub user_id: i32,
    pub event_id: i32,
    pub tier_id: i32,
    pub amount: i64,
    pub method: String,
    pub reference: String,
}
