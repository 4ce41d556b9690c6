use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::entity::enums::{PaymentMethod, TransactionStatus};
use crate::models::Payment;

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreatePaymentRequest {
    pub method: PaymentMethod,
    /// Gateway-assigned id; a synthetic one is generated when absent.
    pub transaction_id: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PaymentList {
    pub items: Vec<Payment>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct WebhookPayload {
    pub transaction_id: String,
    /// Raw gateway status code; "SUCCESS" and "00" confirm, anything else cancels.
    pub status: String,
    pub amount: Option<i64>,
    pub signature: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct WebhookOutcome {
    pub transaction_id: String,
    pub status: TransactionStatus,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdatePaymentStatusRequest {
    pub status: TransactionStatus,
}
