use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::entity::enums::BookingStatus;
use crate::models::Booking;

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateBookingStatusRequest {
    pub status: BookingStatus,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct DashboardStats {
    pub total_users: i64,
    pub total_tours: i64,
    pub total_bookings: i64,
    pub total_payments: i64,
    /// Net of refund reversals (SUCCESS payment amounts summed, negatives included).
    pub total_revenue: i64,
    pub recent_bookings: Vec<Booking>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct MonthlyRevenue {
    /// Calendar month, `YYYY-MM`.
    pub month: String,
    pub revenue: i64,
    pub payments: i64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct RevenueReport {
    pub months: Vec<MonthlyRevenue>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct TopTour {
    pub tour_id: Uuid,
    pub title: String,
    pub bookings: i64,
    pub revenue: i64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct TopToursReport {
    pub items: Vec<TopTour>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PaymentStatusTotal {
    pub status: String,
    pub count: i64,
    pub total_amount: i64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PaymentTotalsReport {
    pub totals: Vec<PaymentStatusTotal>,
}
