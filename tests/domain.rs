use chrono::Duration;
use uuid::Uuid;

use axum_tour_api::{
    entity::enums::{BookingStatus, PaymentMethod},
    middleware::auth::AccessScope,
    response::Pagination,
    services::auth_service::{decode_claims, issue_token},
    services::booking_service::compute_total_price,
    services::payment_service::{GatewayOutcome, gateway_outcome, webhook_signature},
};

#[test]
fn child_fare_is_seventy_percent() {
    // The documented scenario: 1,000,000 x (2 adults + 1 child) = 2,700,000.
    assert_eq!(compute_total_price(1_000_000, 2, 1), 2_700_000);
    assert_eq!(compute_total_price(1_000_000, 1, 0), 1_000_000);
    assert_eq!(compute_total_price(500, 0, 2), 700);
    // Integer arithmetic truncates the child fare.
    assert_eq!(compute_total_price(99, 1, 1), 99 + 69);
}

#[test]
fn gateway_status_mapping() {
    assert_eq!(gateway_outcome("SUCCESS"), GatewayOutcome::Confirm);
    assert_eq!(gateway_outcome("00"), GatewayOutcome::Confirm);
    assert_eq!(gateway_outcome("01"), GatewayOutcome::Cancel);
    assert_eq!(gateway_outcome("FAILED"), GatewayOutcome::Cancel);
    assert_eq!(gateway_outcome(""), GatewayOutcome::Cancel);
}

#[test]
fn webhook_signature_is_deterministic_and_keyed() {
    let a = webhook_signature("TXN1", "00", "secret");
    let b = webhook_signature("TXN1", "00", "secret");
    let c = webhook_signature("TXN1", "00", "other-secret");
    let d = webhook_signature("TXN2", "00", "secret");
    assert_eq!(a, b);
    assert_ne!(a, c);
    assert_ne!(a, d);
    assert_eq!(a.len(), 64);
    assert!(a.chars().all(|ch| ch.is_ascii_hexdigit()));
}

#[test]
fn access_scope_permits() {
    let me = Uuid::new_v4();
    let someone_else = Uuid::new_v4();

    let owner = AccessScope::Owner(me);
    assert!(owner.permits(me));
    assert!(!owner.permits(someone_else));
    assert_eq!(owner.user_id(), Some(me));

    let admin = AccessScope::Unrestricted;
    assert!(admin.permits(me));
    assert!(admin.permits(someone_else));
    assert_eq!(admin.user_id(), None);
}

#[test]
fn pagination_total_pages() {
    assert_eq!(Pagination::new(1, 20, 0).total_pages, 0);
    assert_eq!(Pagination::new(1, 20, 20).total_pages, 1);
    assert_eq!(Pagination::new(2, 20, 41).total_pages, 3);
}

#[test]
fn token_roundtrip_and_rejection() {
    let user_id = Uuid::new_v4();
    let token = issue_token(
        user_id,
        "a@x.com",
        "USER",
        Duration::minutes(5),
        "test-secret",
    )
    .expect("token issued");

    let claims = decode_claims(&token, "test-secret").expect("token decodes");
    assert_eq!(claims.sub, user_id.to_string());
    assert_eq!(claims.email, "a@x.com");
    assert_eq!(claims.role, "USER");

    assert!(decode_claims(&token, "wrong-secret").is_err());
    assert!(decode_claims("not-a-token", "test-secret").is_err());

    let expired = issue_token(
        user_id,
        "a@x.com",
        "USER",
        Duration::minutes(-10),
        "test-secret",
    )
    .expect("token issued");
    assert!(decode_claims(&expired, "test-secret").is_err());
}

#[test]
fn booking_status_terminality() {
    assert!(!BookingStatus::Pending.is_terminal());
    assert!(!BookingStatus::Confirmed.is_terminal());
    assert!(BookingStatus::Cancelled.is_terminal());
    assert!(BookingStatus::Completed.is_terminal());
}

#[test]
fn status_enums_serialize_screaming() {
    assert_eq!(
        serde_json::to_string(&BookingStatus::Pending).unwrap(),
        "\"PENDING\""
    );
    assert_eq!(
        serde_json::to_string(&PaymentMethod::EWallet).unwrap(),
        "\"E_WALLET\""
    );
    assert_eq!(
        serde_json::to_string(&PaymentMethod::BankTransfer).unwrap(),
        "\"BANK_TRANSFER\""
    );
}
