pub mod audit_logs;
pub mod bookings;
pub mod enums;
pub mod payments;
pub mod refresh_tokens;
pub mod reviews;
pub mod tour_categories;
pub mod tour_images;
pub mod tour_schedules;
pub mod tours;
pub mod users;

pub use audit_logs::Entity as AuditLogs;
pub use bookings::Entity as Bookings;
pub use payments::Entity as Payments;
pub use refresh_tokens::Entity as RefreshTokens;
pub use reviews::Entity as Reviews;
pub use tour_categories::Entity as TourCategories;
pub use tour_images::Entity as TourImages;
pub use tour_schedules::Entity as TourSchedules;
pub use tours::Entity as Tours;
pub use users::Entity as Users;
