pub mod availability;
pub mod booking;
pub mod customer;
pub mod marquee;
pub mod staff;

pub use availability::AvailabilityRecord;
pub use booking::{Booking, BookingStatus, PaymentStatus};
pub use customer::Customer;
pub use marquee::Marquee;
pub use staff::Staff;
