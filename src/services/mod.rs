pub mod availability;
pub mod booking;
pub mod completion;
pub mod pricing;
pub mod search;
pub mod seed;
