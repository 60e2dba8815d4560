pub mod calculator;
pub mod customer;
pub mod lesson;
pub mod waitlist;

pub use calculator::Calculator;
pub use customer::{BetaSignup, Customer, NewCustomer};
pub use lesson::Lesson;
pub use waitlist::WaitlistEntry;
