//! Pure data structures shared by the intake, notifier, tracker and relay layers.

pub mod announcement;
pub mod message;
pub mod order;

pub use announcement::*;
pub use message::*;
pub use order::*;
