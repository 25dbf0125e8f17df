pub mod activity;
pub mod announcement;
pub mod attendance;
pub mod audience;
pub mod grade;
pub mod schedule;
pub mod school;
pub mod user;

pub use activity::*;
pub use announcement::*;
pub use attendance::*;
pub use audience::{resolve, Role, Viewer};
pub use grade::*;
pub use schedule::*;
pub use school::*;
pub use user::*;
