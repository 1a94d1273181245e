pub mod course;
pub mod enrollment;
pub mod memo;
pub mod review;
pub mod user;

pub use course::{Course, CourseForm, Level};
pub use enrollment::Enrollment;
pub use memo::{Memo, NewMemo};
pub use review::{NewReview, Review, MAX_RATING, MIN_RATING};
pub use user::User;
