pub mod classes_service;
pub mod error;
pub mod memo_service;
pub mod review_service;

pub use classes_service::ClassesService;
pub use error::{ServiceError, ServiceResult};
pub use memo_service::MemoService;
pub use review_service::{review_eligibility, Ineligible, ReviewService};
