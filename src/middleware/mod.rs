pub mod auth;
pub mod response;

pub use auth::{actor_middleware, CurrentActor};
pub use response::{ApiResponse, ApiResult};
