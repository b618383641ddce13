pub mod error;
pub mod jwt;
pub mod locale;

pub use error::{ApiError, ApiResult};
pub use jwt::JwtUtil;
pub use locale::Locale;
