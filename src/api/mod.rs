pub mod page;
pub mod response;

pub use page::{PageMeta, PageQuery, PageRequest};
pub use response::{ApiResponse, ApiResult};
