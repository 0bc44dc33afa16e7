pub mod pagination;
pub mod response;
pub mod sorting;

pub use pagination::{compose_page, Page, PageInfo, PageRequest};
pub use response::ApiResponse;
pub use sorting::SortOrder;
