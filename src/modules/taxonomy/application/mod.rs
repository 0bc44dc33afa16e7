pub mod inputs;
pub mod service;

pub use inputs::{NamedEntityListRequest, TAXONOMY_PAGE_SIZE};
pub use service::{NamedEntityPage, NamedEntityService};
