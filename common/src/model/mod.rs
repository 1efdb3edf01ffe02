pub mod batch;
pub mod content_type;
pub mod row;
