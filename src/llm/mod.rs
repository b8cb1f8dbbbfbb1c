pub mod broker;
pub mod completion;
pub mod keywords;
pub mod query_expand;
pub mod summary;
