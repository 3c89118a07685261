//! Storage Adapter - 片段文件存储

mod file_storage;

pub use file_storage::FileFragmentStorage;
