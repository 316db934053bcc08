//! Infrastructure layer - database and file storage

pub mod media;
pub mod storage;
