pub mod http;
pub mod media;
pub mod storage;
