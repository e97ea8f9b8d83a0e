pub mod rag;
pub mod storage;
