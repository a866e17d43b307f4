//! Infrastructure layer - settings store implementations

pub mod storage;
