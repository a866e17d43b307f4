//! API layer - native client and REST surface

pub mod native {
    pub mod client;
    pub use client::NativeClient;
}
pub mod rest;
