//! Remainder kernel implementations.

pub mod portable;
pub mod wide_i32;

pub use portable::PortableKernel;
pub use wide_i32::WideRemainderKernel;
