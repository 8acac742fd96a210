//! Command implementations.

pub mod convert;
pub mod inspect;
pub mod keygen;
pub mod verify;
pub mod verify_chain;
