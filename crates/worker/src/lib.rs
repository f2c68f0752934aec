//! Background worker: the expiry sweep service.

pub mod sweep;

pub use sweep::ExpirySweep;
