//! Matter sensor bridge library.
//!
//! Exposes physical sensors and actuators as dynamic bridged Matter
//! endpoints: clamped device state, attribute dispatch, change reporting and
//! the begin/end endpoint lifecycle, all coordinated through one stack lock.

pub mod bridge;
pub mod config;
pub mod error;
pub mod input;
pub mod matter;
