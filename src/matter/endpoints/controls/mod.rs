//! Control endpoints (read-write state).

pub mod on_off_switch;

pub use on_off_switch::OnOffSwitch;
