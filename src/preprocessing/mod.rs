//! Data preprocessing module
//!
//! Feature scaling (standard, min-max, robust, max-abs) usable as a
//! pipeline step. Missing-value filling and categorical encoding happen
//! while preparing the frame, see [`crate::data`].

mod scaler;

pub use scaler::{Scaler, ScalerType};
