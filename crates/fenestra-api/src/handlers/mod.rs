//! Handler modules for fenestra-api.

pub mod windows;
