pub mod extraction;
pub mod ports;
pub mod services;
