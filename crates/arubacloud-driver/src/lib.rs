//! ArubaCloud implementation of the machine `Driver` trait.

pub mod config;
pub mod driver;

pub use config::{CreateAction, DriverConfig};
pub use driver::ArubaCloudDriver;
