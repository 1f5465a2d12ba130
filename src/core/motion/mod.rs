pub mod controller;
pub mod driver;
pub mod integrator;
pub mod listeners;
pub mod pump;
