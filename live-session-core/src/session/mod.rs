pub mod controller;
pub mod handle;
