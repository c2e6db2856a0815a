mod command;
mod controller;

pub use controller::AppleSimUtils;
