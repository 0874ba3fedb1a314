pub mod commands;
pub mod identity;
pub mod model;
pub mod otp;
pub mod password;
pub mod tokens;
