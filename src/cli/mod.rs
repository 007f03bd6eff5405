pub mod history;
pub mod profile;
pub mod signup;
pub mod themes;
pub mod write;
