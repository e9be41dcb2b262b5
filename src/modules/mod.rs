pub mod clip;
pub mod reel;
