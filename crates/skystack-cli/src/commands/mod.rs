pub mod background;
pub mod config;
pub mod entropy;
pub mod median;
pub mod stack;
