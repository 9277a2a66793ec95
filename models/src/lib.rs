pub mod deployment;
pub mod promotion;
