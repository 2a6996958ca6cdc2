pub mod applications;
pub mod sponsors;
