pub mod analysis;
pub mod month;
pub mod period;
pub mod selection;
pub mod views;
