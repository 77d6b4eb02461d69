pub mod adjustments;
pub mod catalog;
pub mod filters;
pub mod frames;
pub mod progress;
pub mod transform;
