pub mod hop;
pub mod percentage;

pub use hop::Hop;
pub use percentage::Percentage;
