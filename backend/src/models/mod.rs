pub mod day;
pub mod period;
pub mod registration;
pub mod settings;

pub use day::*;
pub use period::*;
pub use registration::*;
pub use settings::*;
