pub mod systick;
pub mod timer;

pub use systick::Systick;
pub use timer::{Delay, Timer};
