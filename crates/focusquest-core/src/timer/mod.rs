mod clock;
mod phase;

pub use clock::{ClockStatus, PhaseClock};
pub use phase::Phase;
