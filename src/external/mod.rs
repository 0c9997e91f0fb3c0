pub mod nominatim;
pub mod twilio;

pub use nominatim::*;
pub use twilio::*;
