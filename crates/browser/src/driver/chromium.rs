pub mod fault;
pub mod session;
pub mod wait;

pub use fault::FaultPlan;
pub use session::ChromiumDriver;
pub use wait::PageStability;
