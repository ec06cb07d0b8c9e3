pub mod amount_less;
pub mod trigger;

pub use amount_less::AmountLess;
pub use trigger::{make_trigger, Trigger, TriggerError, TriggerSpec, TriggerType};
