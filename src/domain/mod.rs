//! Domain layer: value objects, result translation and the ports through which
//! the bridge talks to the payment SDK and the host UI.

pub mod card;
pub mod completion;
pub mod config;
pub mod intent;
pub mod operation;
pub mod outcome;
pub mod payment_method;
pub mod ports;
