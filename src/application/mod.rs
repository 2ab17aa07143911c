//! Application layer containing the bridge between host calls and the payment SDK.
//!
//! This module defines the `PaymentBridge`, which launches SDK flows, tracks one
//! pending call per operation kind, and settles each call from the activity
//! result the host delivers for it.

pub mod bridge;
