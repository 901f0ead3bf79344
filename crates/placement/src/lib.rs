//! Campus placement portal engine: eligibility evaluation, hiring-round
//! progression, and bulk shortlist transitions, exposed behind a service
//! facade and an axum router.

pub mod config;
pub mod error;
pub mod telemetry;
pub mod workflows;
