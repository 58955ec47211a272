//! Front-end side of the scheduler: a typed API client, the application state
//! it feeds, and the pure view derivations drawn from that state.

pub mod api;
pub mod controller;
pub mod gpa;
pub mod quiz;
pub mod state;
pub mod view;

pub use api::{ClientError, SchedulerApi, SchedulerClient};
pub use controller::Controller;
pub use state::{AppModel, Msg};
