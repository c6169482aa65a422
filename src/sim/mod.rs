pub mod clock;
pub mod event;
pub mod register;
pub mod session;
pub mod step;
pub mod world;
