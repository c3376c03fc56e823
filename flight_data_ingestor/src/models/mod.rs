pub mod days;
pub mod direction;
pub mod flight;
pub mod live;
pub mod schedule;
