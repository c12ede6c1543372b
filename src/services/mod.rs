pub mod budget;
pub mod feed;
pub mod itinerary;
pub mod packing;
pub mod rates;
pub mod schedule;
pub mod trips;
pub mod weather;
