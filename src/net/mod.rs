pub mod api;
pub mod fetch;
pub mod geocode;
