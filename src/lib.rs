pub mod auth;
pub mod debounce;
pub mod form;
pub mod geo;
pub mod net;
pub mod report;
