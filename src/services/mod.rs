pub mod show_service;
pub use show_service::{ShowError, ShowService};

pub mod show_service_impl;
pub use show_service_impl::SeaOrmShowService;
