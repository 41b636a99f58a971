pub mod history;
pub mod pages;
pub mod projection;
pub mod snapshot;
