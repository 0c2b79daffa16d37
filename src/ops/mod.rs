pub mod history;
pub mod relay;
pub mod store;
pub mod validate;
