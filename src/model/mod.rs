pub mod config;
pub mod resource;
pub mod scheduled;
pub mod template;
pub mod webhook;

pub use config::*;
pub use resource::*;
pub use scheduled::*;
pub use template::*;
pub use webhook::*;
