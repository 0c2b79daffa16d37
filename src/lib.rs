pub mod cli;
pub mod dispatch;
pub mod io;
pub mod model;
pub mod ops;
pub mod util;
