//! Domain value types shared by the store layer, the services and the HTTP layer.

pub mod frame;
pub mod sky;
pub mod star;
pub mod time;

pub use frame::*;
pub use sky::*;
pub use star::*;
pub use time::*;
