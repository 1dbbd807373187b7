pub mod dispatch;
pub mod intent;
pub mod search;

pub use dispatch::*;
pub use intent::*;
pub use search::*;
