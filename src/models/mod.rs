pub mod commerce;
pub mod generation;
pub mod session;
pub mod upload;

pub use commerce::*;
pub use generation::*;
pub use session::*;
pub use upload::*;
