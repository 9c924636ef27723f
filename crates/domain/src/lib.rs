pub mod errors;
pub mod identifiers;
pub mod session;
pub mod todo;
pub mod validation;

pub use errors::*;
pub use identifiers::*;
pub use session::*;
pub use todo::*;
pub use validation::*;
