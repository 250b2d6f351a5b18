pub mod amount;
pub mod csv;
pub mod directory;
pub mod engine;
pub mod ledger;
pub mod model;

pub use amount::Amount;
pub use directory::Directory;
pub use engine::Engine;
pub use ledger::Ledger;
pub use model::{NewUser, Operation, UserId};
