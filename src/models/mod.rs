pub mod card;
pub mod portfolio;
pub mod refresh;

pub use card::*;
pub use portfolio::*;
pub use refresh::*;
