pub mod category;
pub mod error;
pub mod item;
pub mod preset;

pub use category::Category;
pub use error::ReviewgenError;
pub use item::{GeneratedItem, ItemId, Rating};
pub use preset::Preset;
