mod loader;
mod model;

pub use loader::load_orders;
pub use model::{LineItem, OrderRecord};
