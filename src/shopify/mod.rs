pub mod client;
pub mod session;

pub use client::ShopifyClient;
pub use session::{DesignSessionStore, DESIGN_KEY, DESIGN_NAMESPACE};
