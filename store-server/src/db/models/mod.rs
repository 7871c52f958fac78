//! Database Models

// Serde helpers
pub mod serde_helpers;

// Accounts
pub mod user;

// Catalog
pub mod product;

// Cart & Favorites
pub mod cart;
pub mod favorite;

// Orders
pub mod order;

// Re-exports
pub use cart::{CartAdd, CartLine, CartLineId, CartQuantityUpdate};
pub use favorite::Favorite;
pub use order::{
    Order, OrderContact, OrderFull, OrderId, OrderLine, OrderLineInput, OrderStatus,
    OrderStatusUpdate,
};
pub use product::{CATEGORY_ALL, Product, ProductCreate, ProductId, ProductUpdate};
pub use user::{Credential, User, UserId, UserUpdate};
