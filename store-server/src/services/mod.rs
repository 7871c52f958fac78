//! Services Module
//!
//! Domain logic on top of the repositories: cart aggregation, order
//! submission, favorites, the live catalog feed, and the message bus
//! that ties write paths to the feed.

pub mod cart;
pub mod catalog;
pub mod favorite;
pub mod message_bus;
pub mod order;

pub use cart::{CartService, CartView, PricedCartLine, aggregate};
pub use catalog::CatalogFeed;
pub use favorite::FavoriteService;
pub use message_bus::{MessageBus, MessageBusService};
pub use order::{OrderService, OrderSubmission, SubmitState, order_total};
