// core/src/models/mod.rs

//! Data structures shared by the services and the persistence collaborators.

pub mod cart;
pub mod catalog;
pub mod identity;
pub mod order;

pub use cart::{cart_total, parse_cart, CartLineItem};
pub use catalog::{Category, CategoryId, NewCategory, NewProduct, Product, ProductId, ProductPatch};
pub use identity::{Identity, NewUser, User, UserId};
pub use order::{NewOrder, NewOrderItem, Order, OrderId, OrderItem, OrderItemId, OrderStatus, OrderWithItems};
