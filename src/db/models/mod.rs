//! Data models

pub mod category;
pub mod order;
pub mod product;
pub mod serde_helpers;
pub mod user;

pub use category::{Category, CategoryCreate, CategoryId, CategoryUpdate};
pub use order::{
    Order, OrderCreate, OrderId, OrderItem, OrderItemInput, OrderStatus, PaymentResult,
    ShippingAddress, StatusUpdate,
};
pub use product::{Product, ProductCreate, ProductId, ProductUpdate, Review, ReviewCreate};
pub use user::{Address, ProfileUpdate, Role, User, UserCreate, UserId, UserInfo};
