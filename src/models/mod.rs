//! Entity types for the service.

pub mod achievement;
pub mod event;
pub mod material;
pub mod space;
pub mod user;

pub use achievement::{Achievement, Collection};
pub use event::{Event, EventKind, EventStatus};
pub use material::{Material, MaterialCategory, MaterialStatus};
pub use space::{Space, SpaceKind};
pub use user::{Notification, NotificationKind, Role, User, UserStatus};
