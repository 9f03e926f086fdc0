pub mod actor;
pub mod complaint;
pub mod conversation;
pub mod ids;
pub mod link;
pub mod order;
pub mod org;
pub mod product;
pub mod staff;

pub use actor::*;
pub use complaint::*;
pub use conversation::*;
pub use ids::*;
pub use link::*;
pub use order::*;
pub use org::*;
pub use product::*;
pub use staff::*;
