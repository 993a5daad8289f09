pub mod ids;
pub mod money;
pub mod order;
pub mod product;
pub mod user;

pub use ids::*;
pub use money::*;
pub use order::*;
pub use product::*;
pub use user::*;
