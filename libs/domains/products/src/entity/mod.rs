//! SeaORM entities for `products` and `user_reactions`

pub mod product;
pub mod reaction;
