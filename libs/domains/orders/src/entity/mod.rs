//! SeaORM entities for `cart_lines`, `orders` and `order_lines`

pub mod cart_line;
pub mod order;
pub mod order_line;
