//! Instruction implementations by category.

pub mod bcd;
pub mod bit_manip;
pub mod data_movement;
pub mod integer_arith;
pub mod logical;
pub mod mul_div;
pub mod shift_rotate;
