//! Core math modules.

pub mod stable;
pub mod grid;
pub mod beta;
pub mod normal;
pub mod posterior;
pub mod optimize;
pub mod mode;
pub mod quadratic;
pub mod compare;
pub mod interval;
