pub mod common_io;
pub mod effect_sizes;
pub mod expression;
pub mod input;
pub mod output;
pub mod sample_selection;
pub mod simulate;
