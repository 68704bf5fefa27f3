pub mod normalize;
pub mod task_ops;
pub mod view;
