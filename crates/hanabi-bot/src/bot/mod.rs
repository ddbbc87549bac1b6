mod hints;

pub use hints::HintPlanner;
