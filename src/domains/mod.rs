pub mod builders;
pub mod esg;
pub mod technical;

pub use esg::esg_plan;
pub use technical::technical_plan;
