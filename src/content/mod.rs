//! Content helpers: calendar planning and caption polishing

pub mod caption;
pub mod plan;

pub use caption::{prepare_description, CAPTION_SYSTEM_PROMPT};
pub use plan::{ContentIdea, PlanParameters, PostType};
