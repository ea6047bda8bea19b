pub mod adapters;
pub mod aggregator;
pub mod dedup;
pub mod events;
pub mod scope;
pub mod sequence;
pub mod throttle;

pub use adapters::{AdapterRegistry, ToolAdapter, ToolIcon};
pub use aggregator::ActivityAggregator;
pub use events::{Delivery, RenderEvent, ToolRenderBridge};
pub use throttle::ActivityHandle;
