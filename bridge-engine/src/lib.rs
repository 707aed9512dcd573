pub mod classifier;
pub mod inbound;
pub mod meta;
pub mod outbound;
pub mod reconciler;
pub mod runtime;
