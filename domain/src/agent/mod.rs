//! Agent domain
//!
//! Agents are black-box reasoning collaborators. The domain only knows their
//! registry description ([`AgentSpec`](spec::AgentSpec)) and the shape of
//! what they return ([`AgentResult`](result::AgentResult)).

pub mod result;
pub mod spec;
pub mod value_objects;

pub use result::{AgentReply, AgentResult, AgentStatus};
pub use spec::AgentSpec;
pub use value_objects::{ActionId, AgentId};
