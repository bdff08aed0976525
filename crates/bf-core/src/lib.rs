pub mod config;
pub mod error;
pub mod id;
pub mod meta;
pub mod model;
pub mod query;
pub mod renumber;
pub mod sequence;

pub use config::{FontName, NotifyTimeouts, PluginConfig};
pub use error::{BfError, Result};
pub use id::{NodeId, SequenceId};
pub use meta::MetadataStore;
pub use model::*;
pub use query::{find_sequence, next_number};
pub use renumber::{Assignment, Renumber, RenumberPlan, plan_renumber};
pub use sequence::{derive_sequence_id, new_sequence_id};
