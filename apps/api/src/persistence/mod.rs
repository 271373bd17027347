// Datastore collaborator: optimization history and usage counters.
// Tables are owned by the datastore; only parameterised queries live here.

pub mod handlers;
pub mod history;
pub mod usage;
