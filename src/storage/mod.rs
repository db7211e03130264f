//!  Storage is organized through [key_value::KeyValueStore] and [gateway::PersistenceGateway].
//!  The basic idea is:
//!   - There is a storage directory with one json file per key.
//!   - The whole planner is a single json blob stored under one key.
//!   - Every save overwrites the blob, there is no merging.

pub mod gateway;
pub mod key_value;
