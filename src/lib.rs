//! hashchain: a fixed-bucket hash map with singly-linked collision chains,
//! plus the line-oriented shell that drives it.
//!
//! Internal Design:
//!
//! Summary
//! - Layers:
//!   - `node`: chain nodes (key, value, next) stored in a `SlotMap` arena;
//!     links are generational `NodeId`s, so there is no per-node boxing and
//!     no raw pointer in the chain.
//!   - `hash`: the default `BuildHasher`, a positional weighted byte sum;
//!     keys are written as raw bytes so any `BuildHasher` can stand in.
//!   - `HashChain<V, S>`: the map. A fixed array of chain heads, the node
//!     arena, and an optional value destructor.
//!   - `repl`: the key/value prompt loop used by the `hashchain` binary.
//!
//! Constraints
//! - Single-threaded; the destructor is a boxed `FnMut` with no `Send`
//!   bound.
//! - Bucket count is fixed at construction. There is no rehashing; chains
//!   grow instead.
//! - Keys are text bounded to a configured byte length (1023 by default).
//!   Longer keys are truncated at a character boundary and the truncated
//!   form is the key for every operation.
//! - New keys append at the chain tail; overwrites replace the value in
//!   place.
//!
//! Ownership of values
//! - With a destructor registered, each value the map stops holding
//!   (overwrite or teardown) is passed to it exactly once.
//! - Without one, such values are dropped normally. Store a non-owning
//!   handle type to keep ownership outside the map.
//! - Teardown covers every entry of every chain, not only bucket heads, and
//!   runs from `Drop` as well as `destroy`.
//!
//! Failure
//! - Allocation exhaustion is the only failure of `set` and construction.
//!   It is reported through `SetError`/`BuildError` and leaves stored
//!   entries untouched.

pub mod config;
pub mod error;
pub mod hash;
pub mod hash_chain;
mod hash_chain_proptest;
pub mod node;
pub mod repl;

// Public surface
pub use config::MapConfig;
pub use error::{BuildError, SetError};
pub use hash::{WeightedSum, WeightedSumHasher};
pub use hash_chain::HashChain;
pub use node::NodeId;
pub use repl::Repl;
