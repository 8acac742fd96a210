//! Trust delegation engine.
//!
//! Root key sets, root-signed node key lists, and chained signatures from
//! ephemeral keys. Each engine reads and writes through the store handle it is
//! given; the caller picks the namespace.

mod chain;
mod node_keys;
mod records;
mod root_keys;
mod session;

pub use chain::{delegate, verify_chain, verify_chain_with};
pub use node_keys::NodeKeyList;
pub use records::{NodeKeyEntry, NodeKeyRecord, RootKeyEntry, RootKeyRecord, RECORD_VERSION};
pub use root_keys::{RootKeyProposal, RootKeySet};
pub use session::{
    ExportedAdminKey, ExportedState, RootKeySession, ROOT_KEY_USER_ID, TEMP_KEY_USER_ID,
};
