//! Map store - block sequences, ownership registry, and the block mutator
//!
//! The store exclusively owns all block data. Personal maps live in their
//! own table keyed `personal_<connectionId>`; public maps are keyed by a
//! caller-supplied id outside that namespace and carry a display name and
//! a creator id. All mutation goes through [`MapStore::apply_block_update`],
//! which gates on edit authority and validates scale bounds before any
//! write.

use std::collections::HashMap;

use thiserror::Error;

use blockforge_protocol::{Block, BlockAction, BlockId, PERSONAL_MAP_PREFIX};

use crate::connections::ConnectionId;

/// Inclusive per-axis bounds for a `scale` mutation.
pub const SCALE_MIN: f64 = 0.1;
pub const SCALE_MAX: f64 = 10.0;

/// The personal map id owned by a connection.
pub fn personal_map_id(connection_id: ConnectionId) -> String {
    format!("{PERSONAL_MAP_PREFIX}{connection_id}")
}

/// Whether a map id lives in the personal namespace.
pub fn is_personal(map_id: &str) -> bool {
    map_id.starts_with(PERSONAL_MAP_PREFIX)
}

/// Rejected map operations. None of these reach the acting client; the hub
/// logs them and drops the request.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum EditError {
    /// Edit attempted against a public map by someone other than its creator
    #[error("connection {connection_id} may not edit map {map_id}")]
    Unauthorized {
        map_id: String,
        connection_id: ConnectionId,
    },

    /// Scale mutation with an axis outside the allowed bounds
    #[error("invalid scale for block {block_id} in map {map_id}")]
    InvalidScale { map_id: String, block_id: BlockId },

    /// Scale mutation targeting a block id the map does not contain
    #[error("block {block_id} not found in map {map_id}")]
    BlockNotFound { map_id: String, block_id: BlockId },

    /// Public map creation using the reserved personal prefix
    #[error("map id {map_id} uses the reserved personal prefix")]
    ReservedMapId { map_id: String },
}

/// Store of all personal and public maps plus the ownership registry.
#[derive(Debug, Default)]
pub struct MapStore {
    personal: HashMap<String, Vec<Block>>,
    public: HashMap<String, Vec<Block>>,
    /// Public map id -> creator connection id. Ownership is identity-based,
    /// not liveness-based: entries outlive their creator's connection.
    creators: HashMap<String, ConnectionId>,
    /// Display name -> public map id. A name maps to at most one live id;
    /// later creations with the same name overwrite the lookup.
    names: HashMap<String, String>,
}

impl MapStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create the empty personal map for a freshly connected client.
    ///
    /// Overwrites silently; only called at connect, where the key is new by
    /// construction (ids are never reused).
    pub fn create_personal(&mut self, connection_id: ConnectionId) -> String {
        let map_id = personal_map_id(connection_id);
        self.personal.insert(map_id.clone(), Vec::new());
        map_id
    }

    /// Drop a connection's personal map at disconnect.
    pub fn remove_personal(&mut self, connection_id: ConnectionId) {
        self.personal.remove(&personal_map_id(connection_id));
    }

    /// Create a named public map.
    ///
    /// Rejects ids in the personal namespace. Registers the creator and the
    /// name→id lookup, overwriting any prior mapping with the same name or
    /// id (shadowed maps stay reachable by raw id).
    pub fn create_public(
        &mut self,
        map_id: &str,
        name: &str,
        creator: ConnectionId,
        blocks: Vec<Block>,
    ) -> Result<(), EditError> {
        if is_personal(map_id) {
            return Err(EditError::ReservedMapId {
                map_id: map_id.to_string(),
            });
        }

        self.public.insert(map_id.to_string(), blocks);
        self.names.insert(name.to_string(), map_id.to_string());
        self.creators.insert(map_id.to_string(), creator);
        tracing::info!(map_id, name, creator, "Public map created");
        Ok(())
    }

    /// Current block sequence for a map, if it exists.
    pub fn get(&self, map_id: &str) -> Option<&Vec<Block>> {
        if is_personal(map_id) {
            self.personal.get(map_id)
        } else {
            self.public.get(map_id)
        }
    }

    /// Atomically swap a map's stored sequence.
    pub fn replace(&mut self, map_id: &str, blocks: Vec<Block>) {
        if is_personal(map_id) {
            self.personal.insert(map_id.to_string(), blocks);
        } else {
            self.public.insert(map_id.to_string(), blocks);
        }
    }

    /// Resolve a public display name to its map id, falling back to the
    /// literal string so raw ids (personal maps included) can be joined
    /// directly.
    pub fn resolve_display_name(&self, name: &str) -> String {
        self.names
            .get(name)
            .cloned()
            .unwrap_or_else(|| name.to_string())
    }

    /// Display names of all public maps, sorted for a stable listing.
    pub fn map_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.names.keys().cloned().collect();
        names.sort();
        names
    }

    pub fn creator(&self, map_id: &str) -> Option<ConnectionId> {
        self.creators.get(map_id).copied()
    }

    /// Edit authority for block mutations.
    ///
    /// Any personal-prefixed map id is editable by any connection, not just
    /// its owner. Known weak point, preserved deliberately; tightening it
    /// would change observable behavior clients rely on today.
    pub fn can_edit(&self, connection_id: ConnectionId, map_id: &str) -> bool {
        is_personal(map_id) || self.creator(map_id) == Some(connection_id)
    }

    /// Edit flag reported in `loadMap` replies: true for maps this
    /// connection created and for its own personal map. Stricter than
    /// [`Self::can_edit`] on foreign personal maps, by decision.
    pub fn can_edit_on_join(&self, connection_id: ConnectionId, map_id: &str) -> bool {
        self.creator(map_id) == Some(connection_id) || map_id == personal_map_id(connection_id)
    }

    /// Gate and apply one block mutation, writing the updated sequence back
    /// before returning. On success the returned block is the one to relay.
    pub fn apply_block_update(
        &mut self,
        connection_id: ConnectionId,
        map_id: &str,
        action: BlockAction,
        block: Block,
    ) -> Result<Block, EditError> {
        if !self.can_edit(connection_id, map_id) {
            return Err(EditError::Unauthorized {
                map_id: map_id.to_string(),
                connection_id,
            });
        }

        // A map id with no stored sequence mutates an empty one; personal
        // ids are created implicitly this way.
        let mut blocks = self.get(map_id).cloned().unwrap_or_default();

        match action {
            BlockAction::Add => {
                blocks.push(block.clone());
            }
            BlockAction::Remove => {
                // Silent no-op when nothing matches.
                blocks.retain(|b| b.id != block.id);
            }
            BlockAction::Scale => {
                let target = blocks
                    .iter_mut()
                    .find(|b| b.id == block.id)
                    .ok_or_else(|| EditError::BlockNotFound {
                        map_id: map_id.to_string(),
                        block_id: block.id.clone(),
                    })?;

                if block
                    .scale
                    .axes()
                    .iter()
                    .any(|axis| !(SCALE_MIN..=SCALE_MAX).contains(axis))
                {
                    return Err(EditError::InvalidScale {
                        map_id: map_id.to_string(),
                        block_id: block.id.clone(),
                    });
                }

                // Position is re-asserted from the payload, not validated.
                target.scale = block.scale;
                target.position = block.position;
            }
        }

        self.replace(map_id, blocks);
        Ok(block)
    }
}
