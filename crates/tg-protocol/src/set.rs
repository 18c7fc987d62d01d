//! Published tunnel set
//!
//! The exact payload written to and read from the shared gist: a JSON object
//! keyed by tunnel name, each value a [`TunnelDescriptor`].

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::descriptor::TunnelDescriptor;
use crate::error::ProtocolError;

/// Mapping of tunnel name to descriptor
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PublishedTunnelSet(BTreeMap<String, TunnelDescriptor>);

impl PublishedTunnelSet {
    /// Create an empty set
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a descriptor under its own name, replacing any previous entry
    pub fn insert(&mut self, descriptor: TunnelDescriptor) -> Option<TunnelDescriptor> {
        self.0.insert(descriptor.name.clone(), descriptor)
    }

    /// Look up a descriptor by tunnel name
    pub fn get(&self, name: &str) -> Option<&TunnelDescriptor> {
        self.0.get(name)
    }

    /// Number of tunnels in the set
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the set is empty
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate over descriptors in name order
    pub fn iter(&self) -> impl Iterator<Item = &TunnelDescriptor> {
        self.0.values()
    }

    /// Tunnel names in the set
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    /// Serialize to the compact JSON form stored in the gist
    pub fn encode(&self) -> Result<String, ProtocolError> {
        serde_json::to_string(self).map_err(ProtocolError::Encode)
    }

    /// Parse a stored payload.
    ///
    /// Descriptors without a `name` field take the name of their key.
    pub fn decode(content: &str) -> Result<Self, ProtocolError> {
        let mut map: BTreeMap<String, TunnelDescriptor> =
            serde_json::from_str(content).map_err(ProtocolError::Decode)?;

        for (key, descriptor) in map.iter_mut() {
            if descriptor.name.is_empty() {
                descriptor.name = key.clone();
            }
        }

        Ok(Self(map))
    }
}

impl FromIterator<TunnelDescriptor> for PublishedTunnelSet {
    fn from_iter<I: IntoIterator<Item = TunnelDescriptor>>(iter: I) -> Self {
        let mut set = Self::new();
        for descriptor in iter {
            set.insert(descriptor);
        }
        set
    }
}
