// Subsystem facade
//
// One generic read/write view over a slice of the point registry,
// scoped to a device index and carrying the subsystem's processor
// table. Views are cheap and created per access; they borrow the
// client and share its HTTP connection and session token.

use std::collections::HashMap;

use indexmap::IndexMap;
use serde::Serialize;

use crate::client::UnityClient;
use crate::error::Error;
use crate::points::{self, PointGroup, PointNode, Resolved};
use crate::process::ProcessorTable;
use crate::wire::{self, SetValue};

/// A processed point reading, shaped like the registry that produced it.
///
/// `Value(None)` means the card's response did not include the point.
/// Serializes to the plain nested string structure dashboards expect.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Reading {
    Value(Option<String>),
    Group(IndexMap<String, Reading>),
}

impl Reading {
    /// The string value, if this is a present leaf reading.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Value(value) => value.as_deref(),
            Self::Group(_) => None,
        }
    }

    /// The nested group, if this is a category reading.
    pub fn as_group(&self) -> Option<&IndexMap<String, Reading>> {
        match self {
            Self::Group(group) => Some(group),
            Self::Value(_) => None,
        }
    }
}

/// Read/write facade over one subsystem's slice of the point map.
#[derive(Clone, Copy)]
pub struct Subsystem<'a> {
    client: &'a UnityClient,
    map: PointGroup,
    processors: ProcessorTable,
    dev_id: u32,
}

impl<'a> Subsystem<'a> {
    pub(crate) fn new(
        client: &'a UnityClient,
        map: PointGroup,
        processors: ProcessorTable,
        dev_id: u32,
    ) -> Self {
        Self {
            client,
            map,
            processors,
            dev_id,
        }
    }

    /// Rescope the view to a different device index.
    pub fn at_device(mut self, dev_id: u32) -> Self {
        self.dev_id = dev_id;
        self
    }

    /// The point-map slice this view covers.
    pub fn map(&self) -> PointGroup {
        self.map
    }

    /// Resolve an attribute name to a point, a category, or nothing.
    pub fn lookup(&self, name: &str) -> Resolved {
        points::lookup(self.map, name)
    }

    /// Narrow the view to a nested category (`status`, `event`,
    /// `settings`). The category keeps this subsystem's processors.
    pub fn category(&self, name: &str) -> Result<Subsystem<'a>, Error> {
        for (key, node) in self.map {
            if *key == name {
                if let PointNode::Group(nested) = *node {
                    return Ok(Subsystem::new(
                        self.client,
                        nested,
                        self.processors,
                        self.dev_id,
                    ));
                }
            }
        }
        Err(Error::UnknownAttribute {
            name: name.to_owned(),
        })
    }

    /// Read one attribute.
    ///
    /// Issues a single-point read, substitutes the placeholder for the
    /// card's unsupported-value sentinel, and applies the attribute's
    /// processor if one is registered. `Ok(None)` means the card's
    /// response did not include the point.
    pub async fn get(&self, name: &str) -> Result<Option<String>, Error> {
        let Resolved::Point(point) = self.lookup(name) else {
            return Err(Error::UnknownAttribute {
                name: name.to_owned(),
            });
        };

        let data = self.client.get_data(&[point], self.dev_id).await?;
        let mut value = normalize(data.get(point).cloned());
        if let Some(processor) = self.processor(name) {
            // single reads carry no sibling group
            value = processor(value.as_deref(), &IndexMap::new());
        }
        Ok(value)
    }

    /// Write one attribute.
    pub async fn set(&self, name: &str, value: impl Into<SetValue>) -> Result<(), Error> {
        let Resolved::Point(point) = self.lookup(name) else {
            return Err(Error::UnknownAttribute {
                name: name.to_owned(),
            });
        };
        self.client
            .set_data(&[(point, value.into())], self.dev_id)
            .await
    }

    /// Read every point in the subsystem with one batched call and
    /// rebuild the registry's nested shape with processed values.
    pub async fn get_all(&self) -> Result<IndexMap<String, Reading>, Error> {
        let leaves = points::leaf_points(self.map);
        let data = self.client.get_data(&leaves, self.dev_id).await?;
        Ok(self.build_group(self.map, &data))
    }

    fn build_group(
        &self,
        group: PointGroup,
        data: &HashMap<String, String>,
    ) -> IndexMap<String, Reading> {
        let mut result = IndexMap::new();
        for (name, node) in group {
            let reading = match *node {
                PointNode::Group(nested) => Reading::Group(self.build_group(nested, data)),
                PointNode::Point(point) => {
                    let mut value = normalize(data.get(point).cloned());
                    if let Some(processor) = self.processor(name) {
                        // processors see the siblings built so far, in
                        // declared order (pf reads watts/va this way)
                        value = processor(value.as_deref(), &result);
                    }
                    Reading::Value(value)
                }
            };
            result.insert((*name).to_owned(), reading);
        }
        result
    }

    fn processor(&self, name: &str) -> Option<crate::process::Processor> {
        self.processors
            .iter()
            .find(|(key, _)| *key == name)
            .map(|(_, processor)| *processor)
    }
}

fn normalize(value: Option<String>) -> Option<String> {
    match value {
        Some(v) if v == wire::NO_SUPPORT => Some(wire::PLACEHOLDER.to_owned()),
        other => other,
    }
}
