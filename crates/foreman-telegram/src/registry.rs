//! Short ids for structure paths used in callback data.
//!
//! Telegram limits callback data to 64 bytes, which a Cyrillic path exceeds
//! quickly. Buttons carry a numeric id instead.

use std::collections::HashMap;

/// Two-way map between paths and numeric ids. Ids are stable for the life
/// of the registry.
#[derive(Debug, Default)]
pub struct PathRegistry {
    ids: HashMap<String, u32>,
    paths: Vec<String>,
}

impl PathRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Id for `path`, assigning one on first use.
    pub fn id_for(&mut self, path: &str) -> u32 {
        if let Some(id) = self.ids.get(path) {
            return *id;
        }
        let id = self.paths.len() as u32;
        self.paths.push(path.to_string());
        self.ids.insert(path.to_string(), id);
        id
    }

    pub fn path_for(&self, id: u32) -> Option<&str> {
        self.paths.get(id as usize).map(String::as_str)
    }
}
