//! Keyframe tracks and the turntable keyers built on them.

pub mod turntable;

use serde::{Deserialize, Serialize};

use crate::error::{Result, RigError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Channel {
    Tx,
    Ty,
    Tz,
    Rx,
    Ry,
    Rz,
    Sx,
    Sy,
    Sz,
}

impl Channel {
    /// Everything "locking a transform" covers.
    pub const TRANSFORM: [Channel; 9] = [
        Channel::Tx,
        Channel::Ty,
        Channel::Tz,
        Channel::Rx,
        Channel::Ry,
        Channel::Rz,
        Channel::Sx,
        Channel::Sy,
        Channel::Sz,
    ];
    pub const TRANSLATE: [Channel; 3] = [Channel::Tx, Channel::Ty, Channel::Tz];

    pub fn as_str(&self) -> &'static str {
        match self {
            Channel::Tx => "tx",
            Channel::Ty => "ty",
            Channel::Tz => "tz",
            Channel::Rx => "rx",
            Channel::Ry => "ry",
            Channel::Rz => "rz",
            Channel::Sx => "sx",
            Channel::Sy => "sy",
            Channel::Sz => "sz",
        }
    }
}

impl std::fmt::Display for Channel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Key {
    pub frame: i32,
    pub value: f64,
}

/// Samples for one channel, frames strictly increasing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnimationTrack {
    keys: Vec<Key>,
}

impl AnimationTrack {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(n: usize) -> Self {
        Self { keys: Vec::with_capacity(n) }
    }

    pub fn push(&mut self, frame: i32, value: f64) -> Result<()> {
        if let Some(last) = self.keys.last() {
            if frame <= last.frame {
                return Err(RigError::NonMonotonicKey {
                    last: last.frame,
                    frame,
                });
            }
        }
        self.keys.push(Key { frame, value });
        Ok(())
    }

    /// Host-style keying: replaces a key on the same frame, otherwise inserts in order.
    pub fn insert(&mut self, frame: i32, value: f64) {
        match self.keys.binary_search_by_key(&frame, |k| k.frame) {
            Ok(i) => self.keys[i].value = value,
            Err(i) => self.keys.insert(i, Key { frame, value }),
        }
    }

    pub fn clear(&mut self) {
        self.keys.clear();
    }

    pub fn keys(&self) -> &[Key] {
        &self.keys
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn first(&self) -> Option<&Key> {
        self.keys.first()
    }

    pub fn last(&self) -> Option<&Key> {
        self.keys.last()
    }

    /// Exact sample at `frame`, if one was written.
    pub fn key_at(&self, frame: i32) -> Option<f64> {
        self.keys
            .binary_search_by_key(&frame, |k| k.frame)
            .ok()
            .map(|i| self.keys[i].value)
    }

    /// Evaluate the track: linear between keys, held flat outside them.
    pub fn value_at(&self, frame: f64) -> Option<f64> {
        let first = self.keys.first()?;
        let last = self.keys.last()?;
        if frame <= first.frame as f64 {
            return Some(first.value);
        }
        if frame >= last.frame as f64 {
            return Some(last.value);
        }
        let i = self.keys.partition_point(|k| (k.frame as f64) <= frame);
        let (a, b) = (self.keys[i - 1], self.keys[i]);
        let t = (frame - a.frame as f64) / (b.frame - a.frame) as f64;
        Some(a.value + (b.value - a.value) * t)
    }
}
