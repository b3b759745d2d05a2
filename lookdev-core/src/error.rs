use std::path::PathBuf;

use thiserror::Error;

/// Failures reported by a [`crate::scene::SceneGraph`] implementation.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SceneError {
    #[error("node not found: {0}")]
    NodeNotFound(String),
    #[error("node '{name}' already exists under {parent}")]
    DuplicateName { parent: String, name: String },
    #[error("channel '{channel}' on {node} is locked")]
    ChannelLocked { node: String, channel: String },
    #[error("node {0} has no geometry to measure")]
    NoGeometry(String),
    #[error("unknown parameter '{param}' on {node}")]
    UnknownParameter { node: String, param: String },
    #[error("host error: {0}")]
    Host(String),
}

#[derive(Debug, Error)]
pub enum RigError {
    #[error("invalid HDRI path: {0:?}")]
    InvalidHdriPath(PathBuf),
    #[error("no subject geometry designated")]
    NoSubject,
    #[error("subject not found in scene: {0}")]
    SubjectNotFound(String),
    #[error("start frame must be >= 1 (got {0})")]
    InvalidStartFrame(i32),
    #[error("keyframe at frame {frame} does not follow frame {last}")]
    NonMonotonicKey { last: i32, frame: i32 },
    #[error("plan node {node} depends on {missing}, which is neither planned nor present")]
    UnresolvedDependency { node: String, missing: String },
    #[error("plan has a dependency cycle through {0}")]
    DependencyCycle(String),
    #[error("failed to apply {path}: {source}")]
    Apply {
        path: String,
        #[source]
        source: SceneError,
    },
    #[error(transparent)]
    Scene(#[from] SceneError),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

pub type Result<T, E = RigError> = std::result::Result<T, E>;
