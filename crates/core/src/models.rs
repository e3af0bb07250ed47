//! Generation model registry.
//!
//! Submission validates the model key against this registry before any
//! network call, and the per-model credit cost seeds the job's cost
//! estimate.

use crate::job::JobKind;

/// A generation model the backend accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModelSpec {
    /// Wire key sent as `model_key`.
    pub key: &'static str,
    /// Human-readable label.
    pub label: &'static str,
    /// Kinds this model can serve.
    pub kinds: &'static [JobKind],
    /// Estimated cost per job, in credits.
    pub cost: u32,
}

/// Built-in model catalogue, mirrored from the backend's offering.
pub const MODELS: &[ModelSpec] = &[
    ModelSpec {
        key: "nano",
        label: "Nano (fast draft)",
        kinds: &[JobKind::TextToImage, JobKind::ImageToImage],
        cost: 1,
    },
    ModelSpec {
        key: "ultra",
        label: "Ultra (high detail)",
        kinds: &[JobKind::TextToImage, JobKind::ImageToImage],
        cost: 4,
    },
    ModelSpec {
        key: "motion-lite",
        label: "Motion Lite (short clips)",
        kinds: &[JobKind::TextToVideo, JobKind::ImageToVideo],
        cost: 10,
    },
    ModelSpec {
        key: "motion-pro",
        label: "Motion Pro (cinematic)",
        kinds: &[JobKind::TextToVideo, JobKind::ImageToVideo],
        cost: 25,
    },
];

/// Look up a model by key, restricted to models serving `kind`.
pub fn model_for(kind: JobKind, key: &str) -> Option<&'static ModelSpec> {
    MODELS
        .iter()
        .find(|m| m.key == key && m.kinds.contains(&kind))
}

/// All models serving a given kind, in catalogue order.
pub fn models_for(kind: JobKind) -> impl Iterator<Item = &'static ModelSpec> {
    MODELS.iter().filter(move |m| m.kinds.contains(&kind))
}
