//! Detection of libraries actually present in the host application.

use crate::library::Library;
use std::collections::HashSet;

/// Infers which of the known libraries are in use.
///
/// May be slow; the registry calls it at most once per resolution pass and
/// only when the detection cache cannot answer.
pub trait Detector {
    fn detect(&self, known: &[Library]) -> Vec<Library>;
}

impl<F> Detector for F
where
    F: Fn(&[Library]) -> Vec<Library>,
{
    fn detect(&self, known: &[Library]) -> Vec<Library> {
        self(known)
    }
}

/// Detects nothing. Used when no detector is configured.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoDetection;

impl Detector for NoDetection {
    fn detect(&self, _known: &[Library]) -> Vec<Library> {
        Vec::new()
    }
}

/// Detects a library when its class path is among the present ones.
#[derive(Debug, Clone, Default)]
pub struct ClassPathDetector {
    present: HashSet<String>,
}

impl ClassPathDetector {
    pub fn new<I, S>(present: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            present: present.into_iter().map(Into::into).collect(),
        }
    }
}

impl Detector for ClassPathDetector {
    fn detect(&self, known: &[Library]) -> Vec<Library> {
        known
            .iter()
            .filter(|lib| !lib.class_path.is_empty() && self.present.contains(&lib.class_path))
            .cloned()
            .collect()
    }
}
