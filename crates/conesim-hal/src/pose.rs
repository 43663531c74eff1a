//! Vehicle pose, owned and updated by the vehicle side and read-only to
//! perception.

use std::sync::{PoisonError, RwLock};

use conesim_types::Pose;

/// Anything that can report the current vehicle pose.
pub trait PoseSource: Send + Sync {
    fn pose(&self) -> Pose;
}

/// A fixed pose.
impl PoseSource for Pose {
    fn pose(&self) -> Pose {
        *self
    }
}

/// Lock-protected pose shared between the vehicle model (writer) and the
/// perception task (reader).  Readers always see a whole pose.
#[derive(Debug, Default)]
pub struct SharedPose(RwLock<Pose>);

impl SharedPose {
    pub fn new(initial: Pose) -> Self {
        Self(RwLock::new(initial))
    }

    /// Replace the current pose.
    pub fn set(&self, pose: Pose) {
        *self.0.write().unwrap_or_else(PoisonError::into_inner) = pose;
    }
}

impl PoseSource for SharedPose {
    fn pose(&self) -> Pose {
        *self.0.read().unwrap_or_else(PoisonError::into_inner)
    }
}
