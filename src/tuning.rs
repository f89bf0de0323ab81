//! Physics tuning and per-variant presets
//!
//! Loaded from JSON so the desktop and AR builds can share one core.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::consts::*;

/// What happens when the ball drops below the floor
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BoundsPolicy {
    /// Move the player to where the ball landed; ball back in hand at eye height
    RespawnAtContact { eye_height: f32 },
    /// Ball snaps back to the thrower and rests there
    ReturnToThrower,
}

impl Default for BoundsPolicy {
    fn default() -> Self {
        BoundsPolicy::RespawnAtContact {
            eye_height: CAMERA_HEIGHT,
        }
    }
}

/// Build variants of the minigame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum Variant {
    /// Pointer-lock aiming with the mouse
    #[default]
    Desktop,
    /// Phone/tablet AR, throw along the view direction
    HandheldAr,
    /// Headset AR, throw along the controller ray
    ControllerAr,
}

impl Variant {
    pub fn as_str(&self) -> &'static str {
        match self {
            Variant::Desktop => "Desktop",
            Variant::HandheldAr => "HandheldAr",
            Variant::ControllerAr => "ControllerAr",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "desktop" | "pointer" => Some(Variant::Desktop),
            "handheldar" | "handheld" | "ar" => Some(Variant::HandheldAr),
            "controllerar" | "controller" | "xr" => Some(Variant::ControllerAr),
            _ => None,
        }
    }

    /// Physics substeps per frame for this variant
    pub fn steps_per_frame(&self) -> u32 {
        match self {
            Variant::Desktop => STEPS_PER_FRAME,
            Variant::HandheldAr => 4,
            Variant::ControllerAr => 2,
        }
    }

    pub fn bounds_policy(&self) -> BoundsPolicy {
        match self {
            Variant::Desktop => BoundsPolicy::default(),
            Variant::HandheldAr | Variant::ControllerAr => BoundsPolicy::ReturnToThrower,
        }
    }
}

/// Simulation constants
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    /// Downward acceleration while airborne (units/s²)
    pub gravity: f32,
    /// Exponential velocity decay rate (1/s)
    pub damping_rate: f32,
    /// Multiplier on the removed normal velocity at contact
    pub bounce_coefficient: f32,
    /// Added to the throw direction's y before scaling
    pub lob_bias: f32,
    /// Substeps per frame
    pub steps_per_frame: u32,
    /// Frame time clamp before substep division (seconds)
    pub max_frame_dt: f32,
    /// Ball bottom below this height is out of bounds
    pub floor_height: f32,
    pub bounds_policy: BoundsPolicy,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            gravity: GRAVITY,
            damping_rate: DAMPING_RATE,
            bounce_coefficient: BOUNCE_COEFFICIENT,
            lob_bias: LOB_BIAS,
            steps_per_frame: STEPS_PER_FRAME,
            max_frame_dt: MAX_FRAME_DT,
            floor_height: FLOOR_HEIGHT,
            bounds_policy: BoundsPolicy::default(),
        }
    }
}

impl Tuning {
    /// Defaults with the variant's step count and bounds policy
    pub fn from_variant(variant: Variant) -> Self {
        Self {
            steps_per_frame: variant.steps_per_frame(),
            bounds_policy: variant.bounds_policy(),
            ..Self::default()
        }
    }

    /// Parse a (possibly partial) JSON document; missing fields use defaults
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let tuning: Tuning = serde_json::from_str(json)?;
        Ok(tuning.sanitized())
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Load tuning from a JSON file, falling back to defaults
    pub fn load(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        match std::fs::read_to_string(path) {
            Ok(json) => match Self::from_json(&json) {
                Ok(tuning) => {
                    log::info!("Loaded tuning from {}", path.display());
                    tuning
                }
                Err(e) => {
                    log::warn!("Invalid tuning in {}: {} - using defaults", path.display(), e);
                    Self::default()
                }
            },
            Err(e) => {
                log::warn!("Could not read {}: {} - using defaults", path.display(), e);
                Self::default()
            }
        }
    }

    /// Clamp values the frame loop cannot work with
    pub fn sanitized(mut self) -> Self {
        if self.steps_per_frame == 0 {
            log::warn!("steps_per_frame must be at least 1");
            self.steps_per_frame = 1;
        }
        if !(self.max_frame_dt.is_finite() && self.max_frame_dt > 0.0) {
            log::warn!("max_frame_dt {} is invalid, using {}", self.max_frame_dt, MAX_FRAME_DT);
            self.max_frame_dt = MAX_FRAME_DT;
        }
        self
    }
}
