use std::collections::BTreeMap;
use std::f64::consts::PI;

use crate::foundation::error::{ClipLineError, ClipLineResult};

/// Easing functions used to map normalized fade progress.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum Ease {
    /// Linear interpolation.
    Linear,
    /// Quadratic ease-in.
    InQuad,
    /// Quadratic ease-out.
    OutQuad,
    /// Quadratic ease-in/out.
    InOutQuad,
    /// Cubic ease-in.
    InCubic,
    /// Cubic ease-out.
    OutCubic,
    /// Cubic ease-in/out.
    InOutCubic,
    /// Sinusoidal ease-in.
    InSine,
    /// Sinusoidal ease-out.
    OutSine,
    /// Sinusoidal ease-in/out.
    InOutSine,
    /// Exponential ease-in.
    InExpo,
    /// Exponential ease-out.
    OutExpo,
    /// Exponential ease-in/out.
    InOutExpo,
}

impl Ease {
    /// Every curve, in declaration order.
    pub const ALL: [Ease; 13] = [
        Self::Linear,
        Self::InQuad,
        Self::OutQuad,
        Self::InOutQuad,
        Self::InCubic,
        Self::OutCubic,
        Self::InOutCubic,
        Self::InSine,
        Self::OutSine,
        Self::InOutSine,
        Self::InExpo,
        Self::OutExpo,
        Self::InOutExpo,
    ];

    /// Apply this easing function to normalized progress `t` in `[0, 1]`.
    pub fn apply(self, t: f64) -> f64 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Self::Linear => t,
            Self::InQuad => t * t,
            Self::OutQuad => 1.0 - (1.0 - t) * (1.0 - t),
            Self::InOutQuad => {
                if t < 0.5 {
                    2.0 * t * t
                } else {
                    1.0 - ((-2.0 * t + 2.0).powi(2) / 2.0)
                }
            }
            Self::InCubic => t * t * t,
            Self::OutCubic => 1.0 - (1.0 - t).powi(3),
            Self::InOutCubic => {
                if t < 0.5 {
                    4.0 * t * t * t
                } else {
                    1.0 - ((-2.0 * t + 2.0).powi(3) / 2.0)
                }
            }
            Self::InSine => 1.0 - (t * PI / 2.0).cos(),
            Self::OutSine => (t * PI / 2.0).sin(),
            Self::InOutSine => -((PI * t).cos() - 1.0) / 2.0,
            Self::InExpo => {
                if t == 0.0 {
                    0.0
                } else {
                    2f64.powf(10.0 * t - 10.0)
                }
            }
            Self::OutExpo => {
                if t == 1.0 {
                    1.0
                } else {
                    1.0 - 2f64.powf(-10.0 * t)
                }
            }
            Self::InOutExpo => {
                if t == 0.0 {
                    0.0
                } else if t == 1.0 {
                    1.0
                } else if t < 0.5 {
                    2f64.powf(20.0 * t - 10.0) / 2.0
                } else {
                    (2.0 - 2f64.powf(-20.0 * t + 10.0)) / 2.0
                }
            }
        }
    }

    /// Short registry name for this curve (`l`, `qei`, `seio`, ...).
    pub fn short_name(self) -> &'static str {
        match self {
            Self::Linear => "l",
            Self::InQuad => "qei",
            Self::OutQuad => "qeo",
            Self::InOutQuad => "qeio",
            Self::InCubic => "cei",
            Self::OutCubic => "ceo",
            Self::InOutCubic => "ceio",
            Self::InSine => "sei",
            Self::OutSine => "seo",
            Self::InOutSine => "seio",
            Self::InExpo => "eei",
            Self::OutExpo => "eeo",
            Self::InOutExpo => "eeio",
        }
    }

    fn as_fn(self) -> EaseFn {
        match self {
            Self::Linear => |t| Ease::Linear.apply(t),
            Self::InQuad => |t| Ease::InQuad.apply(t),
            Self::OutQuad => |t| Ease::OutQuad.apply(t),
            Self::InOutQuad => |t| Ease::InOutQuad.apply(t),
            Self::InCubic => |t| Ease::InCubic.apply(t),
            Self::OutCubic => |t| Ease::OutCubic.apply(t),
            Self::InOutCubic => |t| Ease::InOutCubic.apply(t),
            Self::InSine => |t| Ease::InSine.apply(t),
            Self::OutSine => |t| Ease::OutSine.apply(t),
            Self::InOutSine => |t| Ease::InOutSine.apply(t),
            Self::InExpo => |t| Ease::InExpo.apply(t),
            Self::OutExpo => |t| Ease::OutExpo.apply(t),
            Self::InOutExpo => |t| Ease::InOutExpo.apply(t),
        }
    }
}

/// Progress-mapping function stored in an [`EaseRegistry`].
pub type EaseFn = fn(f64) -> f64;

/// Explicit name → easing function table.
///
/// Fades look curves up by name through a registry handed to them by the caller; there is no
/// global lookup. [`EaseRegistry::default`] registers every [`Ease`] under its short name
/// plus `linear`.
#[derive(Clone, Debug)]
pub struct EaseRegistry {
    fns: BTreeMap<String, EaseFn>,
}

impl Default for EaseRegistry {
    fn default() -> Self {
        let mut reg = Self::empty();
        for ease in Ease::ALL {
            reg.register(ease.short_name(), ease.as_fn());
        }
        reg.register("linear", Ease::Linear.as_fn());
        reg
    }
}

impl EaseRegistry {
    /// Registry with no functions.
    pub fn empty() -> Self {
        Self {
            fns: BTreeMap::new(),
        }
    }

    /// Register (or replace) a named easing function.
    pub fn register(&mut self, name: impl Into<String>, f: EaseFn) -> &mut Self {
        self.fns.insert(name.into(), f);
        self
    }

    /// Look up a function by name.
    pub fn get(&self, name: &str) -> Option<EaseFn> {
        self.fns.get(name).copied()
    }

    /// Registered names in sorted order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.fns.keys().map(String::as_str)
    }

    /// Map progress `t` through the named function.
    pub fn apply(&self, name: &str, t: f64) -> ClipLineResult<f64> {
        let f = self
            .get(name)
            .ok_or_else(|| ClipLineError::animation(format!("unknown easing function '{name}'")))?;
        Ok(f(t))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/animation/ease.rs"]
mod tests;
