use std::collections::BTreeMap;

use crate::effects::motion::{Effect, Hold, SlideLeft, Zoom, ZoomDirection};

/// Name -> effect lookup. Unknown or absent names resolve to [`Effect::Hold`].
#[derive(Clone, Debug)]
pub struct EffectRegistry {
    by_name: BTreeMap<String, Effect>,
}

impl Default for EffectRegistry {
    fn default() -> Self {
        Self::standard()
    }
}

impl EffectRegistry {
    /// Registry without any named effects.
    pub fn empty() -> Self {
        Self {
            by_name: BTreeMap::new(),
        }
    }

    /// The built-in effect table.
    pub fn standard() -> Self {
        let zoom_in = Zoom {
            base: 1.0,
            rate: 1.002,
            direction: ZoomDirection::In,
        };
        let zoom_out = Zoom {
            base: 1.2,
            rate: 1.01,
            direction: ZoomDirection::Out,
        };
        let zoom_out_slow = Zoom {
            base: 1.2,
            rate: 1.002,
            direction: ZoomDirection::Out,
        };

        Self::empty()
            .with("zoomIn", Effect::Zoom(zoom_in))
            .with("zoomOut", Effect::Zoom(zoom_out))
            .with("zoomOutSlow", Effect::Zoom(zoom_out_slow))
            .with("slideLeftFast", Effect::SlideLeft(SlideLeft { speed: 1.0 }))
            .with("slideLeft", Effect::SlideLeft(SlideLeft { speed: 0.5 }))
            .with("slideLeftSlow", Effect::SlideLeft(SlideLeft { speed: 0.2 }))
    }

    /// Add or replace a named effect.
    pub fn with(mut self, name: impl Into<String>, effect: Effect) -> Self {
        self.by_name.insert(name.into(), effect);
        self
    }

    /// Look up an exact name.
    pub fn get(&self, name: &str) -> Option<Effect> {
        self.by_name.get(name).copied()
    }

    /// Resolve a clip's effect name, falling back to a static hold.
    pub fn resolve(&self, name: Option<&str>) -> Effect {
        let Some(name) = name else {
            return Effect::Hold(Hold);
        };
        match self.get(name) {
            Some(effect) => effect,
            None => {
                tracing::debug!(effect = name, "unrecognized effect, holding clip static");
                Effect::Hold(Hold)
            }
        }
    }

    /// Registered names in sorted order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.by_name.keys().map(String::as_str)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/effects/registry.rs"]
mod tests;
