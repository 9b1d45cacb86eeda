//! Platform abstraction layer
//!
//! Arena layout query: the host reports how large the playfield currently is.

use crate::sim::Space;

/// Layout capability: current arena size in pixels
pub trait Viewport {
    fn arena_size(&self) -> Space;
}

/// Fixed-size arena for native runs and tests
#[derive(Debug, Clone, Copy)]
pub struct FixedViewport {
    pub space: Space,
}

impl FixedViewport {
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            space: Space::new(width, height),
        }
    }
}

impl Viewport for FixedViewport {
    fn arena_size(&self) -> Space {
        self.space
    }
}

#[cfg(target_arch = "wasm32")]
pub use web::DomViewport;

#[cfg(target_arch = "wasm32")]
mod web {
    use super::Viewport;
    use crate::sim::Space;

    /// Measures a DOM element's bounding rect
    #[derive(Debug, Clone)]
    pub struct DomViewport {
        selector: String,
    }

    impl Default for DomViewport {
        fn default() -> Self {
            Self::new(".space")
        }
    }

    impl DomViewport {
        pub fn new(selector: impl Into<String>) -> Self {
            Self {
                selector: selector.into(),
            }
        }
    }

    impl Viewport for DomViewport {
        fn arena_size(&self) -> Space {
            let rect = web_sys::window()
                .and_then(|w| w.document())
                .and_then(|d| d.query_selector(&self.selector).ok().flatten())
                .map(|el| el.get_bounding_client_rect());

            match rect {
                Some(rect) => Space::new(rect.width() as f32, rect.height() as f32),
                None => {
                    log::warn!("Arena element {} not found", self.selector);
                    Space::default()
                }
            }
        }
    }
}

/// Scale factor of an arena against the reference size.
///
/// The long side is compared with the reference width and the short side with
/// the reference height, so portrait screens scale like landscape ones. Each
/// ratio is capped at 1: large arenas never scale up.
pub fn arena_scale(space: Space, reference: Space) -> f32 {
    let long = space.width.max(space.height);
    let short = space.width.min(space.height);

    let scx = if long < reference.width {
        long / reference.width
    } else {
        1.0
    };
    let scy = if short < reference.height {
        short / reference.height
    } else {
        1.0
    };

    scx.min(scy)
}
