//! Loading overlay state
//!
//! The overlay is shown for the initial page load only; subsequent
//! navigations render without it. The host owns the actual view and
//! animation; this tracks whether the overlay applies and which text to
//! show for a given load progress.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OverlayText {
    pub title: &'static str,
    pub subtitle: &'static str,
}

/// Text for a load-progress bucket. `None` once progress completes.
pub fn phase_text(progress: u8) -> Option<OverlayText> {
    let (title, subtitle) = match progress {
        0..=19 => ("Loading website...", "Connecting to server..."),
        20..=49 => ("Loading content...", "Downloading resources..."),
        50..=79 => ("Almost ready...", "Preparing interface..."),
        80..=99 => ("Finalizing...", "Setting up secure session..."),
        _ => return None,
    };

    Some(OverlayText { title, subtitle })
}

pub struct LoadingOverlay {
    visible: bool,
    initial_load: bool,
}

impl LoadingOverlay {
    pub fn new() -> Self {
        Self {
            visible: false,
            initial_load: true,
        }
    }

    /// Restore-path constructor: no overlay when the surface resumes with
    /// existing content.
    pub fn restored() -> Self {
        Self {
            visible: false,
            initial_load: false,
        }
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn is_initial_load(&self) -> bool {
        self.initial_load
    }

    pub fn on_page_started(&mut self) -> Option<OverlayText> {
        if !self.initial_load {
            return None;
        }

        self.visible = true;
        phase_text(0)
    }

    pub fn on_progress(&mut self, progress: u8) -> Option<OverlayText> {
        if !self.initial_load {
            return None;
        }

        phase_text(progress)
    }

    /// Completion text for the initial load. The host shows it briefly,
    /// then calls [`dismiss`](Self::dismiss).
    pub fn on_page_finished(&mut self) -> Option<OverlayText> {
        if !self.initial_load {
            return None;
        }

        Some(OverlayText {
            title: "Loading complete!",
            subtitle: "Welcome back",
        })
    }

    pub fn dismiss(&mut self) {
        self.visible = false;
        self.initial_load = false;
    }
}

impl Default for LoadingOverlay {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_progress_buckets() {
        assert_eq!(phase_text(0).unwrap().title, "Loading website...");
        assert_eq!(phase_text(19).unwrap().title, "Loading website...");
        assert_eq!(phase_text(20).unwrap().title, "Loading content...");
        assert_eq!(phase_text(79).unwrap().title, "Almost ready...");
        assert_eq!(phase_text(99).unwrap().title, "Finalizing...");
        assert!(phase_text(100).is_none());
    }

    #[test]
    fn test_overlay_only_for_initial_load() {
        let mut overlay = LoadingOverlay::new();

        assert!(overlay.on_page_started().is_some());
        assert!(overlay.is_visible());
        assert!(overlay.on_progress(50).is_some());
        assert!(overlay.on_page_finished().is_some());

        overlay.dismiss();
        assert!(!overlay.is_visible());

        // Subsequent navigations produce no overlay updates
        assert!(overlay.on_page_started().is_none());
        assert!(overlay.on_progress(50).is_none());
        assert!(overlay.on_page_finished().is_none());
        assert!(!overlay.is_visible());
    }

    #[test]
    fn test_restored_surface_skips_overlay() {
        let mut overlay = LoadingOverlay::restored();

        assert!(overlay.on_page_started().is_none());
        assert!(!overlay.is_visible());
    }
}
