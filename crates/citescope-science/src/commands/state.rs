use serde::Serialize;

/// Lifecycle of one popup session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PopupState {
    Idle,
    LoadingStyles,
    StylesReady,
    /// Style list unavailable; the default style is offered and the popup stays usable.
    StylesFallback,
    AwaitingUserAction,
    ManualFetch,
    /// Detected identifiers are listed and can be activated.
    AutoDetect,
    Rendered,
}

impl PopupState {
    pub fn can_transition_to(self, next: PopupState) -> bool {
        use PopupState::*;
        matches!(
            (self, next),
            (Idle, LoadingStyles)
                | (LoadingStyles, StylesReady | StylesFallback)
                | (StylesReady | StylesFallback, AwaitingUserAction)
                | (AwaitingUserAction | AutoDetect | Rendered, ManualFetch | AutoDetect)
                | (ManualFetch | AutoDetect | Rendered, Rendered)
        )
    }
}
