//! Shared popup-related constants.

/// Maximum number of rows any popup should attempt to display.
/// Keep this consistent across popups for a uniform feel.
pub(crate) const MAX_POPUP_ROWS: usize = 8;
