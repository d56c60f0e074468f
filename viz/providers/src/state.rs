/// The fetch lifecycle of a provider.
///
/// Terminal only on removal from the tree; any settings change can move a
/// provider back to `SettingsInvalid` or `Fetching`.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    serde::Serialize,
    serde::Deserialize,
    strum_macros::Display
)]
pub enum DataProviderState {
    /// One or more settings are unresolved; nothing can be fetched.
    SettingsInvalid,
    /// Settings are valid but no fetch has been attempted for them yet.
    SettingsValidNotFetched,
    Fetching,
    Ready,
    Error,
}
