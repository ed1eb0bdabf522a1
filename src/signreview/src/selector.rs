use tracing::debug;

use crate::errors::ReviewError;
use crate::formats::{FormatKey, ViewFormat};

/// Tracks the active presentation format of a review.
///
/// The active key is always a member of the current format list, or `None`
/// when that list is empty. Only two inputs move it: the list being
/// recomputed, and the user picking a format from the list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ViewFormatSelector {
    formats: Vec<ViewFormat>,
    active: Option<FormatKey>,
}

impl ViewFormatSelector {
    pub fn new(formats: Vec<ViewFormat>) -> Self {
        let mut selector = Self::default();
        selector.set_formats(formats);
        selector
    }

    /// Replaces the candidate list. The previous selection survives when it
    /// is still offered, otherwise the first candidate becomes active.
    pub fn set_formats(&mut self, formats: Vec<ViewFormat>) {
        let keep = self
            .active
            .filter(|key| formats.iter().any(|format| format.key == *key));
        self.active = keep.or_else(|| formats.first().map(|format| format.key));
        self.formats = formats;
    }

    /// Explicit user choice. Keys outside the current list are rejected and
    /// leave the selection untouched.
    pub fn select(&mut self, key: FormatKey) -> Result<&ViewFormat, ReviewError> {
        let Some(index) = self.formats.iter().position(|format| format.key == key) else {
            debug!(%key, "rejected selection of unavailable format");
            return Err(ReviewError::FormatUnavailable(key.to_string()));
        };
        self.active = Some(key);
        Ok(&self.formats[index])
    }

    /// Same as [`Self::select`], for keys coming from an untyped source.
    pub fn select_str(&mut self, key: &str) -> Result<&ViewFormat, ReviewError> {
        let key = key.parse::<FormatKey>()?;
        self.select(key)
    }

    pub fn active_key(&self) -> Option<FormatKey> {
        self.active
    }

    pub fn active(&self) -> Option<&ViewFormat> {
        let key = self.active?;
        self.formats.iter().find(|format| format.key == key)
    }

    pub fn formats(&self) -> &[ViewFormat] {
        &self.formats
    }

    /// Whether a switcher is worth showing.
    pub fn has_choice(&self) -> bool {
        self.formats.len() > 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn formats(keys: &[FormatKey]) -> Vec<ViewFormat> {
        keys.iter().map(|key| key.format()).collect()
    }

    #[test]
    fn test_initial_selection_is_first_format() {
        let selector = ViewFormatSelector::new(formats(&[FormatKey::Preview, FormatKey::Raw]));
        assert_eq!(selector.active_key(), Some(FormatKey::Preview));
        assert!(selector.has_choice());
    }

    #[test]
    fn test_empty_list_has_no_selection() {
        let selector = ViewFormatSelector::new(Vec::new());
        assert_eq!(selector.active_key(), None);
        assert_eq!(selector.active(), None);
        assert!(!selector.has_choice());
    }

    #[test]
    fn test_selection_survives_recomputation() {
        let mut selector = ViewFormatSelector::new(formats(&[FormatKey::Raw, FormatKey::Bytes]));
        selector.select(FormatKey::Bytes).unwrap();

        selector.set_formats(formats(&[FormatKey::Preview, FormatKey::Raw, FormatKey::Bytes]));
        assert_eq!(selector.active_key(), Some(FormatKey::Bytes));
    }

    #[test]
    fn test_selection_falls_back_when_removed() {
        let mut selector =
            ViewFormatSelector::new(formats(&[FormatKey::Preview, FormatKey::Raw, FormatKey::Bytes]));
        assert_eq!(selector.active_key(), Some(FormatKey::Preview));

        selector.set_formats(formats(&[FormatKey::Raw, FormatKey::Bytes]));
        assert_eq!(selector.active_key(), Some(FormatKey::Raw));

        selector.set_formats(Vec::new());
        assert_eq!(selector.active_key(), None);

        selector.set_formats(formats(&[FormatKey::Bytes]));
        assert_eq!(selector.active_key(), Some(FormatKey::Bytes));
    }

    #[test]
    fn test_reject_unavailable_format() {
        let mut selector = ViewFormatSelector::new(formats(&[FormatKey::Preview, FormatKey::Raw]));
        selector.select(FormatKey::Raw).unwrap();

        assert_eq!(
            selector.select(FormatKey::Bytes),
            Err(ReviewError::FormatUnavailable("bytes".to_string()))
        );
        assert_eq!(selector.active_key(), Some(FormatKey::Raw));
    }

    #[test]
    fn test_select_str() {
        let mut selector = ViewFormatSelector::new(formats(&[FormatKey::Raw, FormatKey::Bytes]));

        assert_eq!(selector.select_str("bytes").map(|f| f.key), Ok(FormatKey::Bytes));
        assert_eq!(
            selector.select_str("hex").map(|f| f.key),
            Err(ReviewError::UnknownFormatKey("hex".to_string()))
        );
        assert_eq!(selector.active_key(), Some(FormatKey::Bytes));
    }

    #[test]
    fn test_active_is_always_member() {
        let lists = [
            formats(&[FormatKey::Preview, FormatKey::Raw, FormatKey::Bytes]),
            formats(&[FormatKey::Bytes]),
            Vec::new(),
            formats(&[FormatKey::Raw]),
            formats(&[FormatKey::Preview, FormatKey::Raw]),
        ];
        let mut selector = ViewFormatSelector::default();

        for list in lists {
            selector.set_formats(list);
            for key in [FormatKey::Preview, FormatKey::Raw, FormatKey::Bytes] {
                let _ = selector.select(key);
                match selector.active_key() {
                    Some(active) => {
                        assert!(selector.formats().iter().any(|f| f.key == active))
                    }
                    None => assert!(selector.formats().is_empty()),
                }
            }
        }
    }
}
