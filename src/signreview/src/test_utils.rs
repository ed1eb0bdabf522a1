use pretty_assertions::assert_eq;

use crate::{FormatKey, ViewFormat, ViewFormatSelector};

pub fn format_keys(formats: &[ViewFormat]) -> Vec<FormatKey> {
    formats.iter().map(|format| format.key).collect()
}

pub fn assert_has_format(formats: &[ViewFormat], key: FormatKey) {
    let (found, keys) = check_formats(formats, key);
    assert!(found, "Should offer a {key} format. Offered: {keys:?}");
}

pub fn assert_has_format_with_context(formats: &[ViewFormat], key: FormatKey, context: &str) {
    let (found, keys) = check_formats(formats, key);
    assert!(
        found,
        "Should offer a {key} format in {context}. Offered: {keys:?}"
    );
}

pub fn assert_lacks_format(formats: &[ViewFormat], key: FormatKey) {
    let (found, keys) = check_formats(formats, key);
    assert!(!found, "Should not offer a {key} format. Offered: {keys:?}");
}

pub fn assert_formats_with_context(formats: &[ViewFormat], expected: &[FormatKey], context: &str) {
    assert_eq!(
        format_keys(formats),
        expected.to_vec(),
        "Mismatch in offered formats in {context}"
    );
}

pub fn assert_active_format(selector: &ViewFormatSelector, expected: Option<FormatKey>) {
    assert_eq!(
        selector.active_key(),
        expected,
        "Unexpected active format. Offered: {:?}",
        format_keys(selector.formats())
    );
    if let Some(key) = selector.active_key() {
        assert_has_format_with_context(selector.formats(), key, "the selector's own list");
    }
}

pub fn check_formats(formats: &[ViewFormat], key: FormatKey) -> (bool, Vec<FormatKey>) {
    let keys = format_keys(formats);
    (keys.contains(&key), keys)
}
