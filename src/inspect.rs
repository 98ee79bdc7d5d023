use crate::token::Attribute;

const IGNORE_KEY: &str = "data-bundlescript";
const IGNORE_VALUE: &str = "ignore";
const EXTERNAL_PREFIXES: &[&str] = &["//", "http://", "https://"];

/// True if a script tag must be left in place: it is marked
/// `data-bundlescript="ignore"`, or its `src` points at another host.
pub fn should_ignore(attributes: &[Attribute<'_>]) -> bool {
    attributes.iter().any(|attr| {
        (attr.is_plain(IGNORE_KEY) && attr.value == IGNORE_VALUE)
            || (attr.is_plain("src") && is_external(&attr.value))
    })
}

/// Value of the first plain `src` attribute. `Some("")` means the attribute is present
/// but names nothing to merge.
pub fn extract_local_source<'s>(attributes: &'s [Attribute<'_>]) -> Option<&'s str> {
    attributes
        .iter()
        .find(|attr| attr.is_plain("src"))
        .map(|attr| attr.value.as_ref())
}

fn is_external(src: &str) -> bool {
    EXTERNAL_PREFIXES
        .iter()
        .any(|prefix| src.starts_with(prefix))
}
