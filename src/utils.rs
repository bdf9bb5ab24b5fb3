/// Derives the reactive-wrapper key for an endpoint id: `use` followed by
/// the id with its first character uppercased.
///
/// Mirrors the naming rule of the generated client surface:
/// - `"getThing"` -> `"useGetThing"`
/// - `"uploadFile"` -> `"useUploadFile"`
/// - `"état"` -> `"useÉtat"` (Unicode-aware first-character uppercasing)
#[must_use]
pub fn hook_name(id: &str) -> String {
    let mut out = String::with_capacity(id.len() + 3);
    out.push_str("use");
    let mut chars = id.chars();
    if let Some(first) = chars.next() {
        for up in first.to_uppercase() {
            out.push(up);
        }
        out.push_str(chars.as_str());
    }
    out
}
