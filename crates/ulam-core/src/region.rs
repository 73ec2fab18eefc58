//! Marker-delimited regions inside a text document.
//!
//! A [`TemplateRegion`] is located once, with both sentinels found and their
//! order checked, and then replaced in a single step. Everything outside
//! the body (the sentinels included) is carried over byte for byte.

/// Why a region could not be located.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum RegionError {
    /// The start sentinel does not occur.
    #[error("start marker not found")]
    MissingStart,

    /// The end sentinel does not occur.
    #[error("end marker not found")]
    MissingEnd,

    /// The end sentinel only occurs before the start sentinel.
    #[error("end marker appears before start marker")]
    EndBeforeStart,
}

/// A document split around the body of a sentinel-delimited region.
///
/// The body is the text strictly between the first start sentinel and the
/// first end sentinel after it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TemplateRegion<'a> {
    before: &'a str,
    start_marker: &'a str,
    body: &'a str,
    end_marker: &'a str,
    after: &'a str,
}

impl<'a> TemplateRegion<'a> {
    /// Find the region delimited by `start_marker` and `end_marker`.
    ///
    /// # Errors
    ///
    /// Returns a [`RegionError`] naming the sentinel that is missing or out
    /// of order.
    pub fn locate(
        content: &'a str,
        start_marker: &'a str,
        end_marker: &'a str,
    ) -> Result<Self, RegionError> {
        let (before, rest) = content
            .split_once(start_marker)
            .ok_or(RegionError::MissingStart)?;
        let Some((body, after)) = rest.split_once(end_marker) else {
            return Err(if before.contains(end_marker) {
                RegionError::EndBeforeStart
            } else {
                RegionError::MissingEnd
            });
        };
        Ok(Self {
            before,
            start_marker,
            body,
            end_marker,
            after,
        })
    }

    /// The current text between the sentinels.
    pub const fn body(&self) -> &'a str {
        self.body
    }

    /// Rebuild the document with `replacement` as the body.
    pub fn replace(&self, replacement: &str) -> String {
        let mut out = String::with_capacity(
            self.before
                .len()
                .saturating_add(self.start_marker.len())
                .saturating_add(replacement.len())
                .saturating_add(self.end_marker.len())
                .saturating_add(self.after.len()),
        );
        out.push_str(self.before);
        out.push_str(self.start_marker);
        out.push_str(replacement);
        out.push_str(self.end_marker);
        out.push_str(self.after);
        out
    }
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::indexing_slicing,
    clippy::arithmetic_side_effects
)]
mod tests {
    use super::*;

    const START: &str = "<!-- LATEST_STATUS_START -->";
    const END: &str = "<!-- LATEST_STATUS_END -->";

    #[test]
    fn replaces_only_the_body() {
        let doc = format!("# Title\n\nIntro.\n{START}\nold status\n{END}\n\n## Footer\n");
        let region = TemplateRegion::locate(&doc, START, END).unwrap();
        assert_eq!(region.body(), "\nold status\n");

        let updated = region.replace("\n> new status\n");
        assert_eq!(
            updated,
            format!("# Title\n\nIntro.\n{START}\n> new status\n{END}\n\n## Footer\n")
        );

        let prefix_len = doc.find(START).unwrap() + START.len();
        assert_eq!(&updated[..prefix_len], &doc[..prefix_len]);
        let suffix = &doc[doc.find(END).unwrap()..];
        assert!(updated.ends_with(suffix));
    }

    #[test]
    fn empty_body_is_allowed() {
        let doc = format!("{START}{END}");
        let region = TemplateRegion::locate(&doc, START, END).unwrap();
        assert_eq!(region.body(), "");
        assert_eq!(region.replace("x"), format!("{START}x{END}"));
    }

    #[test]
    fn missing_markers_are_reported() {
        assert_eq!(
            TemplateRegion::locate("no markers", START, END),
            Err(RegionError::MissingStart)
        );
        let only_start = format!("a {START} b");
        assert_eq!(
            TemplateRegion::locate(&only_start, START, END),
            Err(RegionError::MissingEnd)
        );
    }

    #[test]
    fn reversed_markers_are_reported() {
        let doc = format!("{END} middle {START}");
        assert_eq!(
            TemplateRegion::locate(&doc, START, END),
            Err(RegionError::EndBeforeStart)
        );
    }

    #[test]
    fn later_marker_pairs_are_untouched() {
        let doc = format!("{START}one{END} text {START}two{END}");
        let region = TemplateRegion::locate(&doc, START, END).unwrap();
        assert_eq!(
            region.replace("1"),
            format!("{START}1{END} text {START}two{END}")
        );
    }

    #[test]
    fn replacing_with_same_body_is_identity() {
        let doc = format!("head\n{START}\n> same\n{END}\ntail");
        let region = TemplateRegion::locate(&doc, START, END).unwrap();
        assert_eq!(region.replace(region.body()), doc);
    }
}
