//! Build status classification from feed item titles.

use std::fmt;

/// Build status derived from a feed item title.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BuildStatus {
    /// The build was already failing and still is.
    StillFailing,
    /// The build was failing and passes again.
    NowFixed,
    /// The build passes, as before.
    StillOk,
    /// The build was aborted. Renders as an empty label.
    Aborted,
    /// The title does not have the `<job> <build> <phrase>` shape.
    Malformed,
    /// The status phrase is not one we know about.
    Unknown(String),
}

impl BuildStatus {
    /// Whether this status renders as the empty label.
    pub fn is_suppressed(&self) -> bool {
        matches!(self, BuildStatus::Aborted)
    }
}

impl fmt::Display for BuildStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BuildStatus::StillFailing => f.write_str("STILL FAILING"),
            BuildStatus::NowFixed => f.write_str("NOW FIXED"),
            BuildStatus::StillOk => f.write_str("STILL OK"),
            BuildStatus::Aborted => Ok(()),
            BuildStatus::Malformed => f.write_str("UNKNOWN"),
            BuildStatus::Unknown(phrase) => write!(f, "UNKNOWN({phrase})"),
        }
    }
}

/// Classify a Jenkins feed title such as `"myjob #3 broken since build #2"`.
///
/// The title is split on single spaces into at most three parts; the third
/// part is the status phrase and is matched by substring, first hit wins.
pub fn classify_title(title: &str) -> BuildStatus {
    let mut parts = title.splitn(3, ' ');
    let (Some(_job), Some(_build), Some(phrase)) = (parts.next(), parts.next(), parts.next())
    else {
        return BuildStatus::Malformed;
    };

    if phrase.contains("broken since") {
        BuildStatus::StillFailing
    } else if phrase.contains("back to normal") {
        BuildStatus::NowFixed
    } else if phrase.contains("stable") {
        BuildStatus::StillOk
    } else if phrase.contains("aborted") {
        BuildStatus::Aborted
    } else {
        BuildStatus::Unknown(phrase.to_string())
    }
}
