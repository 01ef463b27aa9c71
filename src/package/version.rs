//! Game-version compatibility matching.
//!
//! Registries publish the game versions a release was built for. A target
//! version is satisfied by an exact match first, otherwise by the release
//! whose newest supported version is closest below it.

use semver::Version;

use crate::catalog::Release;

/// Anything that advertises the game versions it runs on.
pub trait RuntimeSupport {
    fn supported_versions(&self) -> &[String];
}

impl RuntimeSupport for Release {
    fn supported_versions(&self) -> &[String] {
        &self.game_versions
    }
}

/// Parses a game version leniently ("1.21" -> 1.21.0, "v1.20.1" -> 1.20.1).
///
/// Snapshots and other non-numeric labels ("23w14a", "b1.7.3") yield `None`
/// and are left out of every comparison.
pub fn parse_version(raw: &str) -> Option<Version> {
    let s = raw.trim();
    let s = s.strip_prefix('v').unwrap_or(s);

    let split = s.find(['-', '+']).unwrap_or(s.len());
    let (numbers, suffix) = s.split_at(split);

    let parts: Vec<&str> = numbers.split('.').collect();
    if parts.len() > 3
        || parts
            .iter()
            .any(|p| p.is_empty() || !p.bytes().all(|b| b.is_ascii_digit()))
    {
        return None;
    }

    let mut normalized = parts.join(".");
    for _ in parts.len()..3 {
        normalized.push_str(".0");
    }
    normalized.push_str(suffix);

    Version::parse(&normalized).ok()
}

/// Version resolver - pure functions over candidate slices.
pub struct VersionResolver;

impl VersionResolver {
    /// Pick the candidate that best fits `target`.
    ///
    /// An empty target selects the first candidate (registry order).
    pub fn resolve<'a, T: RuntimeSupport>(target: &str, candidates: &'a [T]) -> Option<&'a T> {
        let target = target.trim();
        if target.is_empty() {
            return candidates.first();
        }

        Self::find_exact(target, candidates).or_else(|| Self::find_floor(target, candidates))
    }

    /// First candidate listing `target` itself.
    pub fn find_exact<'a, T: RuntimeSupport>(target: &str, candidates: &'a [T]) -> Option<&'a T> {
        candidates.iter().find(|c| {
            c.supported_versions()
                .iter()
                .any(|v| Self::versions_equal(v, target))
        })
    }

    /// Candidate whose best version not above `target` is the highest.
    /// Ties keep the earlier candidate.
    pub fn find_floor<'a, T: RuntimeSupport>(target: &str, candidates: &'a [T]) -> Option<&'a T> {
        let target = parse_version(target)?;

        let mut best: Option<(&'a T, Version)> = None;
        for candidate in candidates {
            let Some(version) = Self::best_at_or_below(candidate, &target) else {
                continue;
            };
            match &best {
                Some((_, current)) if version <= *current => {}
                _ => best = Some((candidate, version)),
            }
        }

        best.map(|(candidate, _)| candidate)
    }

    /// Highest parseable supported version that does not exceed `target`.
    pub fn best_at_or_below<T: RuntimeSupport>(candidate: &T, target: &Version) -> Option<Version> {
        candidate
            .supported_versions()
            .iter()
            .filter_map(|v| parse_version(v))
            .filter(|v| v <= target)
            .max()
    }

    /// Textual equality, or equality after lenient parsing ("1.21" == "1.21.0").
    pub fn versions_equal(a: &str, b: &str) -> bool {
        if a.trim() == b.trim() {
            return true;
        }
        matches!((parse_version(a), parse_version(b)), (Some(x), Some(y)) if x == y)
    }
}
