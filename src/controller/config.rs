use std::fmt;
use std::str::FromStr;

use crate::controller::camera_follow::CameraTrailer;
use crate::controller::movement::{HeadingPolicy, STEP};
use crate::controller::wave::WaveParams;
use crate::model::HeightField;

/// Environment variable the native build reads the variant from.
pub const VARIANT_ENV: &str = "RAFTWAVE_VARIANT";

/// Query parameter the web build reads the variant from.
pub const VARIANT_QUERY: &str = "variant";

/// The three feature sets the demo grew through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Variant {
    /// Movement with snap heading, fixed camera.
    Basic,
    /// Snap heading plus the follow camera.
    Follow,
    /// Smoothed heading, follow camera and animated ocean.
    #[default]
    Ocean,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown variant `{0}` (expected basic, follow or ocean)")]
pub struct ParseVariantError(String);

impl FromStr for Variant {
    type Err = ParseVariantError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "basic" => Ok(Variant::Basic),
            "follow" => Ok(Variant::Follow),
            "ocean" => Ok(Variant::Ocean),
            _ => Err(ParseVariantError(s.to_string())),
        }
    }
}

impl fmt::Display for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Variant::Basic => "basic",
            Variant::Follow => "follow",
            Variant::Ocean => "ocean",
        })
    }
}

impl Variant {
    /// Parse an optional raw value, falling back to the default with a warning.
    pub fn from_setting(raw: Option<&str>) -> Self {
        match raw.map(str::parse::<Variant>) {
            None => Variant::default(),
            Some(Ok(variant)) => variant,
            Some(Err(e)) => {
                tracing::warn!("{e}, using `{}`", Variant::default());
                Variant::default()
            }
        }
    }
}

/// Size of the ocean grid.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OceanGrid {
    pub width: f32,
    pub depth: f32,
    pub segments_x: usize,
    pub segments_y: usize,
}

impl Default for OceanGrid {
    fn default() -> Self {
        Self { width: 100.0, depth: 100.0, segments_x: 50, segments_y: 50 }
    }
}

impl OceanGrid {
    pub fn build(&self) -> HeightField {
        HeightField::plane(self.width, self.depth, self.segments_x, self.segments_y)
    }
}

/// Everything the frame updater can be configured with.
#[derive(Debug, Clone, PartialEq)]
pub struct UpdaterConfig {
    pub variant: Variant,
    pub step: f32,
    pub heading: HeadingPolicy,
    pub camera_follow: Option<CameraTrailer>,
    pub waves: Option<WaveParams>,
    pub ocean: OceanGrid,
}

impl Default for UpdaterConfig {
    fn default() -> Self {
        Self::for_variant(Variant::default())
    }
}

impl UpdaterConfig {
    pub fn for_variant(variant: Variant) -> Self {
        let (heading, camera_follow, waves) = match variant {
            Variant::Basic => (HeadingPolicy::Snap, None, None),
            Variant::Follow => (HeadingPolicy::Snap, Some(CameraTrailer::default()), None),
            Variant::Ocean => (
                HeadingPolicy::smoothed(),
                Some(CameraTrailer::default()),
                Some(WaveParams::default()),
            ),
        };

        Self {
            variant,
            step: STEP,
            heading,
            camera_follow,
            waves,
            ocean: OceanGrid::default(),
        }
    }

    /// Variant from `RAFTWAVE_VARIANT`, default when unset or unknown.
    #[cfg(not(target_arch = "wasm32"))]
    pub fn from_env() -> Self {
        let raw = std::env::var(VARIANT_ENV).ok();
        Self::for_variant(Variant::from_setting(raw.as_deref()))
    }

    /// Variant from the `?variant=` query string of the page.
    pub fn from_query(search: &str) -> Self {
        let raw = query_param(search, VARIANT_QUERY);
        Self::for_variant(Variant::from_setting(raw.as_deref()))
    }

    /// The height field to animate, if this configuration has waves.
    pub fn build_ocean(&self) -> Option<HeightField> {
        self.waves.map(|_| self.ocean.build())
    }
}

/// First value of `key` in a `?a=1&b=2` query string, percent-decoded.
/// A key without `=` has an empty value.
pub fn query_param(search: &str, key: &str) -> Option<String> {
    search
        .trim_start_matches('?')
        .split('&')
        .filter(|pair| !pair.is_empty())
        .map(|pair| pair.split_once('=').unwrap_or((pair, "")))
        .find(|(name, _)| urlencoding::decode(name).is_ok_and(|name| name == key))
        .map(|(_, value)| {
            let value = value.replace('+', " ");
            match urlencoding::decode(&value) {
                Ok(decoded) => decoded.into_owned(),
                Err(_) => value,
            }
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_variant() {
        assert_eq!("basic".parse::<Variant>(), Ok(Variant::Basic));
        assert_eq!(" Follow ".parse::<Variant>(), Ok(Variant::Follow));
        assert_eq!("OCEAN".parse::<Variant>(), Ok(Variant::Ocean));
        assert!("storm".parse::<Variant>().is_err());
    }

    #[test]
    fn test_unknown_setting_falls_back_to_default() {
        assert_eq!(Variant::from_setting(None), Variant::Ocean);
        assert_eq!(Variant::from_setting(Some("nope")), Variant::Ocean);
        assert_eq!(Variant::from_setting(Some("basic")), Variant::Basic);
    }

    #[test]
    fn test_presets() {
        let basic = UpdaterConfig::for_variant(Variant::Basic);
        assert_eq!(basic.heading, HeadingPolicy::Snap);
        assert!(basic.camera_follow.is_none());
        assert!(basic.build_ocean().is_none());

        let follow = UpdaterConfig::for_variant(Variant::Follow);
        assert_eq!(follow.heading, HeadingPolicy::Snap);
        assert!(follow.camera_follow.is_some());
        assert!(follow.waves.is_none());

        let ocean = UpdaterConfig::default();
        assert_eq!(ocean.variant, Variant::Ocean);
        assert!(matches!(ocean.heading, HeadingPolicy::Smoothed { .. }));
        assert_eq!(ocean.step, STEP);
        assert_eq!(ocean.build_ocean().map(|f| f.len()), Some(51 * 51));
    }

    #[test]
    fn test_query_param_extraction() {
        assert_eq!(query_param("", "variant"), None);
        assert_eq!(query_param("?", "variant"), None);
        assert_eq!(query_param("?debug=1", "variant"), None);
        assert_eq!(query_param("?variant=basic", "variant").as_deref(), Some("basic"));
        assert_eq!(query_param("debug=1&variant=follow&x", "variant").as_deref(), Some("follow"));
        // first occurrence wins
        assert_eq!(query_param("?variant=basic&variant=ocean", "variant").as_deref(), Some("basic"));
        assert_eq!(query_param("?variant", "variant").as_deref(), Some(""));
        assert_eq!(query_param("?variants=basic", "variant"), None);
    }

    #[test]
    fn test_query_param_is_percent_decoded() {
        assert_eq!(query_param("?variant=%6Fcean", "variant").as_deref(), Some("ocean"));
        assert_eq!(query_param("?%76ariant=basic", "variant").as_deref(), Some("basic"));
        assert_eq!(query_param("?name=raft+one", "name").as_deref(), Some("raft one"));
    }

    #[test]
    fn test_from_query_selects_variant() {
        assert_eq!(UpdaterConfig::from_query("?variant=basic").variant, Variant::Basic);
        assert_eq!(UpdaterConfig::from_query("?lang=en&variant=Follow").variant, Variant::Follow);
        assert_eq!(UpdaterConfig::from_query("?variant=%6Fcean").variant, Variant::Ocean);
        assert_eq!(UpdaterConfig::from_query("").variant, Variant::Ocean);
        assert_eq!(UpdaterConfig::from_query("?variant=storm").variant, Variant::Ocean);
    }

    #[test]
    fn test_variant_display_round_trips() {
        for v in [Variant::Basic, Variant::Follow, Variant::Ocean] {
            assert_eq!(v.to_string().parse::<Variant>(), Ok(v));
        }
    }
}
