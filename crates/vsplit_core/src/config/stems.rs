//! Per-stem signal chain parameters and override merging.
//!
//! `StemSettings` is the full parameter tree. `StemOverrides` mirrors it
//! with every field optional, so a caller only spells out what it changes.
//! [`Merge::merged`] overlays a patch onto a settings value and returns a
//! new value; the base is only borrowed.
//!
//! Merge rules:
//! - a present leaf replaces the base value
//! - an absent (or `null`) leaf keeps the base value
//! - a present branch is merged recursively
//!
//! Values are not range-checked. Whatever is configured goes straight into
//! the filter graph.

use serde::{Deserialize, Deserializer, Serialize};

/// Overlay of a partial patch onto a complete value.
pub trait Merge {
    /// Patch type with every field optional.
    type Patch;

    /// Return a copy of `self` with `patch` applied.
    fn merged(&self, patch: &Self::Patch) -> Self;
}

/// Take the patch value when present, otherwise keep the base.
///
/// Vectors and other compound leaves go through here too, so they are
/// always replaced wholesale.
fn pick<T: Clone>(base: &T, patch: &Option<T>) -> T {
    patch.as_ref().unwrap_or(base).clone()
}

/// Merge an optional sub-patch into a branch.
fn merge_branch<T: Merge + Clone>(base: &T, patch: &Option<T::Patch>) -> T {
    match patch {
        Some(p) => base.merged(p),
        None => base.clone(),
    }
}

/// Parameters for both stems.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct StemSettings {
    /// Vocal stem chain.
    #[serde(default)]
    pub vocal: VocalSettings,

    /// Instrumental stem chain.
    #[serde(default)]
    pub instrumental: InstrumentalSettings,
}

/// Vocal chain: band limiting and compression after the channel sum.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VocalSettings {
    /// High-pass cutoff in Hz.
    #[serde(default = "default_vocal_highpass")]
    pub highpass: f64,

    /// Low-pass cutoff in Hz.
    #[serde(default = "default_vocal_lowpass")]
    pub lowpass: f64,

    /// Compressor applied last.
    #[serde(default = "default_vocal_compressor")]
    pub compressor: DynamicsSettings,
}

fn default_vocal_highpass() -> f64 {
    80.0
}

fn default_vocal_lowpass() -> f64 {
    8000.0
}

fn default_vocal_compressor() -> DynamicsSettings {
    DynamicsSettings {
        threshold: -20.0,
        ratio: 4.0,
        attack: 5.0,
        release: 50.0,
    }
}

impl Default for VocalSettings {
    fn default() -> Self {
        Self {
            highpass: default_vocal_highpass(),
            lowpass: default_vocal_lowpass(),
            compressor: default_vocal_compressor(),
        }
    }
}

/// Instrumental chain: gate, compressor and optional EQ after the
/// channel difference.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InstrumentalSettings {
    /// Noise gate for cancellation residue.
    #[serde(default = "default_instrumental_gate")]
    pub gate: DynamicsSettings,

    /// Compressor after the gate.
    #[serde(default = "default_instrumental_compressor")]
    pub compressor: DynamicsSettings,

    /// Final equalizer band.
    #[serde(default)]
    pub eq: EqSettings,
}

fn default_instrumental_gate() -> DynamicsSettings {
    DynamicsSettings {
        threshold: -60.0,
        ratio: 2.0,
        attack: 5.0,
        release: 50.0,
    }
}

fn default_instrumental_compressor() -> DynamicsSettings {
    DynamicsSettings {
        threshold: -12.0,
        ratio: 2.0,
        attack: 5.0,
        release: 50.0,
    }
}

impl Default for InstrumentalSettings {
    fn default() -> Self {
        Self {
            gate: default_instrumental_gate(),
            compressor: default_instrumental_compressor(),
            eq: EqSettings::default(),
        }
    }
}

/// Threshold/ratio/attack/release block shared by gates and compressors.
///
/// Threshold is in dB, attack and release in milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DynamicsSettings {
    pub threshold: f64,
    pub ratio: f64,
    pub attack: f64,
    pub release: f64,
}

/// Single peaking equalizer band.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EqSettings {
    /// Whether the band is added to the chain at all.
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Center frequency in Hz.
    #[serde(default = "default_eq_frequency", alias = "f")]
    pub frequency: f64,

    /// Bandwidth as Q.
    #[serde(default = "default_eq_width")]
    pub width: f64,

    /// Gain in dB.
    #[serde(default = "default_eq_gain")]
    pub gain: f64,
}

fn default_true() -> bool {
    true
}

fn default_eq_frequency() -> f64 {
    1000.0
}

fn default_eq_width() -> f64 {
    1.0
}

fn default_eq_gain() -> f64 {
    -2.0
}

impl Default for EqSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            frequency: default_eq_frequency(),
            width: default_eq_width(),
            gain: default_eq_gain(),
        }
    }
}

/// Partial [`StemSettings`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StemOverrides {
    pub vocal: Option<VocalOverrides>,
    pub instrumental: Option<InstrumentalOverrides>,
}

/// Partial [`VocalSettings`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VocalOverrides {
    pub highpass: Option<f64>,
    pub lowpass: Option<f64>,
    pub compressor: Option<DynamicsOverrides>,
}

/// Partial [`InstrumentalSettings`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InstrumentalOverrides {
    pub gate: Option<DynamicsOverrides>,
    pub compressor: Option<DynamicsOverrides>,
    pub eq: Option<EqOverrides>,
}

/// Partial [`DynamicsSettings`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DynamicsOverrides {
    pub threshold: Option<f64>,
    pub ratio: Option<f64>,
    pub attack: Option<f64>,
    pub release: Option<f64>,
}

/// Partial [`EqSettings`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EqOverrides {
    pub enabled: Option<bool>,
    #[serde(alias = "f")]
    pub frequency: Option<f64>,
    pub width: Option<f64>,
    pub gain: Option<f64>,
}

impl StemOverrides {
    /// Whether the patch changes nothing.
    pub fn is_empty(&self) -> bool {
        self.vocal.is_none() && self.instrumental.is_none()
    }
}

/// Read stem settings as a partial table layered over the defaults.
///
/// Each dynamics block has position-dependent defaults, so the settings
/// file goes through the override types rather than per-field defaults.
pub(crate) fn deserialize_layered<'de, D>(deserializer: D) -> Result<StemSettings, D::Error>
where
    D: Deserializer<'de>,
{
    let patch = StemOverrides::deserialize(deserializer)?;
    Ok(StemSettings::default().merged(&patch))
}

impl Merge for StemSettings {
    type Patch = StemOverrides;

    fn merged(&self, patch: &StemOverrides) -> Self {
        Self {
            vocal: merge_branch(&self.vocal, &patch.vocal),
            instrumental: merge_branch(&self.instrumental, &patch.instrumental),
        }
    }
}

impl Merge for VocalSettings {
    type Patch = VocalOverrides;

    fn merged(&self, patch: &VocalOverrides) -> Self {
        Self {
            highpass: pick(&self.highpass, &patch.highpass),
            lowpass: pick(&self.lowpass, &patch.lowpass),
            compressor: merge_branch(&self.compressor, &patch.compressor),
        }
    }
}

impl Merge for InstrumentalSettings {
    type Patch = InstrumentalOverrides;

    fn merged(&self, patch: &InstrumentalOverrides) -> Self {
        Self {
            gate: merge_branch(&self.gate, &patch.gate),
            compressor: merge_branch(&self.compressor, &patch.compressor),
            eq: merge_branch(&self.eq, &patch.eq),
        }
    }
}

impl Merge for DynamicsSettings {
    type Patch = DynamicsOverrides;

    fn merged(&self, patch: &DynamicsOverrides) -> Self {
        Self {
            threshold: pick(&self.threshold, &patch.threshold),
            ratio: pick(&self.ratio, &patch.ratio),
            attack: pick(&self.attack, &patch.attack),
            release: pick(&self.release, &patch.release),
        }
    }
}

impl Merge for EqSettings {
    type Patch = EqOverrides;

    fn merged(&self, patch: &EqOverrides) -> Self {
        Self {
            enabled: pick(&self.enabled, &patch.enabled),
            frequency: pick(&self.frequency, &patch.frequency),
            width: pick(&self.width, &patch.width),
            gain: pick(&self.gain, &patch.gain),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_reference_chain() {
        let s = StemSettings::default();
        assert_eq!(s.vocal.highpass, 80.0);
        assert_eq!(s.vocal.lowpass, 8000.0);
        assert_eq!(s.vocal.compressor.ratio, 4.0);
        assert_eq!(s.instrumental.gate.threshold, -60.0);
        assert_eq!(s.instrumental.compressor.threshold, -12.0);
        assert!(s.instrumental.eq.enabled);
        assert_eq!(s.instrumental.eq.gain, -2.0);
    }

    #[test]
    fn empty_patch_is_identity() {
        let defaults = StemSettings::default();
        let patch = StemOverrides::default();
        assert!(patch.is_empty());
        assert_eq!(defaults.merged(&patch), defaults);
    }

    #[test]
    fn leaf_override_wins() {
        let defaults = StemSettings::default();
        let patch = StemOverrides {
            vocal: Some(VocalOverrides {
                highpass: Some(120.0),
                compressor: Some(DynamicsOverrides {
                    ratio: Some(8.0),
                    ..Default::default()
                }),
                ..Default::default()
            }),
            ..Default::default()
        };

        let merged = defaults.merged(&patch);
        assert_eq!(merged.vocal.highpass, 120.0);
        assert_eq!(merged.vocal.compressor.ratio, 8.0);
        // Siblings keep their defaults
        assert_eq!(merged.vocal.lowpass, 8000.0);
        assert_eq!(merged.vocal.compressor.threshold, -20.0);
        assert_eq!(merged.instrumental, defaults.instrumental);
    }

    #[test]
    fn merge_does_not_touch_base() {
        let defaults = StemSettings::default();
        let snapshot = defaults.clone();
        let patch = StemOverrides {
            instrumental: Some(InstrumentalOverrides {
                eq: Some(EqOverrides {
                    enabled: Some(false),
                    ..Default::default()
                }),
                ..Default::default()
            }),
            ..Default::default()
        };

        for _ in 0..3 {
            let merged = defaults.merged(&patch);
            assert!(!merged.instrumental.eq.enabled);
        }
        assert_eq!(defaults, snapshot);
    }

    #[test]
    fn out_of_range_values_pass_through() {
        let defaults = StemSettings::default();
        let patch: StemOverrides =
            serde_json::from_str(r#"{"vocal": {"lowpass": -5, "highpass": 1e9}}"#).unwrap();
        let merged = defaults.merged(&patch);
        assert_eq!(merged.vocal.lowpass, -5.0);
        assert_eq!(merged.vocal.highpass, 1e9);
    }

    #[test]
    fn patch_parses_from_partial_json() {
        let json = r#"{
            "instrumental": {
                "eq": { "enabled": false, "f": 250 },
                "gate": null
            }
        }"#;
        let patch: StemOverrides = serde_json::from_str(json).unwrap();
        let merged = StemSettings::default().merged(&patch);

        assert!(!merged.instrumental.eq.enabled);
        assert_eq!(merged.instrumental.eq.frequency, 250.0);
        assert_eq!(merged.instrumental.gate, StemSettings::default().instrumental.gate);
    }

    #[test]
    fn settings_parse_with_missing_fields() {
        let parsed: StemSettings = toml::from_str("[vocal]\nhighpass = 100.0\n").unwrap();
        assert_eq!(parsed.vocal.highpass, 100.0);
        assert_eq!(parsed.vocal.lowpass, 8000.0);
        assert_eq!(parsed.instrumental, InstrumentalSettings::default());
    }
}
