//! ffmpeg filter graph construction for the two stems.
//!
//! # Vocal chain
//!
//! ```text
//! pan (L+R)/2 → highpass → lowpass → acompressor
//! ```
//!
//! Summing both channels keeps material common to L and R, which is where
//! lead vocals usually sit.
//!
//! # Instrumental chain
//!
//! ```text
//! pan L-R / R-L → agate → acompressor [→ equalizer]
//! ```
//!
//! Subtracting one channel from the other cancels centre-panned material.
//! The gate cleans up the low-level residue left behind.
//!
//! Channel algebra always comes first and the EQ, when enabled, always last.
//! Both builders are pure functions of the settings.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::config::{DynamicsSettings, EqSettings, StemSettings};

/// Which graphs to build.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GraphMode {
    /// Channel algebra plus frequency and dynamics stages.
    #[default]
    Configurable,
    /// Channel algebra only.
    Legacy,
}

impl fmt::Display for GraphMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GraphMode::Configurable => write!(f, "configurable"),
            GraphMode::Legacy => write!(f, "legacy"),
        }
    }
}

/// One stage of a filter chain.
#[derive(Debug, Clone, PartialEq)]
pub enum FilterStage {
    /// Each output channel gets half of L plus half of R.
    CenterSum,
    /// L-R on the left output, R-L on the right.
    SideDifference,
    HighPass { frequency: f64 },
    LowPass { frequency: f64 },
    Gate(DynamicsSettings),
    Compressor(DynamicsSettings),
    Equalizer(EqSettings),
}

impl FilterStage {
    /// ffmpeg filter name of this stage.
    pub fn filter_name(&self) -> &'static str {
        match self {
            FilterStage::CenterSum | FilterStage::SideDifference => "pan",
            FilterStage::HighPass { .. } => "highpass",
            FilterStage::LowPass { .. } => "lowpass",
            FilterStage::Gate(_) => "agate",
            FilterStage::Compressor(_) => "acompressor",
            FilterStage::Equalizer(_) => "equalizer",
        }
    }
}

impl fmt::Display for FilterStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = self.filter_name();
        match self {
            FilterStage::CenterSum => {
                write!(f, "{}=stereo|c0=0.5*c0+0.5*c1|c1=0.5*c0+0.5*c1", name)
            }
            FilterStage::SideDifference => write!(f, "{}=stereo|c0=c0-c1|c1=c1-c0", name),
            FilterStage::HighPass { frequency } | FilterStage::LowPass { frequency } => {
                write!(f, "{}=f={}", name, frequency)
            }
            FilterStage::Gate(d) | FilterStage::Compressor(d) => write!(
                f,
                "{}=threshold={}dB:ratio={}:attack={}:release={}",
                name, d.threshold, d.ratio, d.attack, d.release
            ),
            FilterStage::Equalizer(eq) => write!(
                f,
                "{}=f={}:t=q:w={}:g={}",
                name, eq.frequency, eq.width, eq.gain
            ),
        }
    }
}

/// Ordered filter chain, rendered as a comma-joined `-filter_complex` value.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FilterGraph {
    stages: Vec<FilterStage>,
}

impl FilterGraph {
    /// Create an empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a stage (builder pattern).
    pub fn with_stage(mut self, stage: FilterStage) -> Self {
        self.stages.push(stage);
        self
    }

    /// Stages in execution order.
    pub fn stages(&self) -> &[FilterStage] {
        &self.stages
    }

    /// Number of stages.
    pub fn len(&self) -> usize {
        self.stages.len()
    }

    /// Whether the graph has no stages.
    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }
}

impl fmt::Display for FilterGraph {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, stage) in self.stages.iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            write!(f, "{}", stage)?;
        }
        Ok(())
    }
}

/// Build the vocal stem graph.
pub fn build_vocal_graph(settings: &StemSettings, mode: GraphMode) -> FilterGraph {
    let graph = FilterGraph::new().with_stage(FilterStage::CenterSum);
    if mode == GraphMode::Legacy {
        return graph;
    }

    let vocal = &settings.vocal;
    graph
        .with_stage(FilterStage::HighPass {
            frequency: vocal.highpass,
        })
        .with_stage(FilterStage::LowPass {
            frequency: vocal.lowpass,
        })
        .with_stage(FilterStage::Compressor(vocal.compressor))
}

/// Build the instrumental stem graph.
pub fn build_instrumental_graph(settings: &StemSettings, mode: GraphMode) -> FilterGraph {
    let graph = FilterGraph::new().with_stage(FilterStage::SideDifference);
    if mode == GraphMode::Legacy {
        return graph;
    }

    let inst = &settings.instrumental;
    let graph = graph
        .with_stage(FilterStage::Gate(inst.gate))
        .with_stage(FilterStage::Compressor(inst.compressor));

    if inst.eq.enabled {
        graph.with_stage(FilterStage::Equalizer(inst.eq))
    } else {
        graph
    }
}
