//! Configuration types deserialized from `gapl.toml`.

use serde::Deserialize;
use std::collections::BTreeMap;

/// Root configuration structure representing the entire `gapl.toml` file.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct CompilerConfig {
    /// Pass selection.
    #[serde(default)]
    pub compiler: CompilerOptions,
    /// Propagation delays used when building retiming graphs.
    #[serde(default)]
    pub delay: DelayModel,
}

/// Options controlling which passes run after the netlist is built.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct CompilerOptions {
    /// Flatten nested module invocations. Accepted but not supported.
    #[serde(default)]
    pub flatten: bool,
    /// Fold literal-only subcircuits. Accepted but not supported.
    #[serde(default)]
    pub literal_simplification: bool,
    /// Run the retiming pass over modules that contain registers.
    #[serde(default)]
    pub retime: bool,
    /// Clock period to retime for. When absent, the period is minimized.
    #[serde(default)]
    pub retime_target: Option<i64>,
}

/// Per-function propagation delays, keyed by predefined function name.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct DelayModel {
    /// Delay of any node the model has no specific entry for.
    #[serde(default = "default_delay")]
    pub default: i64,
    /// Delays for individual predefined functions.
    #[serde(default)]
    pub functions: BTreeMap<String, FunctionDelay>,
}

fn default_delay() -> i64 {
    1
}

impl Default for DelayModel {
    fn default() -> Self {
        Self {
            default: default_delay(),
            functions: BTreeMap::new(),
        }
    }
}

impl DelayModel {
    /// Returns the delay of `function` when its output is `width` bits wide.
    ///
    /// Falls back to the function's own default, then to the model default.
    pub fn delay_for(&self, function: &str, width: u32) -> i64 {
        let Some(entry) = self.functions.get(function) else {
            return self.default;
        };
        entry
            .widths
            .iter()
            .find(|slice| slice.contains(width))
            .map(|slice| slice.delay)
            .or(entry.default)
            .unwrap_or(self.default)
    }
}

/// Delay description of one predefined function.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct FunctionDelay {
    /// Delay for widths not covered by any slice.
    #[serde(default)]
    pub default: Option<i64>,
    /// Width ranges with a fixed delay.
    #[serde(default)]
    pub widths: Vec<WidthSlice>,
}

/// A half-open range of output widths `[index, until)` sharing one delay.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct WidthSlice {
    /// First width of the range.
    pub index: u32,
    /// End of the range (exclusive); unbounded when absent.
    #[serde(default)]
    pub until: Option<u32>,
    /// Delay for widths in the range.
    pub delay: i64,
}

impl WidthSlice {
    /// Returns `true` if `width` lies inside this slice.
    pub fn contains(&self, width: u32) -> bool {
        width >= self.index && self.until.map_or(true, |until| width < until)
    }

    /// Returns `true` if the slice covers no width at all.
    pub fn is_empty(&self) -> bool {
        self.until.is_some_and(|until| until <= self.index)
    }

    /// Returns `true` if the two slices share at least one width.
    pub fn overlaps(&self, other: &WidthSlice) -> bool {
        let ends_before = |a: &WidthSlice, b: &WidthSlice| a.until.is_some_and(|u| u <= b.index);
        !ends_before(self, other) && !ends_before(other, self)
    }
}
