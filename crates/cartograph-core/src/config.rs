use crate::error::{Error, Result};
use crate::identifier::IdentifierStrategy;
use serde::{Deserialize, Serialize};

/// Tunables of the viewport controller.
///
/// The step factors and the drag threshold are behavioural constants carried over from the
/// cartography wizard; they are exposed here so an embedding page can adjust them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ViewportConfig {
    pub zoom_min: f64,
    pub zoom_max: f64,
    pub zoom_in_step: f64,
    pub zoom_out_step: f64,
    /// Margin (in viewport pixels) subtracted from each viewport side when auto-fitting.
    pub fit_margin: f64,
    /// Scale used when the content dimensions are unknown.
    pub default_scale: f64,
    /// Euclidean pointer travel (px) above which a press becomes a drag.
    pub drag_threshold: f64,
    /// How many times a deferred fit is retried while the viewport measures `0x0`.
    pub max_measure_retries: u32,
}

impl Default for ViewportConfig {
    fn default() -> Self {
        Self {
            zoom_min: 0.1,
            zoom_max: 10.0,
            zoom_in_step: 1.15,
            zoom_out_step: 0.85,
            fit_margin: 40.0,
            default_scale: 1.0,
            drag_threshold: 5.0,
            max_measure_retries: 20,
        }
    }
}

impl ViewportConfig {
    pub fn clamp_scale(&self, scale: f64) -> f64 {
        scale.clamp(self.zoom_min, self.zoom_max)
    }

    fn validate(&self) -> Result<()> {
        let finite_positive = |v: f64| v.is_finite() && v > 0.0;
        if !(finite_positive(self.zoom_min) && finite_positive(self.zoom_max)) {
            return Err(config_error("zoomMin and zoomMax must be positive"));
        }
        if self.zoom_min > self.zoom_max {
            return Err(config_error("zoomMin must not exceed zoomMax"));
        }
        if !(finite_positive(self.zoom_in_step) && finite_positive(self.zoom_out_step)) {
            return Err(config_error("zoom steps must be positive"));
        }
        if !(self.fit_margin.is_finite() && self.fit_margin >= 0.0) {
            return Err(config_error("fitMargin must be non-negative"));
        }
        if !finite_positive(self.default_scale) {
            return Err(config_error("defaultScale must be positive"));
        }
        if !(self.drag_threshold.is_finite() && self.drag_threshold >= 0.0) {
            return Err(config_error("dragThreshold must be non-negative"));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct BinderConfig {
    /// Identifier lookups, evaluated in order; the first non-empty value wins.
    pub strategies: Vec<IdentifierStrategy>,
    /// CSS `filter` applied to a bound shape while the pointer is over it.
    pub highlight_filter: String,
    pub cursor: String,
    /// Local element names considered graphical.
    pub graphical_elements: Vec<String>,
}

impl Default for BinderConfig {
    fn default() -> Self {
        Self {
            strategies: IdentifierStrategy::defaults(),
            highlight_filter: "drop-shadow(0 0 4px rgba(0, 123, 255, 0.8)) brightness(1.1)"
                .to_string(),
            cursor: "pointer".to_string(),
            graphical_elements: [
                "g", "path", "rect", "circle", "ellipse", "polygon", "polyline", "line", "text",
                "use", "image",
            ]
            .into_iter()
            .map(str::to_string)
            .collect(),
        }
    }
}

impl BinderConfig {
    pub fn is_graphical(&self, local_name: &str) -> bool {
        self.graphical_elements.iter().any(|n| n == local_name)
    }

    fn validate(&self) -> Result<()> {
        if self.strategies.is_empty() {
            return Err(config_error("at least one identifier strategy is required"));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct NavigationConfig {
    /// Absolute URL of the activity detail page.
    pub base_url: String,
    pub query_param: String,
}

impl Default for NavigationConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost/activite".to_string(),
            query_param: "id".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CartographyConfig {
    pub viewport: ViewportConfig,
    pub binder: BinderConfig,
    pub navigation: NavigationConfig,
}

impl CartographyConfig {
    /// Parses a (possibly partial) JSON override document. Missing keys keep their defaults.
    pub fn from_json_str(text: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(text).map_err(|e| Error::Config {
            message: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        self.viewport.validate()?;
        self.binder.validate()?;
        if self.navigation.query_param.trim().is_empty() {
            return Err(config_error("navigation.queryParam must not be empty"));
        }
        Ok(())
    }
}

fn config_error(message: &str) -> Error {
    Error::Config {
        message: message.to_string(),
    }
}
