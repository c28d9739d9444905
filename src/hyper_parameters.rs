// Defaults for parameters, following the values the system was tuned with
const DEPTH_DEFAULT: usize = 3;
const SPLITS_DEFAULT: usize = 3;
const MIN_SIZE_DEFAULT: f64 = 0.1;
const MAX_EXTENSION_DEFAULT: f64 = 1.0;
const LABEL_TOP_N_DEFAULT: usize = 1;
const EMPTY_LABEL_DEFAULT: &str = "all";

// Valid minimums/left bounds of parameters
const DEPTH_MINIMUM: usize = 1;
const SPLITS_MINIMUM: usize = 2;
const LABEL_TOP_N_MINIMUM: usize = 1;
const MAX_EXTENSION_MINIMUM: f64 = 0.0;

/// A wrapper around the parameters that shape the layered partition. Only use
/// if you want to tune the hierarchy; otherwise use
/// `TreeMapper::default_params` to run with defaults.
pub struct TreemapParams {
    pub(crate) depth: usize,
    pub(crate) splits: usize,
    pub(crate) min_size: f64,
    pub(crate) max_extension: f64,
    pub(crate) label_top_n: usize,
    pub(crate) empty_label: String,
}

/// Builder object to set custom partition parameters.
pub struct TreemapParamsBuilder {
    depth: Option<usize>,
    splits: Option<usize>,
    min_size: Option<f64>,
    max_extension: Option<f64>,
    label_top_n: Option<usize>,
    empty_label: Option<String>,
}

impl TreemapParams {
    pub(crate) fn default() -> Self {
        Self::builder().build()
    }

    /// Enters the builder pattern, allowing custom parameters to be set using
    /// various setter methods.
    ///
    /// # Returns
    /// * the parameter configuration builder
    pub fn builder() -> TreemapParamsBuilder {
        TreemapParamsBuilder {
            depth: None,
            splits: None,
            min_size: None,
            max_extension: None,
            label_top_n: None,
            empty_label: None,
        }
    }
}

impl TreemapParamsBuilder {
    /// Sets the maximum number of hierarchy layers the partition builder
    /// produces. A value of 1 cuts the tree once and stops. Layers stop early
    /// anyway once every group has bottomed out to single leaves.
    /// Defaults to 3.
    ///
    /// # Parameters
    /// * depth - the maximum number of layers
    ///
    /// # Returns
    /// * the parameter configuration builder
    pub fn depth(mut self, depth: usize) -> TreemapParamsBuilder {
        let valid_depth =
            TreemapParamsBuilder::validate_input_left_bound(depth, DEPTH_MINIMUM, "depth");
        self.depth = Some(valid_depth);
        self
    }

    /// Sets the number of groups each cut aims for before any adaptive
    /// widening. This is the main parameter for changing the shape of the
    /// hierarchy. Defaults to 3.
    ///
    /// # Parameters
    /// * splits - the number of groups aimed for per cut
    ///
    /// # Returns
    /// * the parameter configuration builder
    pub fn splits(mut self, splits: usize) -> TreemapParamsBuilder {
        let valid_splits =
            TreemapParamsBuilder::validate_input_left_bound(splits, SPLITS_MINIMUM, "splits");
        self.splits = Some(valid_splits);
        self
    }

    /// Sets the minimal group size, as a fraction of the leaves covered by a
    /// cut. Groups below this fraction push the cut to widen. Clamped to the
    /// range 0 to 1. Defaults to 0.1.
    ///
    /// # Parameters
    /// * min_size - the minimal fractional group size
    ///
    /// # Returns
    /// * the parameter configuration builder
    pub fn min_size(mut self, min_size: f64) -> TreemapParamsBuilder {
        let valid_min_size = if !(0.0..=1.0).contains(&min_size) {
            let clamped = min_size.clamp(0.0, 1.0);
            println!(
                "TREECUT_WARNING: min_size ({min_size}) must be a fraction \
                in range 0 to 1. Set to {clamped}."
            );
            clamped
        } else {
            min_size
        };
        self.min_size = Some(valid_min_size);
        self
    }

    /// Sets how far a cut may widen past `splits - 1`, proportionally, while
    /// undersized groups remain. With the default of 1.0 the cut count may at
    /// most double.
    ///
    /// # Parameters
    /// * max_extension - the proportional widening budget
    ///
    /// # Returns
    /// * the parameter configuration builder
    pub fn max_extension(mut self, max_extension: f64) -> TreemapParamsBuilder {
        let valid_max_extension = if max_extension < MAX_EXTENSION_MINIMUM {
            println!(
                "TREECUT_WARNING: max_extension ({max_extension}) cannot be lower \
                than {MAX_EXTENSION_MINIMUM}. Set to {MAX_EXTENSION_MINIMUM}."
            );
            MAX_EXTENSION_MINIMUM
        } else {
            max_extension
        };
        self.max_extension = Some(valid_max_extension);
        self
    }

    /// Sets how many top-ranked member texts each labeled group carries in
    /// its `top_members` list. The single `label` field is always the
    /// title-cased top member. Defaults to 1.
    ///
    /// # Parameters
    /// * label_top_n - the number of top-ranked member texts to keep
    ///
    /// # Returns
    /// * the parameter configuration builder
    pub fn label_top_n(mut self, label_top_n: usize) -> TreemapParamsBuilder {
        let valid_label_top_n = TreemapParamsBuilder::validate_input_left_bound(
            label_top_n,
            LABEL_TOP_N_MINIMUM,
            "label_top_n",
        );
        self.label_top_n = Some(valid_label_top_n);
        self
    }

    /// Sets the placeholder label used for a group with no members.
    /// Defaults to "all".
    ///
    /// # Parameters
    /// * empty_label - the placeholder label text
    ///
    /// # Returns
    /// * the parameter configuration builder
    pub fn empty_label(mut self, empty_label: impl Into<String>) -> TreemapParamsBuilder {
        self.empty_label = Some(empty_label.into());
        self
    }

    /// Finishes the building of the parameter configuration. A call to this
    /// method is required to exit the builder pattern and complete the
    /// construction of the parameters.
    ///
    /// # Returns
    /// * The completed partition parameter configuration.
    pub fn build(self) -> TreemapParams {
        TreemapParams {
            depth: self.depth.unwrap_or(DEPTH_DEFAULT),
            splits: self.splits.unwrap_or(SPLITS_DEFAULT),
            min_size: self.min_size.unwrap_or(MIN_SIZE_DEFAULT),
            max_extension: self.max_extension.unwrap_or(MAX_EXTENSION_DEFAULT),
            label_top_n: self.label_top_n.unwrap_or(LABEL_TOP_N_DEFAULT),
            empty_label: self
                .empty_label
                .unwrap_or_else(|| String::from(EMPTY_LABEL_DEFAULT)),
        }
    }

    fn validate_input_left_bound(input_param: usize, left_bound: usize, param: &str) -> usize {
        if input_param < left_bound {
            println!(
                "TREECUT_WARNING: {param} ({input_param}) cannot be lower \
                than {left_bound}. Set to {left_bound}."
            );
            left_bound
        } else {
            input_param
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let params = TreemapParams::default();
        assert_eq!(3, params.depth);
        assert_eq!(3, params.splits);
        assert_eq!(0.1, params.min_size);
        assert_eq!(1.0, params.max_extension);
        assert_eq!(1, params.label_top_n);
        assert_eq!("all", params.empty_label);
    }

    #[test]
    fn out_of_bound_inputs_are_clamped() {
        let params = TreemapParams::builder()
            .depth(0)
            .splits(1)
            .min_size(1.5)
            .max_extension(-0.3)
            .label_top_n(0)
            .build();
        assert_eq!(1, params.depth);
        assert_eq!(2, params.splits);
        assert_eq!(1.0, params.min_size);
        assert_eq!(0.0, params.max_extension);
        assert_eq!(1, params.label_top_n);
    }
}
