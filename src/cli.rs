use clap::{Parser, ValueEnum};

#[derive(Parser, Debug, Clone, Default)]
#[command(author, version, about)]
pub struct Args {
    /// Figures to generate, `model` to run the entropy model, or `all`
    #[arg(value_enum, required = true, num_args = 1..)]
    pub targets: Vec<Target>,

    /// Report progress and per-topology statistics
    #[arg(short = 'v', long)]
    pub verbose: bool,

    /// Show a progress bar with the remaining time on long loops
    #[arg(short = 'l', long = "time-log")]
    pub time_log: bool,

    /// Collect data from the raw measurements and store it in the cache
    #[arg(short = 'd', long = "collect")]
    pub collect: bool,

    /// Quit after data collection, without rendering
    #[arg(short = 'q', long)]
    pub quit: bool,

    /// Path to config TOML
    #[arg(long, default_value = "figures.toml")]
    pub config: String,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Target {
    #[value(name = "csc_s7_fixed_placement")]
    CscS7FixedPlacement,
    #[value(name = "csc_s7_placement_sweep_wirevar")]
    CscS7PlacementSweepWirevar,
    #[value(name = "csc_s7_stage_length")]
    CscS7StageLength,
    #[value(name = "csc_s7_no_placement_congest")]
    CscS7NoPlacementCongest,
    #[value(name = "max_counts_s7_no_placement")]
    MaxCountsS7NoPlacement,
    #[value(name = "ranres_s7_variable_gp")]
    RanresS7VariableGp,
    #[value(name = "ranres_s7_no_placement_congest")]
    RanresS7NoPlacementCongest,
    #[value(name = "ranres_sf2_no_placement")]
    RanresSf2NoPlacement,
    #[value(name = "intralut_range")]
    IntralutRange,
    #[value(name = "intralut_res")]
    IntralutRes,
    #[value(name = "h_vs_csc_s7")]
    HVsCscS7,
    /// Run the entropy-versus-delta sweep
    #[value(name = "model")]
    Model,
    /// Model data first, then every figure
    #[value(name = "all")]
    All,
}

impl Target {
    pub const FIGURES: [Target; 11] = [
        Target::CscS7FixedPlacement,
        Target::CscS7PlacementSweepWirevar,
        Target::CscS7StageLength,
        Target::CscS7NoPlacementCongest,
        Target::MaxCountsS7NoPlacement,
        Target::RanresS7VariableGp,
        Target::RanresS7NoPlacementCongest,
        Target::RanresSf2NoPlacement,
        Target::IntralutRange,
        Target::IntralutRes,
        Target::HVsCscS7,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Target::CscS7FixedPlacement => "csc_s7_fixed_placement",
            Target::CscS7PlacementSweepWirevar => "csc_s7_placement_sweep_wirevar",
            Target::CscS7StageLength => "csc_s7_stage_length",
            Target::CscS7NoPlacementCongest => "csc_s7_no_placement_congest",
            Target::MaxCountsS7NoPlacement => "max_counts_s7_no_placement",
            Target::RanresS7VariableGp => "ranres_s7_variable_gp",
            Target::RanresS7NoPlacementCongest => "ranres_s7_no_placement_congest",
            Target::RanresSf2NoPlacement => "ranres_sf2_no_placement",
            Target::IntralutRange => "intralut_range",
            Target::IntralutRes => "intralut_res",
            Target::HVsCscS7 => "h_vs_csc_s7",
            Target::Model => "model",
            Target::All => "all",
        }
    }

    /// Expand `all` and drop repeats, keeping the requested order.
    ///
    /// `all` runs the model before the figures so that `h_vs_csc_s7` can
    /// read its output.
    pub fn expand(targets: &[Target]) -> Vec<Target> {
        let mut out: Vec<Target> = Vec::new();
        for &t in targets {
            let group: Vec<Target> = match t {
                Target::All => std::iter::once(Target::Model)
                    .chain(Target::FIGURES)
                    .collect(),
                other => vec![other],
            };
            for g in group {
                if !out.contains(&g) {
                    out.push(g);
                }
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_short_flags_and_targets() {
        let args = Args::try_parse_from([
            "ringosc-figures",
            "-v",
            "-d",
            "-q",
            "csc_s7_fixed_placement",
            "model",
        ])
        .unwrap();
        assert!(args.verbose && args.collect && args.quit);
        assert!(!args.time_log);
        assert_eq!(args.config, "figures.toml");
        assert_eq!(args.targets, vec![Target::CscS7FixedPlacement, Target::Model]);
    }

    #[test]
    fn target_is_required() {
        assert!(Args::try_parse_from(["ringosc-figures", "-v"]).is_err());
        assert!(Args::try_parse_from(["ringosc-figures", "no_such_figure"]).is_err());
    }

    #[test]
    fn all_expands_to_model_then_figures() {
        let expanded = Target::expand(&[Target::HVsCscS7, Target::All]);
        assert_eq!(expanded.len(), 12);
        assert_eq!(expanded[0], Target::HVsCscS7);
        assert_eq!(expanded[1], Target::Model);
        assert!(!expanded[2..].contains(&Target::HVsCscS7));
    }

    #[test]
    fn names_round_trip_through_value_enum() {
        for t in Target::FIGURES {
            let parsed = Target::from_str(t.name(), false).unwrap();
            assert_eq!(parsed, t);
        }
    }
}
