//! Exit policy selection.
//!
//! The four policies share one simulator; [`ExitPolicy`] carries each
//! policy's parameters and [`PolicyKind`] is its configuration name.

use std::fmt;
use std::str::FromStr;

pub const DEFAULT_RR: f64 = 2.0;
pub const DEFAULT_STEP_R: f64 = 2.0;
pub const DEFAULT_CAP_R: f64 = 10.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PolicyKind {
    FixedRrNaive,
    FixedRrRealistic,
    LadderOneR,
    LadderStep,
}

impl PolicyKind {
    pub const ALL: [PolicyKind; 4] = [
        PolicyKind::FixedRrNaive,
        PolicyKind::FixedRrRealistic,
        PolicyKind::LadderOneR,
        PolicyKind::LadderStep,
    ];

    pub fn name(self) -> &'static str {
        match self {
            PolicyKind::FixedRrNaive => "fixedRR-naive",
            PolicyKind::FixedRrRealistic => "fixedRR-realistic",
            PolicyKind::LadderOneR => "ladder-1R",
            PolicyKind::LadderStep => "ladder-stepN",
        }
    }
}

impl fmt::Display for PolicyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown exit policy '{0}' (expected fixedRR-naive, fixedRR-realistic, ladder-1R or ladder-stepN)")]
pub struct PolicyParseError(pub String);

impl FromStr for PolicyKind {
    type Err = PolicyParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        PolicyKind::ALL
            .into_iter()
            .find(|k| k.name().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| PolicyParseError(wanted.to_string()))
    }
}

/// Numeric knobs shared by all policies; each policy reads the ones it needs.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PolicyParams {
    pub rr: f64,
    pub step: f64,
    pub cap: f64,
}

impl Default for PolicyParams {
    fn default() -> Self {
        PolicyParams {
            rr: DEFAULT_RR,
            step: DEFAULT_STEP_R,
            cap: DEFAULT_CAP_R,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ExitPolicy {
    /// Stop checked before target on every bar.
    FixedRrNaive { rr: f64 },
    /// A bar touching both stop and target is a loss.
    FixedRrRealistic { rr: f64 },
    /// Stop trails one whole R behind the best R reached; exits at `cap`.
    LadderOneR { cap: f64 },
    /// Stop trails one step behind the best `step`-sized multiple reached.
    LadderStep { step: f64, cap: f64 },
}

impl ExitPolicy {
    pub fn new(kind: PolicyKind, params: &PolicyParams) -> Self {
        match kind {
            PolicyKind::FixedRrNaive => ExitPolicy::FixedRrNaive { rr: params.rr },
            PolicyKind::FixedRrRealistic => ExitPolicy::FixedRrRealistic { rr: params.rr },
            PolicyKind::LadderOneR => ExitPolicy::LadderOneR { cap: params.cap },
            PolicyKind::LadderStep => ExitPolicy::LadderStep {
                step: params.step,
                cap: params.cap,
            },
        }
    }

    pub fn kind(&self) -> PolicyKind {
        match self {
            ExitPolicy::FixedRrNaive { .. } => PolicyKind::FixedRrNaive,
            ExitPolicy::FixedRrRealistic { .. } => PolicyKind::FixedRrRealistic,
            ExitPolicy::LadderOneR { .. } => PolicyKind::LadderOneR,
            ExitPolicy::LadderStep { .. } => PolicyKind::LadderStep,
        }
    }
}

impl fmt::Display for ExitPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExitPolicy::FixedRrNaive { rr } | ExitPolicy::FixedRrRealistic { rr } => {
                write!(f, "{} (RR {rr})", self.kind())
            }
            ExitPolicy::LadderOneR { cap } => write!(f, "{} (cap {cap}R)", self.kind()),
            ExitPolicy::LadderStep { step, cap } => {
                write!(f, "{} (step {step}R, cap {cap}R)", self.kind())
            }
        }
    }
}
