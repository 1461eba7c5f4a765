//! # Skip Predicates / 跳过谓词
//!
//! A test may be inapplicable under the current build configuration, host OS
//! or decoder capabilities. Each [`Predicate`] is a pure function of the
//! [`RunConfig`] that yields an empty string (run the test) or a
//! human-readable reason (skip it). [`SkipWhen`] combines predicates with a
//! logical OR.
//!
//! 测试可能在当前构建配置、主机操作系统或解码器能力下不适用。
//! 每个谓词都是 `RunConfig` 的纯函数，返回空字符串（运行）或可读的原因（跳过）。

use std::fmt;

use crate::core::config::RunConfig;

/// One skip condition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Predicate {
    /// Skip when the build-configuration flag is not defined.
    RequiresConfig(String),
    /// Skip when the build-configuration flag is defined with value `1`.
    ConfigIsOne(String),
    /// Skip when the host OS equals this value (`std::env::consts::OS` naming).
    HostOs(String),
    /// Skip when the decoder's floating-point class equals this value.
    FpType(String),
    /// Skip when the decoder's time type has this many bits.
    TimeTBits(u32),
}

impl Predicate {
    /// The stable name of this kind of predicate.
    pub fn name(&self) -> &'static str {
        match self {
            Predicate::RequiresConfig(_) => "config-undef",
            Predicate::ConfigIsOne(_) => "config-def1",
            Predicate::HostOs(_) => "os",
            Predicate::FpType(_) => "fptype",
            Predicate::TimeTBits(_) => "time-t",
        }
    }

    /// Returns the skip reason, or an empty string if the test applies.
    pub fn reason(&self, cfg: &RunConfig) -> String {
        match self {
            Predicate::RequiresConfig(flag) if !cfg.build.is_defined(flag) => {
                format!("{flag} is not defined")
            }
            Predicate::ConfigIsOne(flag) if cfg.build.get(flag) == Some("1") => {
                format!("{flag} is defined as 1")
            }
            Predicate::HostOs(os) if cfg.host_os == *os => format!("host OS is {os}"),
            Predicate::FpType(class) if cfg.capabilities.fp_type.as_deref() == Some(class) => {
                format!("floating-point class is {class}")
            }
            Predicate::TimeTBits(bits) if cfg.capabilities.time_t_bits == Some(*bits) => {
                format!("time_t is {bits}-bit")
            }
            _ => String::new(),
        }
    }
}

impl fmt::Display for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Predicate::RequiresConfig(v)
            | Predicate::ConfigIsOne(v)
            | Predicate::HostOs(v)
            | Predicate::FpType(v) => write!(f, "{}:{v}", self.name()),
            Predicate::TimeTBits(bits) => write!(f, "{}:{bits}", self.name()),
        }
    }
}

/// An OR-combination of predicates. Empty means "never skip".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SkipWhen(Vec<Predicate>);

impl SkipWhen {
    pub fn never() -> Self {
        Self::default()
    }

    pub fn any(predicates: impl IntoIterator<Item = Predicate>) -> Self {
        Self(predicates.into_iter().collect())
    }

    /// Adds `predicate` to the disjunction.
    pub fn or(mut self, predicate: Predicate) -> Self {
        self.0.push(predicate);
        self
    }

    pub fn predicates(&self) -> &[Predicate] {
        &self.0
    }

    /// The first predicate that fires, with its reason.
    pub fn first_match(&self, cfg: &RunConfig) -> Option<(&Predicate, String)> {
        self.0.iter().find_map(|predicate| {
            let reason = predicate.reason(cfg);
            (!reason.is_empty()).then_some((predicate, reason))
        })
    }

    /// The first non-empty reason, or an empty string if no predicate fires.
    pub fn evaluate(&self, cfg: &RunConfig) -> String {
        self.first_match(cfg)
            .map(|(_, reason)| reason)
            .unwrap_or_default()
    }
}

/// Skip unless `flag` is defined.
pub fn requires_config(flag: &str) -> SkipWhen {
    SkipWhen::any([Predicate::RequiresConfig(flag.to_string())])
}

/// Skip when `flag` is defined as `1`.
pub fn config_is_one(flag: &str) -> SkipWhen {
    SkipWhen::any([Predicate::ConfigIsOne(flag.to_string())])
}
