use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::{lttb, lttb_multi, min_max, Downsampled, Error, LabeledSeries, Point, Result};

/// Output budget used when none is configured.
pub const DEFAULT_THRESHOLD: usize = 500;
pub const DEFAULT_VALUE_KEY: &str = "value";

/// Sampling strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Method {
    /// Shape-preserving largest-triangle selection.
    #[default]
    Lttb,
    /// Cheaper extrema-per-bucket selection.
    MinMax,
}

impl FromStr for Method {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "lttb" => Ok(Method::Lttb),
            "minmax" | "min-max" => Ok(Method::MinMax),
            _ => Err(Error::UnknownMethod(s.to_string())),
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Method::Lttb => write!(f, "lttb"),
            Method::MinMax => write!(f, "minmax"),
        }
    }
}

/// Sampler settings, typically derived from a chart's rendering budget.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub method: Method,
    /// Target number of output points per series.
    pub threshold: usize,
    /// Field to downsample on.
    pub value_key: String,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            method: Method::default(),
            threshold: DEFAULT_THRESHOLD,
            value_key: DEFAULT_VALUE_KEY.to_string(),
        }
    }
}

impl Config {
    /// Min/max bucket count: `threshold / 2`, so output stays within
    /// `threshold` points for any `threshold >= 2`. A threshold of 1 still
    /// gets one bucket, which may emit both its minimum and its maximum.
    pub fn min_max_buckets(&self) -> usize {
        (self.threshold / 2).max(1)
    }

    /// Runs the configured sampler over one series.
    pub fn apply<'a, S: Point>(&self, series: &'a [S]) -> Result<Vec<&'a S>> {
        if self.threshold == 0 {
            return Err(Error::InvalidThreshold(self.threshold));
        }
        match self.method {
            Method::Lttb => lttb(series, self.threshold, &self.value_key),
            Method::MinMax => min_max(series, self.min_max_buckets(), &self.value_key),
        }
    }

    /// Runs the configured sampler over a set of related series. LTTB aligns
    /// them on a shared grid; min/max reduces each independently.
    pub fn apply_multi<'a, S>(
        &self,
        series: &'a [LabeledSeries<S>],
    ) -> Result<Vec<Downsampled<'a, S>>>
    where
        S: Point + Sync,
        S::Timestamp: Sync,
    {
        match self.method {
            Method::Lttb => lttb_multi(series, self.threshold, &self.value_key),
            Method::MinMax => {
                if self.threshold == 0 {
                    return Err(Error::InvalidThreshold(self.threshold));
                }
                if series.iter().all(|s| s.series.is_empty()) {
                    return Err(Error::NoSeries);
                }
                series
                    .iter()
                    .map(|labeled| {
                        Ok(Downsampled {
                            label: &labeled.label,
                            series: min_max(
                                &labeled.series,
                                self.min_max_buckets(),
                                &self.value_key,
                            )?,
                        })
                    })
                    .collect()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Sample;

    fn ramp(len: usize) -> Vec<Sample<i64>> {
        (0..len)
            .map(|i| Sample::new(i as i64).with("latency", ((i * 31) % 17) as f64))
            .collect()
    }

    #[test]
    fn defaults() {
        let config = Config::default();
        assert_eq!(config.method, Method::Lttb);
        assert_eq!(config.threshold, 500);
        assert_eq!(config.value_key, "value");
    }

    #[test]
    fn partial_json_uses_defaults() {
        let config: Config = serde_json::from_str(r#"{"method":"minmax"}"#).unwrap();
        assert_eq!(config.method, Method::MinMax);
        assert_eq!(config.threshold, DEFAULT_THRESHOLD);

        let config: Config = serde_json::from_str(r#"{"threshold":50,"value_key":"p99"}"#).unwrap();
        assert_eq!(config.method, Method::Lttb);
        assert_eq!(config.threshold, 50);
        assert_eq!(config.value_key, "p99");
    }

    #[test]
    fn method_parse() {
        assert_eq!("LTTB".parse::<Method>().unwrap(), Method::Lttb);
        assert_eq!("min-max".parse::<Method>().unwrap(), Method::MinMax);
        assert_eq!(
            "mean".parse::<Method>(),
            Err(Error::UnknownMethod("mean".to_string()))
        );
        assert_eq!(Method::MinMax.to_string(), "minmax");
    }

    #[test]
    fn apply_dispatches() {
        let data = ramp(1000);
        let lttb_cfg = Config {
            threshold: 51,
            value_key: "latency".to_string(),
            ..Config::default()
        };
        assert_eq!(lttb_cfg.apply(&data).unwrap().len(), 51);

        let minmax_cfg = Config {
            method: Method::MinMax,
            ..lttb_cfg.clone()
        };
        assert_eq!(minmax_cfg.min_max_buckets(), 25);
        assert!(minmax_cfg.apply(&data).unwrap().len() <= 51);

        let zero = Config {
            threshold: 0,
            ..minmax_cfg
        };
        assert_eq!(zero.apply(&data), Err(Error::InvalidThreshold(0)));
    }

    #[test]
    fn min_max_budget_by_threshold() {
        let data: Vec<Sample<i64>> = (0..1_000)
            .map(|i| Sample::new(i).with("value", ((i * 7919) % 101) as f64))
            .collect();
        for threshold in 2..=9 {
            let cfg = Config {
                method: Method::MinMax,
                threshold,
                ..Config::default()
            };
            assert!(cfg.apply(&data).unwrap().len() <= threshold, "threshold={threshold}");
        }

        let one = Config {
            method: Method::MinMax,
            threshold: 1,
            ..Config::default()
        };
        assert_eq!(one.min_max_buckets(), 1);
        assert_eq!(one.apply(&data).unwrap().len(), 2);
    }

    #[test]
    fn apply_multi_min_max() {
        let set = vec![
            LabeledSeries::new("a", ramp(1000)),
            LabeledSeries::new("b", ramp(40)),
        ];
        let config = Config {
            method: Method::MinMax,
            threshold: 50,
            value_key: "latency".to_string(),
        };
        let out = config.apply_multi(&set).unwrap();
        assert_eq!(out[0].label, "a");
        assert!(out[0].len() <= 50);
        assert_eq!(out[1].len(), 40);
    }
}
