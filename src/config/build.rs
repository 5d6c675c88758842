use crate::config::BuildError;
use crate::config::choices::{BootstrapParams, EstimatorParams, RetrievalChoice};
use crate::estimation::SpeciesEstimator;
use crate::retrieval::RetrievalStrategy;
use crate::tasks::BootstrapProfiler;

impl TryFrom<RetrievalChoice> for RetrievalStrategy {
    type Error = BuildError;

    fn try_from(choice: RetrievalChoice) -> Result<Self, Self::Error> {
        match choice {
            RetrievalChoice::NGram(p) => RetrievalStrategy::n_gram(p.n),
            RetrievalChoice::TraceVariant => Ok(RetrievalStrategy::TraceVariant),
            RetrievalChoice::Activity => Ok(RetrievalStrategy::Activity),
        }
    }
}

impl TryFrom<EstimatorParams> for SpeciesEstimator {
    type Error = BuildError;

    fn try_from(p: EstimatorParams) -> Result<Self, Self::Error> {
        let strategy = RetrievalStrategy::try_from(p.retrieval)?;
        SpeciesEstimator::with_metrics(strategy, p.step_size, p.effort_targets, p.metric_groups)
    }
}

impl TryFrom<BootstrapParams> for BootstrapProfiler {
    type Error = BuildError;

    fn try_from(p: BootstrapParams) -> Result<Self, Self::Error> {
        let strategy = RetrievalStrategy::try_from(p.estimator.retrieval)?;
        let profiler =
            BootstrapProfiler::new(strategy, p.estimator.step_size, p.replicates, p.seed)?
                .with_targets(p.estimator.effort_targets)?
                .with_metric_groups(p.estimator.metric_groups);
        Ok(match p.workers {
            Some(workers) => profiler.with_workers(workers),
            None => profiler,
        })
    }
}

/// Parses and builds an estimator from its JSON parameters.
pub fn build_estimator(json: &str) -> anyhow::Result<SpeciesEstimator> {
    let params = EstimatorParams::from_json(json)?;
    Ok(SpeciesEstimator::try_from(params)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::choices::NGramParameters;
    use crate::core::Model;
    use crate::estimation::{Metric, MetricGroup, MetricGroups};

    fn params(retrieval: RetrievalChoice, step_size: u64) -> EstimatorParams {
        EstimatorParams {
            retrieval,
            step_size,
            effort_targets: vec![0.9],
            metric_groups: MetricGroups::all(),
        }
    }

    #[test]
    fn maps_every_choice() {
        let s = RetrievalStrategy::try_from(RetrievalChoice::NGram(NGramParameters { n: 3 }));
        assert_eq!(s.unwrap(), RetrievalStrategy::NGram { n: 3 });
        assert_eq!(
            RetrievalStrategy::try_from(RetrievalChoice::TraceVariant).unwrap(),
            RetrievalStrategy::TraceVariant
        );
        assert_eq!(
            RetrievalStrategy::try_from(RetrievalChoice::Activity).unwrap(),
            RetrievalStrategy::Activity
        );
    }

    #[test]
    fn error_on_zero_width() {
        let err = RetrievalStrategy::try_from(RetrievalChoice::NGram(NGramParameters { n: 0 }))
            .unwrap_err();
        assert!(matches!(err, BuildError::InvalidParameter(_)));
    }

    #[test]
    fn error_on_zero_step_size() {
        let err = SpeciesEstimator::try_from(params(RetrievalChoice::Activity, 0)).unwrap_err();
        assert!(matches!(err, BuildError::InvalidParameter(_)));
    }

    #[test]
    fn builds_configured_estimator() {
        let e = SpeciesEstimator::try_from(params(RetrievalChoice::TraceVariant, 4)).unwrap();
        assert_eq!(e.step_size(), 4);
        assert_eq!(e.strategy(), RetrievalStrategy::TraceVariant);
        assert_eq!(e.effort_targets(), &[0.9]);
    }

    #[test]
    fn builds_estimator_with_selected_groups() {
        let p = EstimatorParams {
            metric_groups: [MetricGroup::Simpson].into_iter().collect(),
            ..params(RetrievalChoice::Activity, 1)
        };
        let mut e = SpeciesEstimator::try_from(p).unwrap();
        e.apply(&["a", "a", "b"]).unwrap();
        let profile = e.profile(Model::Incidence);
        assert_eq!(profile.series(Metric::SampleD2).len(), 1);
        assert!(profile.series(Metric::SampleD0).is_empty());
        assert!(profile.sampling_effort().is_empty());
    }

    #[test]
    fn build_estimator_from_json() {
        let e = build_estimator(
            r#"{"retrieval": {"type": "n-gram", "params": {"n": 2}}, "step_size": 3}"#,
        )
        .unwrap();
        assert_eq!(e.strategy(), RetrievalStrategy::NGram { n: 2 });

        let zero_width = r#"{"retrieval": {"type": "n-gram", "params": {"n": 0}}, "step_size": 3}"#;
        assert!(build_estimator(zero_width).is_err());
        assert!(build_estimator("not json").is_err());
    }

    #[test]
    fn builds_bootstrap_profiler() {
        let p = BootstrapParams {
            estimator: params(RetrievalChoice::Activity, 2),
            replicates: 4,
            seed: 9,
            workers: Some(2),
        };
        let profiler = BootstrapProfiler::try_from(p.clone()).unwrap();
        assert_eq!(profiler.replicates(), 4);

        let bad = BootstrapParams { replicates: 0, ..p };
        assert!(BootstrapProfiler::try_from(bad).is_err());
    }
}
